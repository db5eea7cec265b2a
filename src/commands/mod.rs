//! @acp:module "Commands"
//! @acp:summary "CLI command implementations"
//! @acp:domain cli
//! @acp:layer handler
//!
//! Provides implementations for all CLI commands.
//! Each command is in its own submodule for maintainability.

pub mod install;
pub mod output;
pub mod raw;
pub mod read;
pub mod remove;
pub mod scan;
pub mod validate;
pub mod write;

pub use install::{execute_install, execute_list_installed, execute_uninstall, InstallOptions};
pub use output::{render_metadata, OutputFormat};
pub use raw::{execute_raw, RawOptions};
pub use read::{execute_read, ReadOptions};
pub use remove::{execute_remove, RemoveOptions};
pub use scan::{execute_scan, find_archives, scan_archives, ScanEntry, ScanOptions, ScanReport};
pub use validate::{execute_validate, ValidateOptions};
pub use write::{execute_write, load_metadata, preview_write, WriteOptions};
