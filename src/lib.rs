#![forbid(unsafe_code)]

//! @acp:module "acbfxml Library"
//! @acp:summary "ACBF metadata tag support for comic archives"
//! @acp:domain tags
//! @acp:layer api
//! @acp:stability stable
//!
//! # acbfxml
//!
//! Reads and writes Advanced Comic Book Format (ACBF) metadata stored as an
//! `.acbf` XML file inside comic archives (cbz, cbt or plain folders), and
//! maps it onto the generic metadata model used by comic tagging hosts.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use acbfxml::{open_archive, AcbfTag, Tag};
//!
//! fn main() -> anyhow::Result<()> {
//!     let mut archive = open_archive(Path::new("Saga 001.cbz"))?;
//!     let tag = AcbfTag::default();
//!
//!     let mut md = tag.read_tags(archive.as_ref())?;
//!     md.series = Some("Saga".to_string());
//!     tag.write_tags(&md, archive.as_mut())?;
//!
//!     Ok(())
//! }
//! ```

pub mod archive;
pub mod commands;
pub mod config;
pub mod error;
pub mod metadata;
pub mod plugin;
pub mod tags;
pub mod xml;

// Re-exports
pub use archive::{open_archive, ArchiveKind, Archiver};
pub use config::Config;
pub use error::{AcbfError, Result};
pub use metadata::{Credit, DataOrigin, GenericMetadata, PageMetadata};
pub use tags::{AcbfTag, Tag};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
