//! @acp:module "Raw Command"
//! @acp:summary "Print the tag file exactly as stored"
//! @acp:domain cli
//! @acp:layer handler

use std::path::PathBuf;

use anyhow::{Context, Result};
use console::style;

use crate::archive::open_archive;
use crate::config::Config;
use crate::tags::{AcbfTag, Tag};

/// Options for the raw command
#[derive(Debug, Clone)]
pub struct RawOptions {
    /// Archive to read
    pub path: PathBuf,
}

/// Execute the raw command
pub fn execute_raw(options: RawOptions, config: &Config) -> Result<()> {
    let archive = open_archive(&options.path)
        .with_context(|| format!("Failed to open {}", options.path.display()))?;
    let tag = AcbfTag::new(config.tag_file.clone());

    let raw = tag.read_raw_tags(archive.as_ref())?;
    if raw.is_empty() {
        eprintln!(
            "{} No {} tags in {}",
            style("!").yellow(),
            tag.name(),
            options.path.display()
        );
    } else {
        println!("{}", raw);
    }
    Ok(())
}
