//! @acp:module "Read Command"
//! @acp:summary "Print the ACBF metadata of an archive"
//! @acp:domain cli
//! @acp:layer handler

use std::path::PathBuf;

use anyhow::{Context, Result};
use console::style;

use super::output::{render_metadata, OutputFormat};
use crate::archive::open_archive;
use crate::config::Config;
use crate::tags::{AcbfTag, Tag};

/// Options for the read command
#[derive(Debug, Clone)]
pub struct ReadOptions {
    /// Archive to read
    pub path: PathBuf,
    /// Output format
    pub format: OutputFormat,
}

/// Execute the read command
pub fn execute_read(options: ReadOptions, config: &Config) -> Result<()> {
    let archive = open_archive(&options.path)
        .with_context(|| format!("Failed to open {}", options.path.display()))?;
    let tag = AcbfTag::new(config.tag_file.clone());

    if !tag.has_tags(archive.as_ref())? {
        eprintln!(
            "{} No {} tags in {}",
            style("!").yellow(),
            tag.name(),
            options.path.display()
        );
        return Ok(());
    }

    let md = tag
        .read_tags(archive.as_ref())
        .with_context(|| format!("Failed to read tags from {}", options.path.display()))?;

    if options.format == OutputFormat::Human {
        println!(
            "{} {} ({})",
            style("→").cyan(),
            style(options.path.display()).bold(),
            archive.kind()
        );
    }
    print!("{}", render_metadata(&md, options.format)?);
    Ok(())
}
