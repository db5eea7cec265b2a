//! @acp:module "Remove Command"
//! @acp:summary "Remove ACBF tags from archives"
//! @acp:domain cli
//! @acp:layer handler

use std::path::PathBuf;

use anyhow::{Context, Result};
use console::style;
use dialoguer::{theme::ColorfulTheme, Confirm};

use crate::archive::open_archive;
use crate::config::Config;
use crate::tags::{AcbfTag, Tag};

/// Options for the remove command
#[derive(Debug, Clone)]
pub struct RemoveOptions {
    /// Archives to clean
    pub paths: Vec<PathBuf>,
    /// Skip the confirmation prompt
    pub yes: bool,
}

/// Execute the remove command
pub fn execute_remove(options: RemoveOptions, config: &Config) -> Result<()> {
    let tag = AcbfTag::new(config.tag_file.clone());

    if !options.yes {
        let proceed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(format!(
                "Remove {} tags from {} archive(s)?",
                tag.name(),
                options.paths.len()
            ))
            .default(false)
            .interact()?;
        if !proceed {
            println!("{} Aborted", style("!").yellow());
            return Ok(());
        }
    }

    let mut removed = 0;
    for path in &options.paths {
        let mut archive =
            open_archive(path).with_context(|| format!("Failed to open {}", path.display()))?;
        if tag.remove_tags(archive.as_mut())? {
            removed += 1;
            println!("  {} {}", style("✓").green(), path.display());
        } else {
            println!("  {} {} (no tags)", style("-").dim(), path.display());
        }
    }

    println!(
        "{} Removed {} tags from {} of {} archive(s)",
        style("✓").green().bold(),
        tag.name(),
        removed,
        options.paths.len()
    );
    Ok(())
}
