//! @acp:module "Write Command"
//! @acp:summary "Write metadata from a JSON or YAML document into an archive"
//! @acp:domain cli
//! @acp:layer handler

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use console::style;
use similar::TextDiff;

use crate::archive::{open_archive, Archiver};
use crate::config::Config;
use crate::metadata::GenericMetadata;
use crate::tags::{AcbfTag, Tag};

/// Options for the write command
#[derive(Debug, Clone)]
pub struct WriteOptions {
    /// Archive to tag
    pub path: PathBuf,
    /// Metadata document (.json, .yaml or .yml)
    pub metadata: PathBuf,
    /// Show the resulting tag file diff without writing
    pub dry_run: bool,
}

/// Load a metadata document, picking the parser from the extension
pub fn load_metadata(path: &Path) -> Result<GenericMetadata> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    let mut md: GenericMetadata = match ext.as_str() {
        "yaml" | "yml" => serde_yaml::from_str(&content)?,
        _ => serde_json::from_str(&content)?,
    };
    md.is_empty = false;
    Ok(md)
}

/// Unified diff between the stored tag file and the one a write would store.
///
/// Empty when the write changes nothing.
pub fn preview_write(tag: &AcbfTag, md: &GenericMetadata, archive: &dyn Archiver) -> Result<String> {
    let prepared = tag.prepare_write(md, archive)?;
    let current = prepared
        .stored
        .as_deref()
        .map(String::from_utf8_lossy)
        .unwrap_or_default();
    let proposed = String::from_utf8_lossy(&prepared.bytes);

    let diff = TextDiff::from_lines(&*current, &*proposed);
    let unified = diff
        .unified_diff()
        .context_radius(3)
        .header(
            &format!("a/{}", prepared.target),
            &format!("b/{}", prepared.target),
        )
        .to_string();
    Ok(unified)
}

/// Execute the write command
pub fn execute_write(options: WriteOptions, config: &Config) -> Result<()> {
    let md = load_metadata(&options.metadata)?;
    let mut archive = open_archive(&options.path)
        .with_context(|| format!("Failed to open {}", options.path.display()))?;
    let tag = AcbfTag::new(config.tag_file.clone());

    if options.dry_run {
        let unified = preview_write(&tag, &md, archive.as_ref())?;
        if unified.is_empty() {
            println!("{} No changes", style("✓").green());
        } else {
            print!("{}", unified);
        }
        return Ok(());
    }

    if !tag.write_tags(&md, archive.as_mut())? {
        return Err(anyhow!(
            "{} does not support {} tags",
            options.path.display(),
            tag.name()
        ));
    }
    println!(
        "{} Wrote {} tags to {}",
        style("✓").green(),
        tag.name(),
        options.path.display()
    );
    Ok(())
}
