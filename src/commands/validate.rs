//! @acp:module "Validate Command"
//! @acp:summary "Validate an ACBF document or the tag file inside an archive"
//! @acp:domain cli
//! @acp:layer handler

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use console::style;

use crate::archive::open_archive;
use crate::config::Config;
use crate::metadata::utils::page_name_list;
use crate::tags::acbf::{read, NAMESPACE_1_1, NAMESPACE_1_2};
use crate::tags::AcbfTag;
use crate::xml;

/// Options for the validate command
#[derive(Debug, Clone)]
pub struct ValidateOptions {
    /// `.acbf` file or archive to validate
    pub file: PathBuf,
}

/// Human-readable ACBF version for a namespace
fn version_label(namespace: Option<&str>) -> &'static str {
    match namespace {
        Some(NAMESPACE_1_1) => "1.1",
        Some(NAMESPACE_1_2) => "1.2",
        _ => "unversioned",
    }
}

/// Execute the validate command
pub fn execute_validate(options: ValidateOptions, config: &Config) -> Result<()> {
    let is_document = options
        .file
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("acbf") || e.eq_ignore_ascii_case("xml"));

    let (bytes, page_names) = if is_document {
        let bytes = std::fs::read(&options.file)
            .with_context(|| format!("Failed to read {}", options.file.display()))?;
        (bytes, Vec::new())
    } else {
        let archive = open_archive(&options.file)
            .with_context(|| format!("Failed to open {}", options.file.display()))?;
        let tag = AcbfTag::new(config.tag_file.clone());
        let name = tag
            .locate(archive.as_ref())?
            .ok_or_else(|| anyhow!("No .acbf file in {}", options.file.display()))?;
        let bytes = archive.read_file(&name)?;
        (bytes, page_name_list(&archive.file_names()?))
    };

    let root = xml::parse(&bytes).context("Document is not well-formed XML")?;
    read::check_version(&root)?;
    let version = version_label(root.namespace());
    let md = read::xml_to_metadata(root, &page_names)?;

    println!(
        "{} ACBF {} document is valid",
        style("✓").green(),
        version
    );
    if let Some(title) = md.title.as_deref().or(md.series.as_deref()) {
        println!("  Title: {}", style(title).cyan());
    }
    println!("  Credits: {}", md.credits.len());
    println!("  Pages: {}", md.pages.len());
    Ok(())
}
