//! @acp:module "Scan Command"
//! @acp:summary "Report ACBF tag status across a directory of archives"
//! @acp:domain cli
//! @acp:layer handler
//!
//! Archives are found with the configured include/exclude globs and read in
//! parallel with rayon.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use console::style;
use glob::Pattern;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::Serialize;
use walkdir::WalkDir;

use super::output::OutputFormat;
use crate::archive::open_archive;
use crate::config::Config;
use crate::tags::{AcbfTag, Tag};

/// Options for the scan command
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Directory to scan
    pub root: PathBuf,
    /// Output format for the report
    pub format: OutputFormat,
    /// Hide the progress bar
    pub quiet: bool,
}

/// Tag status of one archive
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ScanEntry {
    pub path: PathBuf,
    pub tagged: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub series: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Scan summary
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanReport {
    pub total: usize,
    pub tagged: usize,
    pub failed: usize,
    pub entries: Vec<ScanEntry>,
}

/// Archive files under `root` matching the include globs and none of the excludes
pub fn find_archives(root: &Path, include: &[String], exclude: &[String]) -> Vec<PathBuf> {
    let include_patterns: Vec<_> = include.iter().filter_map(|p| Pattern::new(p).ok()).collect();
    let exclude_patterns: Vec<_> = exclude.iter().filter_map(|p| Pattern::new(p).ok()).collect();
    let match_opts = glob::MatchOptions {
        case_sensitive: false,
        require_literal_separator: false,
        require_literal_leading_dot: false,
    };

    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            let relative = e
                .path()
                .strip_prefix(root)
                .map(|p| p.to_string_lossy().replace('\\', "/"))
                .unwrap_or_else(|_| e.path().to_string_lossy().to_string());
            let included = include_patterns.is_empty()
                || include_patterns
                    .iter()
                    .any(|p| p.matches_with(&relative, match_opts));
            let excluded = exclude_patterns
                .iter()
                .any(|p| p.matches_with(&relative, match_opts));
            included && !excluded
        })
        .map(|e| e.into_path())
        .collect()
}

fn scan_one(tag: &AcbfTag, path: &Path) -> ScanEntry {
    let mut entry = ScanEntry {
        path: path.to_path_buf(),
        tagged: false,
        series: None,
        issue: None,
        error: None,
    };

    let result = open_archive(path).and_then(|archive| {
        if tag.has_tags(archive.as_ref())? {
            tag.read_tags(archive.as_ref()).map(Some)
        } else {
            Ok(None)
        }
    });
    match result {
        Ok(Some(md)) => {
            entry.tagged = true;
            entry.series = md.series;
            entry.issue = md.issue;
        }
        Ok(None) => {}
        Err(e) => {
            tracing::warn!("Failed to scan {}: {}", path.display(), e);
            entry.error = Some(e.to_string());
        }
    }
    entry
}

/// Scan archives in parallel and build a report
pub fn scan_archives(paths: &[PathBuf], tag: &AcbfTag, progress: &ProgressBar) -> ScanReport {
    let entries: Vec<ScanEntry> = paths
        .par_iter()
        .map(|path| {
            let entry = scan_one(tag, path);
            progress.inc(1);
            entry
        })
        .collect();

    ScanReport {
        total: entries.len(),
        tagged: entries.iter().filter(|e| e.tagged).count(),
        failed: entries.iter().filter(|e| e.error.is_some()).count(),
        entries,
    }
}

/// Execute the scan command
pub fn execute_scan(options: ScanOptions, config: &Config) -> Result<()> {
    let paths = find_archives(&options.root, &config.include, &config.exclude);
    if paths.is_empty() {
        eprintln!(
            "{} No archives found matching include patterns",
            style("✗").red()
        );
        for pattern in &config.include {
            eprintln!("    include: {}", pattern);
        }
        for pattern in &config.exclude {
            eprintln!("    exclude: {}", pattern);
        }
        return Ok(());
    }

    let progress = if options.quiet || options.format != OutputFormat::Human {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(paths.len() as u64)
    };
    progress.set_style(
        ProgressStyle::with_template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .context("Invalid progress template")?
            .progress_chars("=>-"),
    );
    progress.set_message("scanning");

    let tag = AcbfTag::new(config.tag_file.clone());
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.workers)
        .build()
        .context("Failed to build worker pool")?;
    let report = pool.install(|| scan_archives(&paths, &tag, &progress));
    progress.finish_and_clear();

    match options.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(&report)?),
        OutputFormat::Human => print_report(&report, &options.root),
    }
    Ok(())
}

fn print_report(report: &ScanReport, root: &Path) {
    for entry in &report.entries {
        let name = entry.path.strip_prefix(root).unwrap_or(&entry.path);
        if let Some(error) = &entry.error {
            println!("  {} {} {}", style("✗").red(), name.display(), style(error).dim());
        } else if entry.tagged {
            let label = match (&entry.series, &entry.issue) {
                (Some(series), Some(issue)) => format!("{} #{}", series, issue),
                (Some(series), None) => series.clone(),
                _ => String::new(),
            };
            println!("  {} {} {}", style("✓").green(), name.display(), style(label).cyan());
        } else {
            println!("  {} {}", style("-").dim(), name.display());
        }
    }
    println!();
    println!(
        "{} {} archive(s): {} tagged, {} untagged, {} failed",
        style("✓").green().bold(),
        report.total,
        report.tagged,
        report.total - report.tagged - report.failed,
        report.failed
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_find_archives_applies_globs() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        std::fs::create_dir_all(root.join("series/__MACOSX")).unwrap();
        std::fs::write(root.join("series/one.cbz"), b"").unwrap();
        std::fs::write(root.join("series/TWO.CBZ"), b"").unwrap();
        std::fs::write(root.join("series/__MACOSX/one.cbz"), b"").unwrap();
        std::fs::write(root.join("series/notes.txt"), b"").unwrap();

        let config = Config::default();
        let found = find_archives(root, &config.include, &config.exclude);
        let names: Vec<_> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["TWO.CBZ", "one.cbz"]);
    }

    #[test]
    fn test_scan_reports_failures() {
        let temp = TempDir::new().unwrap();
        let bogus = temp.path().join("broken.cbz");
        std::fs::write(&bogus, b"not a zip").unwrap();

        let report = scan_archives(&[bogus], &AcbfTag::default(), &ProgressBar::hidden());
        assert_eq!(report.total, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(report.tagged, 0);
    }
}
