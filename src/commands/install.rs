//! @acp:module "Install Command"
//! @acp:summary "Install the ACBF plugin artifact into the host's plugins directory"
//! @acp:domain cli
//! @acp:layer handler
//!
//! The host discovers plugins from `acbfxml-plugin-<version>.zip` files in
//! its plugins directory.

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use console::style;

use crate::plugin;

/// Installation options
#[derive(Debug, Clone)]
pub struct InstallOptions {
    /// Plugin artifact to install
    pub artifact: PathBuf,
    /// Host plugins directory
    pub plugins_dir: PathBuf,
    /// Replace an existing artifact of the same name
    pub force: bool,
}

/// Execute the install command
pub fn execute_install(options: InstallOptions) -> Result<()> {
    println!(
        "{} Installing {} plugin to {}",
        style("→").blue(),
        plugin::PLUGIN_NAME,
        style(options.plugins_dir.display()).cyan()
    );

    let version = plugin::validate_artifact(&options.artifact)
        .with_context(|| format!("Invalid plugin artifact {}", options.artifact.display()))?;
    println!("  Version: {}", style(&version).dim());

    let target = options.plugins_dir.join(
        options
            .artifact
            .file_name()
            .ok_or_else(|| anyhow!("Invalid artifact path"))?,
    );
    if target.exists() && !options.force {
        println!(
            "  {} Already installed at {}",
            style("✓").green(),
            target.display()
        );
        println!("  Use --force to reinstall");
        return Ok(());
    }

    let installed = plugin::install(&options.artifact, &options.plugins_dir, options.force)?;
    println!(
        "  {} Installed to {}",
        style("✓").green(),
        installed.display()
    );
    Ok(())
}

/// List installed plugin artifacts
pub fn execute_list_installed(plugins_dir: PathBuf) -> Result<()> {
    println!(
        "{} Installed {} plugins in {}",
        style("→").blue(),
        plugin::PLUGIN_NAME,
        style(plugins_dir.display()).cyan()
    );

    let installed = plugin::list_installed(&plugins_dir)?;
    if installed.is_empty() {
        println!("  {} None", style("-").dim());
        return Ok(());
    }
    for entry in installed {
        let current = if entry.version == plugin::PLUGIN_VERSION {
            style(" (current)").green().to_string()
        } else {
            String::new()
        };
        println!(
            "  {} {}{}",
            style(&entry.version).bold(),
            style(entry.path.display()).dim(),
            current
        );
    }
    Ok(())
}

/// Uninstall plugin artifacts, optionally a single version
pub fn execute_uninstall(plugins_dir: PathBuf, version: Option<String>) -> Result<()> {
    let removed = plugin::uninstall(&plugins_dir, version.as_deref())?;
    if removed.is_empty() {
        println!("{} Nothing to uninstall", style("!").yellow());
        return Ok(());
    }
    for path in &removed {
        println!("  {} Removed {}", style("✓").green(), path.display());
    }
    Ok(())
}
