//! @acp:module "Plugin"
//! @acp:summary "Plugin artifact naming, validation and installation into the host's plugins directory"
//! @acp:domain plugin
//! @acp:layer service
//!
//! The tagging host discovers plugins by scanning its plugins directory for
//! `acbfxml-plugin-<version>.zip` artifacts.

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{AcbfError, Result};

pub const PLUGIN_ID: &str = "acbf";
pub const PLUGIN_NAME: &str = "ACBF";
pub const PLUGIN_VERSION: &str = env!("CARGO_PKG_VERSION");

const ARTIFACT_PREFIX: &str = "acbfxml-plugin-";
const ARTIFACT_SUFFIX: &str = ".zip";

static ARTIFACT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^acbfxml-plugin-(\d+(?:\.\d+)*(?:[-+][0-9A-Za-z.\-]+)?)\.zip$")
        .expect("Invalid artifact regex")
});

/// `acbfxml-plugin-<version>.zip`
pub fn artifact_name(version: &str) -> String {
    format!("{}{}{}", ARTIFACT_PREFIX, version, ARTIFACT_SUFFIX)
}

/// Version embedded in an artifact file name
pub fn parse_artifact_version(file_name: &str) -> Option<String> {
    ARTIFACT_PATTERN
        .captures(file_name)
        .map(|caps| caps[1].to_string())
}

/// `<config_dir>/ComicTagger/plugins`
pub fn default_plugins_dir() -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join("ComicTagger").join("plugins"))
        .unwrap_or_else(|| PathBuf::from("plugins"))
}

/// An artifact found in a plugins directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledPlugin {
    pub path: PathBuf,
    pub version: String,
}

/// Check that a file is a readable plugin artifact and return its version
pub fn validate_artifact(path: &Path) -> Result<String> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| AcbfError::InvalidArtifact(path.display().to_string()))?;
    let version = parse_artifact_version(file_name).ok_or_else(|| {
        AcbfError::InvalidArtifact(format!(
            "{} does not match {}",
            file_name,
            artifact_name("<version>")
        ))
    })?;

    let archive = ::zip::ZipArchive::new(File::open(path)?)
        .map_err(|e| AcbfError::InvalidArtifact(format!("{}: {}", file_name, e)))?;
    if archive.is_empty() {
        return Err(AcbfError::InvalidArtifact(format!("{} is empty", file_name)));
    }
    Ok(version)
}

/// Copy an artifact into the plugins directory
///
/// Refuses to replace an existing artifact of the same name unless `force`.
pub fn install(artifact: &Path, plugins_dir: &Path, force: bool) -> Result<PathBuf> {
    validate_artifact(artifact)?;

    fs::create_dir_all(plugins_dir)?;
    let file_name = artifact
        .file_name()
        .ok_or_else(|| AcbfError::InvalidArtifact(artifact.display().to_string()))?;
    let target = plugins_dir.join(file_name);

    if target.exists() && fs::canonicalize(&target)? == fs::canonicalize(artifact)? {
        tracing::info!("{} is already in {}", artifact.display(), plugins_dir.display());
        return Ok(target);
    }
    if target.exists() && !force {
        return Err(AcbfError::Other(format!(
            "{} is already installed",
            target.display()
        )));
    }

    fs::copy(artifact, &target)?;
    tracing::info!("Installed {} to {}", artifact.display(), target.display());
    Ok(target)
}

/// Artifacts present in the plugins directory, sorted by file name
pub fn list_installed(plugins_dir: &Path) -> Result<Vec<InstalledPlugin>> {
    if !plugins_dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut found = Vec::new();
    for entry in fs::read_dir(plugins_dir)? {
        let path = entry?.path();
        let version = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(parse_artifact_version);
        if let Some(version) = version {
            found.push(InstalledPlugin { path, version });
        }
    }
    found.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(found)
}

/// Remove installed artifacts; `version` narrows to a single one
pub fn uninstall(plugins_dir: &Path, version: Option<&str>) -> Result<Vec<PathBuf>> {
    let mut removed = Vec::new();
    for plugin in list_installed(plugins_dir)? {
        if version.is_some_and(|v| v != plugin.version) {
            continue;
        }
        fs::remove_file(&plugin.path)?;
        tracing::info!("Removed {}", plugin.path.display());
        removed.push(plugin.path);
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn make_artifact(dir: &Path, version: &str) -> PathBuf {
        let path = dir.join(artifact_name(version));
        let mut writer = ::zip::ZipWriter::new(File::create(&path).unwrap());
        writer
            .start_file("acbfxml/__init__.py", ::zip::write::SimpleFileOptions::default())
            .unwrap();
        writer.write_all(b"# plugin").unwrap();
        writer.finish().unwrap();
        path
    }

    #[test]
    fn test_artifact_name_round_trip() {
        assert_eq!(artifact_name("0.3.0"), "acbfxml-plugin-0.3.0.zip");
        assert_eq!(
            parse_artifact_version("acbfxml-plugin-1.2.0-rc.1.zip").as_deref(),
            Some("1.2.0-rc.1")
        );
        assert_eq!(parse_artifact_version("acbfxml-0.3.0.zip"), None);
        assert_eq!(parse_artifact_version("acbfxml-plugin-.zip"), None);
    }

    #[test]
    fn test_install_refuses_overwrite_without_force() {
        let src = TempDir::new().unwrap();
        let plugins = TempDir::new().unwrap();
        let artifact = make_artifact(src.path(), "0.3.0");

        let installed = install(&artifact, plugins.path(), false).unwrap();
        assert!(installed.exists());
        assert!(install(&artifact, plugins.path(), false).is_err());
        assert!(install(&artifact, plugins.path(), true).is_ok());
    }

    #[test]
    fn test_install_from_plugins_dir_keeps_artifact() {
        let plugins = TempDir::new().unwrap();
        let artifact = make_artifact(plugins.path(), "0.3.0");
        let size = fs::metadata(&artifact).unwrap().len();

        let installed = install(&artifact, plugins.path(), true).unwrap();
        assert_eq!(installed, artifact);
        assert_eq!(fs::metadata(&artifact).unwrap().len(), size);
        assert_eq!(validate_artifact(&artifact).unwrap(), "0.3.0");

        // Same file through a different spelling of the directory
        let dotted = plugins.path().join(".");
        install(&artifact, &dotted, true).unwrap();
        assert_eq!(validate_artifact(&artifact).unwrap(), "0.3.0");
    }

    #[test]
    fn test_install_rejects_non_zip() {
        let src = TempDir::new().unwrap();
        let plugins = TempDir::new().unwrap();
        let bogus = src.path().join(artifact_name("0.1.0"));
        fs::write(&bogus, b"not a zip").unwrap();

        assert!(matches!(
            install(&bogus, plugins.path(), false),
            Err(AcbfError::InvalidArtifact(_))
        ));
    }

    #[test]
    fn test_list_and_uninstall() {
        let plugins = TempDir::new().unwrap();
        make_artifact(plugins.path(), "0.2.0");
        make_artifact(plugins.path(), "0.3.0");
        fs::write(plugins.path().join("other.zip"), b"x").unwrap();

        let listed = list_installed(plugins.path()).unwrap();
        let versions: Vec<_> = listed.iter().map(|p| p.version.as_str()).collect();
        assert_eq!(versions, vec!["0.2.0", "0.3.0"]);

        let removed = uninstall(plugins.path(), Some("0.2.0")).unwrap();
        assert_eq!(removed.len(), 1);
        assert_eq!(list_installed(plugins.path()).unwrap().len(), 1);
    }
}
