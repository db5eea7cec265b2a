//! @acp:module "Configuration"
//! @acp:summary "CLI configuration loading and defaults"
//! @acp:domain cli
//! @acp:layer config

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::plugin::default_plugins_dir;
use crate::tags::acbf::DEFAULT_TAG_FILE;

/// Default config file name, looked up in the working directory
pub const CONFIG_FILE: &str = ".acbfxml.config.json";

/// @acp:summary "Main acbfxml configuration structure"
/// @acp:lock normal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Name of the tag file created in archives without one
    #[serde(default = "default_tag_file")]
    pub tag_file: String,

    /// Archive patterns to include when scanning (glob syntax)
    #[serde(default = "default_include")]
    pub include: Vec<String>,

    /// Archive patterns to exclude when scanning (glob syntax)
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,

    /// Parallel workers for scans (0 = one per CPU)
    #[serde(default)]
    pub workers: usize,

    /// Host plugins directory used by `install`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plugins_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tag_file: default_tag_file(),
            include: default_include(),
            exclude: default_exclude(),
            workers: 0,
            plugins_dir: None,
        }
    }
}

impl Config {
    /// @acp:summary "Load config from .acbfxml.config.json file"
    pub fn load<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// @acp:summary "Save config to a file"
    pub fn save<P: AsRef<Path>>(&self, path: P) -> crate::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// @acp:summary "Load config from a file, or defaults when the file is missing"
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Plugins directory, falling back to the host's default
    pub fn plugins_dir(&self) -> PathBuf {
        self.plugins_dir.clone().unwrap_or_else(default_plugins_dir)
    }
}

fn default_tag_file() -> String {
    DEFAULT_TAG_FILE.to_string()
}

fn default_include() -> Vec<String> {
    vec![
        "**/*.cbz".to_string(),
        "**/*.zip".to_string(),
        "**/*.cbt".to_string(),
        "**/*.tar".to_string(),
    ]
}

fn default_exclude() -> Vec<String> {
    vec![
        "**/__MACOSX/**".to_string(),
        "**/.git/**".to_string(),
    ]
}
