//! Folder archiver - a directory of page images

use std::fs;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use walkdir::WalkDir;

use super::{ArchiveKind, Archiver};
use crate::error::{AcbfError, Result};

pub struct FolderArchiver {
    root: PathBuf,
}

impl FolderArchiver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Path of an entry, which must stay inside the folder
    fn entry_path(&self, name: &str) -> Result<PathBuf> {
        let relative = Path::new(name);
        let inside = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        if name.is_empty() || !inside {
            return Err(AcbfError::InvalidEntryName(name.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

impl Archiver for FolderArchiver {
    fn kind(&self) -> ArchiveKind {
        ArchiveKind::Folder
    }

    fn path(&self) -> &Path {
        &self.root
    }

    fn file_names(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in WalkDir::new(&self.root).sort_by_file_name() {
            let entry = entry.map_err(|e| AcbfError::Other(e.to_string()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            if let Ok(relative) = entry.path().strip_prefix(&self.root) {
                let name = relative
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/");
                names.push(name);
            }
        }
        Ok(names)
    }

    fn read_file(&self, name: &str) -> Result<Vec<u8>> {
        fs::read(self.entry_path(name)?).map_err(|e| match e.kind() {
            ErrorKind::NotFound => AcbfError::FileNotFound(name.to_string()),
            _ => e.into(),
        })
    }

    fn write_file(&mut self, name: &str, data: &[u8]) -> Result<()> {
        let path = self.entry_path(name)?;
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, data)?;
        Ok(())
    }

    fn remove_file(&mut self, name: &str) -> Result<()> {
        fs::remove_file(self.entry_path(name)?).map_err(|e| match e.kind() {
            ErrorKind::NotFound => AcbfError::FileNotFound(name.to_string()),
            _ => e.into(),
        })
    }
}
