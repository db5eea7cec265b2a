//! @acp:module "Archives"
//! @acp:summary "Comic archive access behind a common Archiver trait"
//! @acp:domain archive
//! @acp:layer service
//!
//! ## Supported formats
//!
//! - Zip (`.cbz`, `.zip`)
//! - Tar (`.cbt`, `.tar`)
//! - Folder (a plain directory of images)
//!
//! Rar and 7z comics are read-only in most tagging hosts and are not handled.

pub mod folder;
pub mod tar;
pub mod zip;

use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{AcbfError, Result};

pub use self::folder::FolderArchiver;
pub use self::tar::TarArchiver;
pub use self::zip::ZipArchiver;

/// Archive container formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArchiveKind {
    Zip,
    Tar,
    Folder,
}

impl ArchiveKind {
    /// Guess the kind from a file extension
    pub fn from_extension(ext: &str) -> Option<ArchiveKind> {
        match ext.to_lowercase().as_str() {
            "cbz" | "zip" => Some(ArchiveKind::Zip),
            "cbt" | "tar" => Some(ArchiveKind::Tar),
            _ => None,
        }
    }

    /// Get the human-readable name
    pub fn name(&self) -> &'static str {
        match self {
            ArchiveKind::Zip => "ZIP",
            ArchiveKind::Tar => "TAR",
            ArchiveKind::Folder => "Folder",
        }
    }
}

impl fmt::Display for ArchiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Archive access trait - implemented per container format
pub trait Archiver: Send {
    /// Get the archive kind
    fn kind(&self) -> ArchiveKind;

    /// Path of the archive on disk
    fn path(&self) -> &Path;

    /// Display name of the archive (its file name)
    fn name(&self) -> String {
        self.path()
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path().display().to_string())
    }

    /// Whether files can be added to or removed from this archive
    fn supports_files(&self) -> bool {
        true
    }

    /// Names of all file entries (directories excluded)
    fn file_names(&self) -> Result<Vec<String>>;

    /// Read one entry
    fn read_file(&self, name: &str) -> Result<Vec<u8>>;

    /// Add or replace one entry
    fn write_file(&mut self, name: &str, data: &[u8]) -> Result<()>;

    /// Remove one entry
    fn remove_file(&mut self, name: &str) -> Result<()>;
}

/// Open a comic archive, picking the format by directory, extension or magic bytes
pub fn open_archive(path: &Path) -> Result<Box<dyn Archiver>> {
    if path.is_dir() {
        return Ok(Box::new(FolderArchiver::new(path)));
    }
    if !path.exists() {
        return Err(AcbfError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{} does not exist", path.display()),
        )));
    }

    let kind = match path
        .extension()
        .and_then(|e| e.to_str())
        .and_then(ArchiveKind::from_extension)
    {
        Some(kind) => kind,
        None => sniff_kind(path)?.ok_or_else(|| AcbfError::UnsupportedArchive(path.to_path_buf()))?,
    };

    tracing::debug!("Opening {} as {}", path.display(), kind);

    Ok(match kind {
        ArchiveKind::Zip => Box::new(ZipArchiver::new(path)),
        ArchiveKind::Tar => Box::new(TarArchiver::new(path)),
        ArchiveKind::Folder => Box::new(FolderArchiver::new(path)),
    })
}

/// Detect zip/tar from the file header
fn sniff_kind(path: &Path) -> Result<Option<ArchiveKind>> {
    let mut header = [0u8; 512];
    let mut file = File::open(path)?;
    let mut read = 0;
    while read < header.len() {
        let n = file.read(&mut header[read..])?;
        if n == 0 {
            break;
        }
        read += n;
    }

    if read >= 4 && header.starts_with(b"PK\x03\x04") {
        return Ok(Some(ArchiveKind::Zip));
    }
    if read >= 262 && &header[257..262] == b"ustar" {
        return Ok(Some(ArchiveKind::Tar));
    }
    Ok(None)
}

/// Directory used for sibling temp files when rewriting an archive
pub(crate) fn parent_dir(path: &Path) -> &Path {
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_kind_from_extension() {
        assert_eq!(ArchiveKind::from_extension("CBZ"), Some(ArchiveKind::Zip));
        assert_eq!(ArchiveKind::from_extension("cbt"), Some(ArchiveKind::Tar));
        assert_eq!(ArchiveKind::from_extension("cbr"), None);
    }

    #[test]
    fn test_open_directory_as_folder() {
        let temp = TempDir::new().unwrap();
        let archive = open_archive(temp.path()).unwrap();
        assert_eq!(archive.kind(), ArchiveKind::Folder);
    }

    #[test]
    fn test_open_unknown_format() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("comic.cbr");
        std::fs::write(&path, b"Rar!\x1a\x07\x00").unwrap();
        assert!(matches!(
            open_archive(&path),
            Err(AcbfError::UnsupportedArchive(_))
        ));
    }

    #[test]
    fn test_open_missing_file() {
        let temp = TempDir::new().unwrap();
        assert!(open_archive(&temp.path().join("missing.cbz")).is_err());
    }
}
