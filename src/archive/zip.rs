//! Zip (cbz) archiver

use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use ::zip::result::ZipError;
use ::zip::write::SimpleFileOptions;
use ::zip::{ZipArchive, ZipWriter};
use tempfile::NamedTempFile;

use super::{parent_dir, ArchiveKind, Archiver};
use crate::error::{AcbfError, Result};

/// Zip archiver - rewrites the whole archive on modification
pub struct ZipArchiver {
    path: PathBuf,
}

impl ZipArchiver {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn open(&self) -> Result<ZipArchive<File>> {
        Ok(ZipArchive::new(File::open(&self.path)?)?)
    }

    /// Copy every entry except `skip` into a fresh archive, then append `add`
    fn rebuild(&self, skip: &str, add: Option<(&str, &[u8])>) -> Result<()> {
        let mut source = self.open()?;
        let comment = source.comment().to_vec();

        let temp = NamedTempFile::new_in(parent_dir(&self.path))?;
        let mut writer = ZipWriter::new(temp);
        writer.set_raw_comment(comment.into_boxed_slice());

        for i in 0..source.len() {
            let entry = source.by_index_raw(i)?;
            if entry.name() == skip {
                continue;
            }
            writer.raw_copy_file(entry)?;
        }

        if let Some((name, data)) = add {
            writer.start_file(name, SimpleFileOptions::default())?;
            writer.write_all(data)?;
        }

        let temp = writer.finish()?;
        temp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }
}

impl Archiver for ZipArchiver {
    fn kind(&self) -> ArchiveKind {
        ArchiveKind::Zip
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn file_names(&self) -> Result<Vec<String>> {
        let archive = self.open()?;
        Ok(archive
            .file_names()
            .filter(|name| !name.ends_with('/'))
            .map(str::to_string)
            .collect())
    }

    fn read_file(&self, name: &str) -> Result<Vec<u8>> {
        let mut archive = self.open()?;
        let mut entry = archive.by_name(name).map_err(|e| match e {
            ZipError::FileNotFound => AcbfError::FileNotFound(name.to_string()),
            other => other.into(),
        })?;
        let mut data = Vec::new();
        entry.read_to_end(&mut data)?;
        Ok(data)
    }

    fn write_file(&mut self, name: &str, data: &[u8]) -> Result<()> {
        tracing::debug!("Writing {} into {}", name, self.path.display());
        self.rebuild(name, Some((name, data)))
    }

    fn remove_file(&mut self, name: &str) -> Result<()> {
        tracing::debug!("Removing {} from {}", name, self.path.display());
        self.rebuild(name, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn make_cbz(dir: &Path) -> PathBuf {
        let path = dir.join("comic.cbz");
        let mut writer = ZipWriter::new(File::create(&path).unwrap());
        for name in ["01.jpg", "02.jpg"] {
            writer.start_file(name, SimpleFileOptions::default()).unwrap();
            writer.write_all(name.as_bytes()).unwrap();
        }
        writer.finish().unwrap();
        path
    }

    #[test]
    fn test_write_then_read() {
        let temp = TempDir::new().unwrap();
        let mut archive = ZipArchiver::new(make_cbz(temp.path()));

        archive.write_file("comic.acbf", b"<ACBF/>").unwrap();

        assert_eq!(archive.read_file("comic.acbf").unwrap(), b"<ACBF/>");
        assert_eq!(archive.read_file("01.jpg").unwrap(), b"01.jpg");
        assert_eq!(archive.file_names().unwrap().len(), 3);
    }

    #[test]
    fn test_replace_and_remove() {
        let temp = TempDir::new().unwrap();
        let mut archive = ZipArchiver::new(make_cbz(temp.path()));

        archive.write_file("comic.acbf", b"one").unwrap();
        archive.write_file("comic.acbf", b"two").unwrap();
        assert_eq!(archive.read_file("comic.acbf").unwrap(), b"two");
        assert_eq!(archive.file_names().unwrap().len(), 3);

        archive.remove_file("comic.acbf").unwrap();
        assert!(matches!(
            archive.read_file("comic.acbf"),
            Err(AcbfError::FileNotFound(_))
        ));
    }
}
