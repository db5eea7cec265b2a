//! Tar (cbt) archiver

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use ::tar::{Archive, Builder, EntryType, Header};
use tempfile::NamedTempFile;

use super::{parent_dir, ArchiveKind, Archiver};
use crate::error::{AcbfError, Result};

/// Tar archiver - streams entries into a fresh archive on modification
pub struct TarArchiver {
    path: PathBuf,
}

impl TarArchiver {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn rebuild(&self, skip: &str, add: Option<(&str, &[u8])>) -> Result<()> {
        let temp = NamedTempFile::new_in(parent_dir(&self.path))?;
        let mut builder = Builder::new(temp);

        {
            let mut source = Archive::new(File::open(&self.path)?);
            for entry in source.entries()? {
                let mut entry = entry?;
                let name = entry.path()?.to_string_lossy().into_owned();
                if name == skip {
                    continue;
                }
                // append_data re-emits long names that the reader folded into the path
                let mut header = entry.header().clone();
                builder.append_data(&mut header, &name, &mut entry)?;
            }
        }

        if let Some((name, data)) = add {
            let mut header = Header::new_gnu();
            header.set_entry_type(EntryType::Regular);
            header.set_size(data.len() as u64);
            header.set_mode(0o644);
            header.set_mtime(
                SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .map(|d| d.as_secs())
                    .unwrap_or(0),
            );
            builder.append_data(&mut header, name, data)?;
        }

        let temp = builder.into_inner()?;
        temp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }
}

impl Archiver for TarArchiver {
    fn kind(&self) -> ArchiveKind {
        ArchiveKind::Tar
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn file_names(&self) -> Result<Vec<String>> {
        let mut archive = Archive::new(File::open(&self.path)?);
        let mut names = Vec::new();
        // Bodies are skipped by the iterator, only headers are read
        for entry in archive.entries()? {
            let entry = entry?;
            if entry.header().entry_type().is_file() {
                names.push(entry.path()?.to_string_lossy().into_owned());
            }
        }
        Ok(names)
    }

    fn read_file(&self, name: &str) -> Result<Vec<u8>> {
        let mut archive = Archive::new(File::open(&self.path)?);
        for entry in archive.entries()? {
            let mut entry = entry?;
            if entry.path()?.to_string_lossy() == name {
                let mut data = Vec::new();
                entry.read_to_end(&mut data)?;
                return Ok(data);
            }
        }
        Err(AcbfError::FileNotFound(name.to_string()))
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

    fn make_cbt(dir: &Path) -> PathBuf {
        let path = dir.join("comic.cbt");
        let mut builder = Builder::new(File::create(&path).unwrap());
        for name in ["01.jpg", "02.jpg"] {
            let mut header = Header::new_gnu();
            header.set_size(name.len() as u64);
            header.set_mode(0o644);
            builder.append_data(&mut header, name, name.as_bytes()).unwrap();
        }
        builder.finish().unwrap();
        path
    }

    #[test]
    fn test_write_replace_remove() {
        let temp = TempDir::new().unwrap();
        let mut archive = TarArchiver::new(make_cbt(temp.path()));

        archive.write_file("comic.acbf", b"one").unwrap();
        archive.write_file("comic.acbf", b"two").unwrap();
        assert_eq!(archive.read_file("comic.acbf").unwrap(), b"two");
        assert_eq!(archive.file_names().unwrap(), vec!["01.jpg", "02.jpg", "comic.acbf"]);

        archive.remove_file("comic.acbf").unwrap();
        assert_eq!(archive.file_names().unwrap(), vec!["01.jpg", "02.jpg"]);
        assert_eq!(archive.read_file("02.jpg").unwrap(), b"02.jpg");
    }

    #[test]
    fn test_rebuild_keeps_directories_and_long_names() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("long.cbt");
        let long_name = format!("{}/page 01.jpg", "a very long chapter directory name ".repeat(4));
        {
            let mut builder = Builder::new(File::create(&path).unwrap());
            let mut dir = Header::new_gnu();
            dir.set_entry_type(EntryType::Directory);
            dir.set_size(0);
            dir.set_mode(0o755);
            builder.append_data(&mut dir, "chapter/", std::io::empty()).unwrap();
            let mut header = Header::new_gnu();
            header.set_size(4);
            header.set_mode(0o644);
            builder.append_data(&mut header, &long_name, &b"page"[..]).unwrap();
            builder.finish().unwrap();
        }

        let mut archive = TarArchiver::new(&path);
        assert_eq!(archive.file_names().unwrap(), vec![long_name.clone()]);

        archive.write_file("comic.acbf", b"<ACBF/>").unwrap();
        assert_eq!(
            archive.file_names().unwrap(),
            vec![long_name.clone(), "comic.acbf".to_string()]
        );
        assert_eq!(archive.read_file(&long_name).unwrap(), b"page");

        let mut dirs = 0;
        for entry in Archive::new(File::open(&path).unwrap()).entries().unwrap() {
            if entry.unwrap().header().entry_type().is_dir() {
                dirs += 1;
            }
        }
        assert_eq!(dirs, 1);
    }
}
