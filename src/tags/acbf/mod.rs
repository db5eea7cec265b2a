//! @acp:module "ACBF Tag"
//! @acp:summary "Advanced Comic Book Format metadata stored as an .acbf file in the archive"
//! @acp:domain tags
//! @acp:layer service
//!
//! # ACBF
//!
//! ACBF is an XML schema for comic books maintained outside this project.
//! Versions 1.1 and 1.2 are understood; documents are always written back as
//! 1.2. Namespace prefixes are removed when reading, as the official ACBF
//! editor does.

pub mod read;
pub mod write;

use crate::archive::Archiver;
use crate::error::Result;
use crate::metadata::roles::{
    COLORIST_SYNONYMS, COVER_SYNONYMS, EDITOR_SYNONYMS, INKER_SYNONYMS, LETTERER_SYNONYMS,
    PENCILLER_SYNONYMS, TRANSLATOR_SYNONYMS, WRITER_SYNONYMS,
};
use crate::metadata::utils::page_name_list;
use crate::metadata::GenericMetadata;
use crate::plugin::{PLUGIN_ID, PLUGIN_NAME};
use crate::xml;

use super::Tag;

pub const NAMESPACE_1_1: &str = "http://www.acbf.info/xml/acbf/1.1";
pub const NAMESPACE_1_2: &str = "http://www.acbf.info/xml/acbf/1.2";

/// ACBF versions we can read
pub const SUPPORTED_NAMESPACES: &[&str] = &[NAMESPACE_1_1, NAMESPACE_1_2];

/// Version written back to archives
pub const WRITE_NAMESPACE: &str = NAMESPACE_1_2;

/// File name used when an archive has no tag file yet
pub const DEFAULT_TAG_FILE: &str = "comic_metadata.acbf";

const TAG_EXTENSION: &str = ".acbf";

/// Metadata attributes the ACBF tag can store
pub const SUPPORTED_ATTRIBUTES: &[&str] = &[
    "series",
    "issue",
    "title",
    "volume",
    "genres",
    "description",
    "notes",
    "publisher",
    "imprint",
    "day",
    "month",
    "year",
    "language",
    "web_links",
    "manga",
    "maturity_rating",
    "scan_info",
    "tags",
    "pages",
    "pages.bookmark",
    "pages.image_index",
    "characters",
    "teams",
    "locations",
    "credits",
    "credits.person",
    "credits.role",
    "credits.language",
    "data_origin",
    "issue_id",
    "series_id",
    "identifier",
    "rights",
];

/// @acp:summary "ACBF tag plugin"
#[derive(Debug, Clone)]
pub struct AcbfTag {
    tag_file: String,
}

/// The tag file a write would produce, next to what is stored now
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedWrite {
    /// Entry the document is written to
    pub target: String,
    /// Stored bytes of that entry, valid ACBF or not
    pub stored: Option<Vec<u8>>,
    /// New document
    pub bytes: Vec<u8>,
}

impl Default for AcbfTag {
    fn default() -> Self {
        Self::new(DEFAULT_TAG_FILE)
    }
}

impl AcbfTag {
    /// Create a tag writing new documents to `tag_file`
    pub fn new(tag_file: impl Into<String>) -> Self {
        Self {
            tag_file: tag_file.into(),
        }
    }

    /// File name used for archives without a tag file
    pub fn tag_file(&self) -> &str {
        &self.tag_file
    }

    /// Every credit role the format can express, case-folded
    pub fn parseable_credits() -> Vec<&'static str> {
        let mut roles: Vec<&'static str> = [
            WRITER_SYNONYMS,
            PENCILLER_SYNONYMS,
            INKER_SYNONYMS,
            COLORIST_SYNONYMS,
            LETTERER_SYNONYMS,
            COVER_SYNONYMS,
            EDITOR_SYNONYMS,
            TRANSLATOR_SYNONYMS,
        ]
        .concat();
        roles.extend(["adapter", "photographer", "assistant editor", "other"]);
        roles
    }

    /// Name of the first `.acbf` entry in the archive
    pub fn locate(&self, archive: &dyn Archiver) -> Result<Option<String>> {
        Ok(archive
            .file_names()?
            .into_iter()
            .find(|name| name.ends_with(TAG_EXTENSION)))
    }

    /// Whether bytes are an XML document with an ACBF root
    pub fn validate_bytes(bytes: &[u8]) -> bool {
        xml::parse(bytes)
            .map(|root| root.local_name().ends_with("ACBF"))
            .unwrap_or(false)
    }

    /// Parse a tag document into metadata
    pub fn metadata_from_bytes(bytes: &[u8], page_names: &[String]) -> Result<GenericMetadata> {
        read::xml_to_metadata(xml::parse(bytes)?, page_names)
    }

    /// Build a tag document, merging into `existing` when given
    pub fn bytes_from_metadata(md: &GenericMetadata, existing: Option<&[u8]>) -> Result<Vec<u8>> {
        xml::to_bytes(&write::metadata_to_xml(md, existing)?)
    }

    /// Build the document `write_tags` would store, without touching the archive.
    ///
    /// A stored tag file that is not ACBF is not merged; it is overwritten in place.
    pub fn prepare_write(&self, metadata: &GenericMetadata, archive: &dyn Archiver) -> Result<PreparedWrite> {
        let located = self.locate(archive)?;
        let stored = match &located {
            Some(name) => Some(archive.read_file(name)?),
            None => None,
        };
        let existing = stored.as_deref().filter(|bytes| Self::validate_bytes(bytes));
        let bytes = Self::bytes_from_metadata(metadata, existing)?;

        Ok(PreparedWrite {
            target: located.unwrap_or_else(|| self.tag_file.clone()),
            stored,
            bytes,
        })
    }

    /// Located tag file together with its contents, when they validate
    fn valid_tag_file(&self, archive: &dyn Archiver) -> Result<Option<(String, Vec<u8>)>> {
        let Some(name) = self.locate(archive)? else {
            return Ok(None);
        };
        if !self.supports_tags(archive) {
            return Ok(None);
        }
        let bytes = archive.read_file(&name)?;
        if Self::validate_bytes(&bytes) {
            Ok(Some((name, bytes)))
        } else {
            tracing::debug!("{} in {} is not an ACBF document", name, archive.name());
            Ok(None)
        }
    }
}

impl Tag for AcbfTag {
    fn id(&self) -> &'static str {
        PLUGIN_ID
    }

    fn name(&self) -> &'static str {
        PLUGIN_NAME
    }

    fn supported_attributes(&self) -> &'static [&'static str] {
        SUPPORTED_ATTRIBUTES
    }

    fn supports_credit_role(&self, role: &str) -> bool {
        Self::parseable_credits().contains(&role.to_lowercase().as_str())
    }

    fn supports_tags(&self, archive: &dyn Archiver) -> bool {
        archive.supports_files()
    }

    fn has_tags(&self, archive: &dyn Archiver) -> Result<bool> {
        Ok(self.valid_tag_file(archive)?.is_some())
    }

    fn remove_tags(&self, archive: &mut dyn Archiver) -> Result<bool> {
        match self.valid_tag_file(archive)? {
            Some((name, _)) => {
                archive.remove_file(&name)?;
                tracing::info!("Removed {} tags from {}", self.name(), archive.name());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn read_tags(&self, archive: &dyn Archiver) -> Result<GenericMetadata> {
        match self.valid_tag_file(archive)? {
            Some((_, bytes)) => {
                let pages = page_name_list(&archive.file_names()?);
                Self::metadata_from_bytes(&bytes, &pages)
            }
            None => Ok(GenericMetadata::default()),
        }
    }

    fn read_raw_tags(&self, archive: &dyn Archiver) -> Result<String> {
        match self.valid_tag_file(archive)? {
            Some((_, bytes)) => xml::to_string(&xml::parse(&bytes)?),
            None => Ok(String::new()),
        }
    }

    fn write_tags(&self, metadata: &GenericMetadata, archive: &mut dyn Archiver) -> Result<bool> {
        if !self.supports_tags(archive) {
            tracing::warn!(
                "Archive ({}) does not support {} metadata",
                archive.name(),
                self.name()
            );
            return Ok(false);
        }

        let prepared = self.prepare_write(metadata, archive)?;
        archive.write_file(&prepared.target, &prepared.bytes)?;
        tracing::info!(
            "Wrote {} tags to {} ({})",
            self.name(),
            archive.name(),
            prepared.target
        );
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supports_credit_role() {
        let tag = AcbfTag::default();
        assert!(tag.supports_credit_role("Writer"));
        assert!(tag.supports_credit_role("Assistant Editor"));
        assert!(tag.supports_credit_role("colourist"));
        assert!(!tag.supports_credit_role("Gaffer"));
    }

    #[test]
    fn test_validate_bytes() {
        assert!(AcbfTag::validate_bytes(b"<ACBF/>"));
        assert!(AcbfTag::validate_bytes(
            br#"<ACBF xmlns="http://www.acbf.info/xml/acbf/1.1"></ACBF>"#
        ));
        assert!(!AcbfTag::validate_bytes(b"<ComicInfo/>"));
        assert!(!AcbfTag::validate_bytes(b"\x00\x01binary"));
    }

    #[test]
    fn test_supported_attributes_cover_rights() {
        let tag = AcbfTag::default();
        assert!(tag.supported_attributes().contains(&"rights"));
        assert!(tag.supported_attributes().contains(&"pages.bookmark"));
    }

    #[test]
    fn test_prepare_write_keeps_stored_bytes() {
        use crate::archive::FolderArchiver;

        let temp = tempfile::TempDir::new().unwrap();
        let stored = b"<ACBF>  <meta-data><book-info><book-title>Old</book-title></book-info></meta-data></ACBF>";
        std::fs::write(temp.path().join("book.acbf"), stored).unwrap();
        let archive = FolderArchiver::new(temp.path());

        let md = GenericMetadata {
            is_empty: false,
            title: Some("New".to_string()),
            ..Default::default()
        };
        let prepared = AcbfTag::default().prepare_write(&md, &archive).unwrap();
        assert_eq!(prepared.target, "book.acbf");
        assert_eq!(prepared.stored.as_deref(), Some(&stored[..]));
        let written = String::from_utf8(prepared.bytes).unwrap();
        assert!(written.contains("New"));
        assert!(!written.contains("Old"));
        // Nothing is written
        assert_eq!(std::fs::read(temp.path().join("book.acbf")).unwrap(), stored);
    }

    #[test]
    fn test_prepare_write_without_tag_file() {
        use crate::archive::FolderArchiver;

        let temp = tempfile::TempDir::new().unwrap();
        let archive = FolderArchiver::new(temp.path());
        let prepared = AcbfTag::new("saga.acbf")
            .prepare_write(&GenericMetadata::default(), &archive)
            .unwrap();
        assert_eq!(prepared.target, "saga.acbf");
        assert_eq!(prepared.stored, None);
    }
}
