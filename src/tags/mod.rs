//! @acp:module "Tags"
//! @acp:summary "Metadata tag plugin contract and built-in tag registry"
//! @acp:domain tags
//! @acp:layer service
//!
//! A tag is one metadata format stored inside a comic archive. The tagging
//! host talks to every format through the [`Tag`] trait; this crate provides
//! the ACBF implementation.

pub mod acbf;

use crate::archive::Archiver;
use crate::error::Result;
use crate::metadata::GenericMetadata;

pub use acbf::{AcbfTag, PreparedWrite};

/// Tag plugin trait - implement for each metadata format
pub trait Tag: Send + Sync {
    /// Stable identifier used by the host (e.g. `acbf`)
    fn id(&self) -> &'static str;

    /// Human-readable format name
    fn name(&self) -> &'static str;

    /// Whether the tag is available to the host
    fn enabled(&self) -> bool {
        true
    }

    /// Metadata attributes this format can store
    fn supported_attributes(&self) -> &'static [&'static str];

    /// Whether a credit role can be stored
    fn supports_credit_role(&self, role: &str) -> bool;

    /// Whether the archive can hold this tag at all
    fn supports_tags(&self, archive: &dyn Archiver) -> bool;

    /// Whether the archive currently carries valid tags
    fn has_tags(&self, archive: &dyn Archiver) -> Result<bool>;

    /// Remove the tags; returns whether anything was removed
    fn remove_tags(&self, archive: &mut dyn Archiver) -> Result<bool>;

    /// Read tags into generic metadata (empty metadata when absent)
    fn read_tags(&self, archive: &dyn Archiver) -> Result<GenericMetadata>;

    /// Raw tag document, empty when absent
    fn read_raw_tags(&self, archive: &dyn Archiver) -> Result<String>;

    /// Write tags; returns false when the archive cannot hold them
    fn write_tags(&self, metadata: &GenericMetadata, archive: &mut dyn Archiver) -> Result<bool>;
}

/// All built-in tags
pub fn registry() -> Vec<Box<dyn Tag>> {
    vec![Box::new(AcbfTag::default())]
}

/// Look up a built-in tag by id
pub fn by_id(id: &str) -> Option<Box<dyn Tag>> {
    registry()
        .into_iter()
        .find(|tag| tag.id().eq_ignore_ascii_case(id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_lookup() {
        let tag = by_id("ACBF").unwrap();
        assert_eq!(tag.id(), "acbf");
        assert_eq!(tag.name(), "ACBF");
        assert!(tag.enabled());
        assert!(by_id("comicrack").is_none());
    }
}
