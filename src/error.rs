//! @acp:module "Errors"
//! @acp:summary "Error types shared by the library"
//! @acp:domain core
//! @acp:layer model

use std::path::PathBuf;

use thiserror::Error;

/// Library result type
pub type Result<T> = std::result::Result<T, AcbfError>;

/// @acp:summary "All errors produced by ACBF parsing, archives and plugin management"
#[derive(Debug, Error)]
pub enum AcbfError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Zip archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Not an ACBF file")]
    NotAcbf,

    #[error("Unknown ACBF version: {0}")]
    UnknownVersion(String),

    #[error("Malformed XML: {0}")]
    MalformedXml(String),

    #[error("Unsupported archive: {}", .0.display())]
    UnsupportedArchive(PathBuf),

    #[error("File not found in archive: {0}")]
    FileNotFound(String),

    #[error("Invalid entry name: {0}")]
    InvalidEntryName(String),

    #[error("Invalid plugin artifact: {0}")]
    InvalidArtifact(String),

    #[error("{0}")]
    Other(String),
}

impl From<quick_xml::events::attributes::AttrError> for AcbfError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        AcbfError::Xml(err.into())
    }
}
