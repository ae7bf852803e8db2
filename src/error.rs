//! Error types for package parsing.
use thiserror::Error;

/// Result type for package parsing.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for longan operations.
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// ZIP archive error
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// XML parsing error
    #[error("XML error: {0}")]
    Xml(String),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Required part missing from the package
    #[error("Part not found: {0}")]
    PartNotFound(String),

    /// Required relationship missing
    #[error("Relationship not found: {0}")]
    RelationshipNotFound(String),

    /// Package structure is not a valid presentation
    #[error("Invalid package: {0}")]
    InvalidPackage(String),
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::Xml(err.to_string())
    }
}
