//! Error types for wp-config.
//!
//! Error messages never include credential values.

use std::path::PathBuf;

/// Result type alias for wp-config operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for wp-config operations.
#[derive(Debug, thiserror::Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional source error.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl Error {
    /// Create a new error with the given kind.
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind, source: None }
    }

    /// Create a new error with the given kind and source.
    pub fn with_source(
        kind: ErrorKind,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            source: Some(Box::new(source)),
        }
    }

    /// Returns true if a site lookup failed.
    pub fn is_site_not_found(&self) -> bool {
        matches!(self.kind, ErrorKind::SiteNotFound(_))
    }
}

/// The kind of error that occurred.
#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    /// No site record for the requested domain.
    #[error("Site not found in configuration: {0}")]
    SiteNotFound(String),

    /// Refused to overwrite an existing configuration file.
    #[error("Configuration file already exists: {}", .0.display())]
    AlreadyExists(PathBuf),

    /// Validation failed; one message per problem.
    #[error("Invalid configuration: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// IO error.
    #[error("IO error: {0}")]
    Io(String),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::with_source(ErrorKind::Json(err.to_string()), err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::with_source(ErrorKind::Io(err.to_string()), err)
    }
}
