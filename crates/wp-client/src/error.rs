//! Error types for wp-client.

use std::time::Duration;

use crate::response::ResponseBody;

/// Result type alias for wp-client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for wp-client operations.
#[derive(Debug, thiserror::Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional source error. For exhausted retries this is the last attempt's failure.
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

    /// Returns true if this is a timeout failure.
    pub fn is_timeout(&self) -> bool {
        matches!(self.kind, ErrorKind::Timeout { .. })
    }

    /// Returns true for transport-level failures (timeouts included).
    pub fn is_network(&self) -> bool {
        self.kind.is_network()
    }

    /// Returns true if every attempt failed with a retry-eligible HTTP or network error.
    ///
    /// A final timed-out attempt is reported as [`ErrorKind::Timeout`] instead.
    pub fn is_exhausted(&self) -> bool {
        matches!(self.kind, ErrorKind::RetriesExhausted { .. })
    }

    /// The last HTTP status seen, if the failure came from a response.
    pub fn status(&self) -> Option<u16> {
        match &self.kind {
            ErrorKind::Http { status, .. } => Some(*status),
            ErrorKind::RetriesExhausted { status, .. } => *status,
            _ => None,
        }
    }

    /// The decoded error body of the last response, if any.
    pub fn body(&self) -> Option<&ResponseBody> {
        match &self.kind {
            ErrorKind::Http { body, .. } => Some(body),
            ErrorKind::RetriesExhausted { body, .. } => body.as_ref(),
            _ => None,
        }
    }

    /// Number of attempts made before this error was surfaced, when known.
    pub fn attempts(&self) -> Option<u32> {
        match &self.kind {
            ErrorKind::RetriesExhausted { attempts, .. } => Some(*attempts),
            ErrorKind::Timeout { attempts, .. } => Some(*attempts),
            _ => None,
        }
    }
}

/// The kind of error that occurred.
#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    /// Transport-level failure (connection refused, reset, broken body stream).
    #[error("Network error: {0}")]
    Network(String),

    /// An attempt did not complete within the configured timeout.
    #[error("Request timed out after {}ms ({attempts} attempts)", timeout.as_millis())]
    Timeout { timeout: Duration, attempts: u32 },

    /// Non-2xx HTTP response.
    #[error("Request failed: {status} {reason}")]
    Http {
        status: u16,
        reason: String,
        body: ResponseBody,
    },

    /// Every configured attempt failed with a retry-eligible error.
    #[error("Request failed after {attempts} attempts: {last_error}")]
    RetriesExhausted {
        attempts: u32,
        status: Option<u16>,
        last_error: String,
        body: Option<ResponseBody>,
    },

    /// Invalid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(String),

    /// IO error while preparing a request (e.g. reading an upload).
    #[error("IO error: {0}")]
    Io(String),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Other error.
    #[error("{0}")]
    Other(String),
}

impl ErrorKind {
    /// Returns true for transport-level failures, which includes timeouts.
    pub fn is_network(&self) -> bool {
        matches!(self, ErrorKind::Network(_) | ErrorKind::Timeout { .. })
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        let kind = if err.is_builder() {
            ErrorKind::Config(err.to_string())
        } else if err.is_redirect() {
            ErrorKind::Other(err.to_string())
        } else {
            // connect, request, body and decode failures are all transport-level
            ErrorKind::Network(err.to_string())
        };

        Error::with_source(kind, err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::with_source(ErrorKind::Json(err.to_string()), err)
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::with_source(ErrorKind::InvalidUrl(err.to_string()), err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::with_source(ErrorKind::Io(err.to_string()), err)
    }
}
