//! Error definitions shared by every upstream source.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while querying an upstream or reshaping its answer.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Connection, timeout or body decoding failure.
    #[error("{source_name} request failed: {error}")]
    Request {
        source_name: &'static str,
        #[source]
        error: reqwest::Error,
    },

    /// The upstream answered with a non-success status.
    #[error("{source_name} returned HTTP {status}")]
    Status { source_name: &'static str, status: u16 },

    /// The local export file could not be read.
    #[error("cannot read {}: {error}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        error: std::io::Error,
    },

    /// A document was not valid JSON.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// An expected field is absent from the document.
    #[error("missing field '{0}'")]
    MissingField(String),

    /// A field is present but has an unusable value.
    #[error("invalid field '{field}': {reason}")]
    InvalidField { field: String, reason: String },

    /// A request URL could not be built.
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// A configured header cannot be sent.
    #[error("invalid header '{0}'")]
    Header(String),

    /// The whole dashboard request ran past its deadline.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// The shared HTTP client could not be constructed.
    #[error("cannot build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

impl SourceError {
    pub(crate) fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

pub type SourceResult<T> = Result<T, SourceError>;
