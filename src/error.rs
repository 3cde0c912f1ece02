//! Error types shared by the client, document model and exporters.

use std::path::PathBuf;
use thiserror::Error;

/// Convenience alias used throughout the library.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Everything that can go wrong while talking to n8n or handling workflow documents.
#[derive(Error, Debug)]
pub enum Error {
    /// Local setup is missing or invalid. Raised before any request is sent.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The server rejected the API key.
    #[error("Authentication rejected by n8n ({status}): {message}")]
    Authentication { status: u16, message: String },

    #[error("Workflow '{id}' not found")]
    NotFound { id: String },

    /// A document did not match the workflow schema.
    #[error("Malformed workflow document: {0}")]
    MalformedDocument(String),

    /// A locally built or edited workflow breaks a structural invariant.
    #[error("Invalid workflow: {0}")]
    InvalidTemplate(String),

    /// Transport failure, timeout or server-side (5xx) error.
    #[error("n8n service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Any other non-success status, e.g. a 400 validation error from the server.
    #[error("Unexpected response from n8n ({status}): {body}")]
    UnexpectedResponse { status: u16, body: String },

    #[error("Node '{node}' not found in workflow '{workflow}'")]
    NodeNotFound { workflow: String, node: String },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether the error should abort a CLI run rather than being reported and skipped.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Configuration(_) | Self::Authentication { .. })
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::ServiceUnavailable(format!("request timed out: {}", e))
        } else if e.is_decode() {
            Self::MalformedDocument(e.to_string())
        } else if e.is_builder() {
            Self::Configuration(e.to_string())
        } else {
            Self::ServiceUnavailable(e.to_string())
        }
    }
}
