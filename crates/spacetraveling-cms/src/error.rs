//! Content store errors.

use thiserror::Error;

/// Result type for content store operations.
pub type Result<T> = std::result::Result<T, CmsError>;

/// Errors returned by a [`ContentClient`](crate::ContentClient).
#[derive(Debug, Error)]
pub enum CmsError {
    /// The requested document does not exist.
    #[error("document not found: {0}")]
    NotFound(String),

    /// Transport failure (connection, timeout, TLS).
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("unexpected status {status} from {url}")]
    Status { status: u16, url: String },

    /// The API answered with a body that does not match the expected shape.
    #[error("malformed response: {0}")]
    Decode(String),

    /// The API root lists no master ref.
    #[error("repository has no master ref")]
    MissingMasterRef,

    /// A pagination cursor this client cannot follow.
    #[error("invalid cursor: {0}")]
    InvalidCursor(String),

    /// Fixture loading error.
    #[error("fixture error: {0}")]
    Fixtures(#[from] serde_json::Error),
}

impl CmsError {
    /// Whether this error means the document is unknown, as opposed to a fetch failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
