use thiserror::Error;

/// Failures surfaced by a data-source collaborator, passed through untouched.
pub type SourceError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum PageError {
    /// The effective ordering contains something other than a plain field
    /// reference. Raised before any query executes.
    #[error("unsupported order expression: {0}")]
    InvalidOrder(String),

    /// The cursor token failed to parse, or its field sequence does not
    /// match the active ordering.
    #[error("invalid cursor: {0}")]
    InvalidCursor(String),

    /// An underlying data-source failure. Not retried, not degraded.
    #[error("source error: {0}")]
    Source(#[from] SourceError),
}

pub type Result<T> = std::result::Result<T, PageError>;
