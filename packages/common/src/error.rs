use thiserror::Error;

/// Failure reported by a remote store (document or spreadsheet backend).
///
/// These are surfaced unmodified through [`EditError::Remote`]; callers decide
/// whether to retry.
#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Batch rejected: {0}")]
    Rejected(String),

    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

/// Error type shared by every quire crate
#[derive(Error, Debug)]
pub enum EditError {
    /// Load data was missing indices, counts or a recognisable payload
    #[error("Malformed document data: {0}")]
    Structural(String),

    /// Navigation past either end of the chain, or use of a stale/unactivated element
    #[error("Not initialized: {0}")]
    NotInitialized(String),

    #[error("Row {row} is out of bounds (length {length}); append rows first")]
    RowOutOfBounds { row: usize, length: usize },

    #[error("Will not implicitly create {requested} rows (limit {limit})")]
    ImplicitAppendLimit { requested: usize, limit: usize },

    #[error("Read only: {0}")]
    ReadOnly(String),

    #[error("Element was already activated; it can only be inserted once")]
    AlreadyActivated,

    #[error("Remote error: {0}")]
    Remote(#[from] RemoteError),
}

impl EditError {
    pub fn structural(message: impl Into<String>) -> Self {
        Self::Structural(message.into())
    }

    pub fn not_initialized(message: impl Into<String>) -> Self {
        Self::NotInitialized(message.into())
    }

    pub fn read_only(message: impl Into<String>) -> Self {
        Self::ReadOnly(message.into())
    }

    /// True for both bounds variants
    pub fn is_bounds(&self) -> bool {
        matches!(
            self,
            EditError::RowOutOfBounds { .. } | EditError::ImplicitAppendLimit { .. }
        )
    }
}
