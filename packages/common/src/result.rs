use crate::error::EditError;

/// Common Result type alias
pub type EditResult<T> = Result<T, EditError>;
