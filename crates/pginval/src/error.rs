//! Error types for pginval

use thiserror::Error;

/// Result type alias for pginval operations
pub type InvalResult<T> = Result<T, InvalError>;

/// Error types for cache invalidation
#[derive(Debug, Error)]
pub enum InvalError {
    /// The cache client rejected an invalidation
    #[error("Cache error: {0}")]
    Cache(String),

    /// Empty or malformed input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// SQL classification error
    #[error(transparent)]
    Sql(#[from] pginval_sql::SqlError),
}

impl InvalError {
    /// Create a cache error
    pub fn cache(message: impl Into<String>) -> Self {
        Self::Cache(message.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Check if this is a cache error
    pub fn is_cache(&self) -> bool {
        matches!(self, Self::Cache(_))
    }
}
