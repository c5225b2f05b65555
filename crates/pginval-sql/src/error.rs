//! Error types for pginval-sql

use thiserror::Error;

/// Result type for pginval-sql operations.
pub type SqlResult<T> = Result<T, SqlError>;

/// Error type for SQL classification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SqlError {
    /// The parser rejected the input.
    #[error("Parse error: {0}")]
    Parse(String),
    /// A recognized statement whose inner structure is not the expected one.
    #[error("Unsupported {kind} shape: {reason}")]
    UnsupportedShape { kind: &'static str, reason: String },
}

impl SqlError {
    /// Create a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        SqlError::Parse(message.into())
    }

    /// Create an unsupported-shape error.
    pub fn unsupported(kind: &'static str, reason: impl Into<String>) -> Self {
        SqlError::UnsupportedShape {
            kind,
            reason: reason.into(),
        }
    }

    /// Check if this is a parser error.
    pub fn is_parse(&self) -> bool {
        matches!(self, Self::Parse(_))
    }
}
