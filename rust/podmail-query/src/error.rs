//! Error types for query plans

use thiserror::Error;

/// Errors that can occur while building or loading a query plan.
///
/// Resolution itself never fails: documents that cannot be fetched or parsed
/// are recorded as [`Outcome::Failed`](crate::Outcome::Failed) and simply
/// contribute no facts.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    /// A variable name is empty or contains characters other than
    /// alphanumerics, `_` and `-`
    #[error("Invalid variable name {name:?}")]
    InvalidVariable { name: String },

    /// A constant slot does not hold a valid IRI
    #[error("Invalid constant {value:?}: {reason}")]
    InvalidConstant { value: String, reason: String },

    /// Serialization/deserialization errors
    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

/// Result type for query plan operations
pub type QueryResult<T> = Result<T, QueryError>;

impl From<serde_json::Error> for QueryError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            message: err.to_string(),
        }
    }
}
