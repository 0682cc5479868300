use thiserror::Error;

/// Errors from issuing or verifying a token
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// The token is well formed and authentic but past its expiry
    #[error("Token expired")]
    Expired,

    /// The token is malformed or its signature does not verify
    #[error("Invalid token: {0}")]
    Invalid(String),

    /// The signing key could not be loaded
    #[error("Invalid signing key: {0}")]
    Key(String),
}
