use podmail_rdf::{Iri, RdfError};
use thiserror::Error;

/// Reasons a remote document could not be obtained
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FetchError {
    /// The request never produced a response
    #[error("Request to <{uri}> failed: {reason}")]
    Network { uri: Iri, reason: String },

    /// The server answered with a non-success status
    #[error("Request to <{uri}> returned HTTP {status}")]
    Status { uri: Iri, status: u16 },

    /// No response arrived within the allotted time
    #[error("Request to <{uri}> timed out")]
    Timeout { uri: Iri },

    /// The response body is not a valid RDF document
    #[error(transparent)]
    Parse(#[from] RdfError),

    /// The HTTP client could not be set up from its configuration
    #[error("HTTP client could not be configured: {reason}")]
    Client { reason: String },
}

impl FetchError {
    /// Returns true for failures that may not recur if the request is
    /// repeated later: network errors, timeouts, throttling and server errors.
    /// A `false` result means the document is known to be unavailable.
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::Network { .. } | FetchError::Timeout { .. } => true,
            FetchError::Status { status, .. } => *status == 429 || *status >= 500,
            FetchError::Parse(_) | FetchError::Client { .. } => false,
        }
    }

    /// Short machine readable label for logs
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Network { .. } => "network",
            FetchError::Status { .. } => "status",
            FetchError::Timeout { .. } => "timeout",
            FetchError::Parse(_) => "parse",
            FetchError::Client { .. } => "client",
        }
    }
}
