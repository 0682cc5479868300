use podmail_rdf::Iri;
use podmail_remote::FetchError;
use thiserror::Error;

/// A `WAC-Allow` header that does not follow the advertised grammar
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CapabilityError {
    /// The header could not be parsed
    #[error("Malformed WAC-Allow header {header:?}: {reason}")]
    Parse { header: String, reason: String },
}

/// Errors of the access checks
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AccessError {
    /// The probed resource could not be reached
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The probed resource does not advertise its capabilities
    #[error("WAC-Allow header not found for resource <{uri}>")]
    MissingHeader { uri: Iri },

    /// The advertised capabilities could not be parsed
    #[error(transparent)]
    Capability(#[from] CapabilityError),

    /// The person is not listed in any of the allowed groups
    #[error("Person is not a member of any allowed group")]
    NotMember { person: Iri, groups: Vec<Iri> },
}
