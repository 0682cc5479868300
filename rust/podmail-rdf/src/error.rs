use thiserror::Error;

/// Errors produced while constructing or parsing RDF data
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RdfError {
    /// A string could not be interpreted as an absolute IRI
    #[error("Invalid IRI {iri:?}: {reason}")]
    InvalidIri {
        /// The offending input
        iri: String,
        /// Why it was rejected
        reason: String,
    },

    /// A document body is not valid Turtle
    #[error("Unable to parse <{document}> as Turtle: {reason}")]
    Syntax {
        /// The document the body was fetched from
        document: String,
        /// Parser diagnostic
        reason: String,
    },
}
