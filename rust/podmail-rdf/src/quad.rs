use std::fmt::{self, Display};

use crate::{Iri, Term};

/// A subject-predicate-object statement as it appears in a single document
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Triple {
    /// Subject of the statement
    pub subject: Term,
    /// Predicate of the statement
    pub predicate: Iri,
    /// Object of the statement
    pub object: Term,
}

impl Triple {
    /// Creates a new triple
    pub fn new(subject: impl Into<Term>, predicate: Iri, object: impl Into<Term>) -> Self {
        Self {
            subject: subject.into(),
            predicate,
            object: object.into(),
        }
    }

    /// Tags this triple with the document it was asserted by
    pub fn in_graph(self, graph: Iri) -> Quad {
        Quad {
            subject: self.subject,
            predicate: self.predicate,
            object: self.object,
            graph,
        }
    }
}

impl Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}> {} .", self.subject, self.predicate, self.object)
    }
}

/// A [`Triple`] together with the IRI of the document it was fetched from.
///
/// The graph is always the document IRI. It is never user data, which is what
/// allows matching to be restricted to facts asserted by a given document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Quad {
    /// Subject of the statement
    pub subject: Term,
    /// Predicate of the statement
    pub predicate: Iri,
    /// Object of the statement
    pub object: Term,
    /// Document that asserted the statement
    pub graph: Iri,
}

impl Display for Quad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} <{}> {} <{}> .",
            self.subject, self.predicate, self.object, self.graph
        )
    }
}
