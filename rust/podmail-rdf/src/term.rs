use std::fmt::{self, Display};
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::RdfError;

/// An absolute IRI, i.e. the value of an RDF named node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Iri(String);

impl Iri {
    /// Parses and validates an absolute IRI per RFC 3987. Characters that
    /// cannot appear inside `<...>` in Turtle or N3, such as spaces, `"` and
    /// `>`, are rejected.
    pub fn new(iri: impl Into<String>) -> Result<Self, RdfError> {
        let iri = iri.into();
        match oxrdf::NamedNode::new(iri.as_str()) {
            Ok(_) => Ok(Self(iri)),
            Err(error) => Err(RdfError::InvalidIri {
                iri,
                reason: error.to_string(),
            }),
        }
    }

    /// Wraps a string that is already known to be a valid IRI, such as a
    /// vocabulary constant or a value produced by an RDF parser.
    pub fn new_unchecked(iri: impl Into<String>) -> Self {
        Self(iri.into())
    }

    /// The IRI as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The IRI of the document this IRI is dereferenced through, which is the
    /// IRI with its fragment removed (`https://a.example/card#me` resolves to
    /// `https://a.example/card`).
    pub fn document(&self) -> Iri {
        match self.0.split_once('#') {
            Some((document, _)) => Self(document.to_string()),
            None => self.clone(),
        }
    }

    /// Returns true if this IRI carries a fragment
    pub fn has_fragment(&self) -> bool {
        self.0.contains('#')
    }
}

impl Display for Iri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Iri {
    type Err = RdfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Iri {
    type Error = RdfError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Iri> for String {
    fn from(value: Iri) -> Self {
        value.0
    }
}

impl AsRef<str> for Iri {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<oxrdf::NamedNode> for Iri {
    fn from(node: oxrdf::NamedNode) -> Self {
        Self(node.into_string())
    }
}

/// An RDF literal.
///
/// Literals compare and hash by their lexical value alone. Datatype and
/// language tag are kept for display and inspection but two literals with
/// the same value are the same term.
#[derive(Debug, Clone)]
pub struct Literal {
    value: String,
    datatype: Option<Iri>,
    language: Option<String>,
}

impl Literal {
    /// A plain string literal
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            datatype: None,
            language: None,
        }
    }

    /// A literal with an explicit datatype
    pub fn typed(value: impl Into<String>, datatype: Iri) -> Self {
        Self {
            value: value.into(),
            datatype: Some(datatype),
            language: None,
        }
    }

    /// A language tagged string
    pub fn tagged(value: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            datatype: None,
            language: Some(language.into()),
        }
    }

    /// Lexical value of the literal
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Datatype IRI, if one was given
    pub fn datatype(&self) -> Option<&Iri> {
        self.datatype.as_ref()
    }

    /// Language tag, if any
    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }
}

impl PartialEq for Literal {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl Eq for Literal {}

impl Hash for Literal {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl From<oxrdf::Literal> for Literal {
    fn from(literal: oxrdf::Literal) -> Self {
        Self {
            value: literal.value().to_owned(),
            datatype: Some(Iri::new_unchecked(literal.datatype().as_str())),
            language: literal.language().map(str::to_owned),
        }
    }
}

/// The kind of an RDF [`Term`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TermKind {
    /// A named node
    Iri,
    /// A literal value
    Literal,
    /// A blank node
    Blank,
}

/// An RDF value. Equality is equality of kind and value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Term {
    /// A named node
    Iri(Iri),
    /// A literal
    Literal(Literal),
    /// A blank node with its document-local label
    Blank(String),
}

impl Term {
    /// Shorthand for a named node term from an already valid IRI string
    pub fn iri(iri: impl Into<String>) -> Self {
        Self::Iri(Iri::new_unchecked(iri))
    }

    /// Shorthand for a plain string literal term
    pub fn literal(value: impl Into<String>) -> Self {
        Self::Literal(Literal::new(value))
    }

    /// Kind of this term
    pub fn kind(&self) -> TermKind {
        match self {
            Term::Iri(_) => TermKind::Iri,
            Term::Literal(_) => TermKind::Literal,
            Term::Blank(_) => TermKind::Blank,
        }
    }

    /// The string value of the term, regardless of kind
    pub fn value(&self) -> &str {
        match self {
            Term::Iri(iri) => iri.as_str(),
            Term::Literal(literal) => literal.value(),
            Term::Blank(label) => label,
        }
    }

    /// Returns the IRI if this term is a named node
    pub fn as_iri(&self) -> Option<&Iri> {
        match self {
            Term::Iri(iri) => Some(iri),
            _ => None,
        }
    }
}

impl From<Iri> for Term {
    fn from(iri: Iri) -> Self {
        Term::Iri(iri)
    }
}

impl From<Literal> for Term {
    fn from(literal: Literal) -> Self {
        Term::Literal(literal)
    }
}

impl Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Iri(iri) => write!(f, "<{iri}>"),
            Term::Literal(literal) => match (literal.language(), literal.datatype()) {
                (Some(language), _) => write!(f, "{:?}@{language}", literal.value()),
                _ => write!(f, "{:?}", literal.value()),
            },
            Term::Blank(label) => write!(f, "_:{label}"),
        }
    }
}
