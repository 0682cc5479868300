use std::fmt::{self, Display};

use podmail_rdf::Iri;

/// Media type podmail reads documents as
pub const TURTLE: &str = "text/turtle";

/// Media type of Solid N3 patches
pub const N3: &str = "text/n3";

/// HTTP methods podmail issues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// Read a document
    Get,
    /// Read only the headers of a document
    Head,
    /// Modify a document in place
    Patch,
}

impl Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Patch => "PATCH",
        };
        write!(f, "{name}")
    }
}

/// An outgoing request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// Target resource
    pub uri: Iri,
    /// HTTP method
    pub method: Method,
    /// Additional request headers
    pub headers: Vec<(String, String)>,
    /// Request body, if any
    pub body: Option<String>,
}

impl Request {
    fn new(method: Method, uri: Iri) -> Self {
        Self {
            uri,
            method,
            headers: Vec::new(),
            body: None,
        }
    }

    /// A `GET` request for the given resource
    pub fn get(uri: Iri) -> Self {
        Self::new(Method::Get, uri)
    }

    /// A `HEAD` request for the given resource
    pub fn head(uri: Iri) -> Self {
        Self::new(Method::Head, uri)
    }

    /// A `PATCH` request with a body of the given media type
    pub fn patch(uri: Iri, content_type: &str, body: impl Into<String>) -> Self {
        Self::new(Method::Patch, uri)
            .with_header("content-type", content_type)
            .with_body(body)
    }

    /// Adds a header
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Sets the body
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }
}

/// A received response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// HTTP status code
    pub status: u16,
    /// Response headers, names lower-cased
    pub headers: Vec<(String, String)>,
    /// Response body, empty for `HEAD`
    pub body: String,
}

impl Response {
    /// Creates a response. Header names are normalised to lower case.
    pub fn new(status: u16, headers: Vec<(String, String)>, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: headers
                .into_iter()
                .map(|(name, value)| (name.to_ascii_lowercase(), value))
                .collect(),
            body: body.into(),
        }
    }

    /// Returns true for `2xx` statuses
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// First value of the named header, matched case-insensitively
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}
