//! In-memory fetcher for testing
//!
//! Serves a fixed set of documents and records every request it receives so
//! tests can assert on how often and in which way a resource was accessed.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use podmail_rdf::Iri;
use tokio::sync::RwLock;
use tracing::warn;

use crate::{Fetch, FetchError, Method, Request, Response, TURTLE};

#[derive(Debug, Clone)]
enum Fixture {
    Resource {
        status: u16,
        headers: Vec<(String, String)>,
        body: String,
        patch_status: u16,
    },
    Unreachable,
}

#[derive(Debug, Default)]
struct State {
    fixtures: HashMap<String, Fixture>,
    delays: HashMap<String, Duration>,
    requests: Vec<Request>,
}

/// Fixture backed [`Fetch`] implementation.
///
/// Unknown resources answer `404`. `HEAD` answers like `GET` without a body.
/// `PATCH` answers `405` unless a status was configured with
/// [`MemoryFetcher::with_patch_status`].
///
/// The `with_*` builders configure a fetcher before it is put to work.
/// Documents of a fetcher that is already in use change through
/// [`MemoryFetcher::put_document`].
///
/// ```
/// use podmail_remote::MemoryFetcher;
///
/// # async fn example() {
/// let fetcher = MemoryFetcher::new()
///     .with_document("https://alice.example/card", "<#me> a <#Person> .")
///     .with_failure("https://alice.example/offline");
///
/// fetcher
///     .put_document("https://alice.example/card", "<#me> a <#Robot> .")
///     .await;
/// assert_eq!(fetcher.request_count("https://alice.example/card").await, 0);
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryFetcher {
    state: Arc<RwLock<State>>,
}

impl MemoryFetcher {
    /// Create an empty fetcher
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` as a Turtle document at `uri`
    pub fn with_document(self, uri: &str, body: &str) -> Self {
        self.configure(|state| state.insert_document(uri, body))
    }

    /// Serve an arbitrary response at `uri`
    pub fn with_response(
        self,
        uri: &str,
        status: u16,
        headers: Vec<(String, String)>,
        body: &str,
    ) -> Self {
        self.configure(|state| state.insert_response(uri, status, headers, body))
    }

    /// Add a response header to an already configured resource
    pub fn with_header(self, uri: &str, name: &str, value: &str) -> Self {
        self.configure(|state| {
            if let Some(Fixture::Resource { headers, .. }) = state.fixtures.get_mut(uri) {
                headers.push((name.to_string(), value.to_string()));
            }
        })
    }

    /// Set the status `PATCH` requests to an already configured resource answer with
    pub fn with_patch_status(self, uri: &str, status: u16) -> Self {
        self.configure(|state| {
            if let Some(Fixture::Resource { patch_status, .. }) = state.fixtures.get_mut(uri) {
                *patch_status = status;
            }
        })
    }

    /// Make every request to `uri` fail at the transport level
    pub fn with_failure(self, uri: &str) -> Self {
        self.configure(|state| {
            state
                .fixtures
                .insert(uri.to_string(), Fixture::Unreachable);
        })
    }

    /// Delay responses from `uri`
    pub fn with_delay(self, uri: &str, delay: Duration) -> Self {
        self.configure(|state| {
            state.delays.insert(uri.to_string(), delay);
        })
    }

    /// Replace the document served at `uri` on a fetcher that may be in use
    pub async fn put_document(&self, uri: &str, body: &str) {
        self.state.write().await.insert_document(uri, body);
    }

    /// Every request received so far, in arrival order
    pub async fn requests(&self) -> Vec<Request> {
        self.state.read().await.requests.clone()
    }

    /// Number of requests received for `uri`, regardless of method
    pub async fn request_count(&self, uri: &str) -> usize {
        self.state
            .read()
            .await
            .requests
            .iter()
            .filter(|request| request.uri.as_str() == uri)
            .count()
    }

    /// Requests received for `uri` with the given method
    pub async fn requests_for(&self, uri: &Iri, method: Method) -> Vec<Request> {
        self.state
            .read()
            .await
            .requests
            .iter()
            .filter(|request| &request.uri == uri && request.method == method)
            .cloned()
            .collect()
    }

    fn configure(self, update: impl FnOnce(&mut State)) -> Self {
        match self.state.try_write() {
            Ok(mut state) => update(&mut state),
            Err(_) => warn!("Fixture left unchanged while a request is in flight"),
        }
        self
    }
}

impl State {
    fn insert_document(&mut self, uri: &str, body: &str) {
        self.insert_response(
            uri,
            200,
            vec![("content-type".to_string(), TURTLE.to_string())],
            body,
        );
    }

    fn insert_response(
        &mut self,
        uri: &str,
        status: u16,
        headers: Vec<(String, String)>,
        body: &str,
    ) {
        self.fixtures.insert(
            uri.to_string(),
            Fixture::Resource {
                status,
                headers,
                body: body.to_string(),
                patch_status: 405,
            },
        );
    }

    fn respond(&self, request: &Request) -> Result<Response, FetchError> {
        match (self.fixtures.get(request.uri.as_str()), request.method) {
            (None, _) => Ok(Response::new(404, Vec::new(), "")),
            (Some(Fixture::Unreachable), _) => Err(FetchError::Network {
                uri: request.uri.clone(),
                reason: "connection refused".to_string(),
            }),
            (
                Some(Fixture::Resource {
                    status,
                    headers,
                    body,
                    ..
                }),
                Method::Get,
            ) => Ok(Response::new(*status, headers.clone(), body.clone())),
            (Some(Fixture::Resource {
                status, headers, ..
            }), Method::Head) => Ok(Response::new(*status, headers.clone(), "")),
            (Some(Fixture::Resource { patch_status, .. }), Method::Patch) => {
                Ok(Response::new(*patch_status, Vec::new(), ""))
            }
        }
    }
}

#[async_trait]
impl Fetch for MemoryFetcher {
    async fn fetch(&self, request: Request) -> Result<Response, FetchError> {
        let delay = {
            let mut state = self.state.write().await;
            state.requests.push(request.clone());
            state.delays.get(request.uri.as_str()).copied()
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        self.state.read().await.respond(&request)
    }
}
