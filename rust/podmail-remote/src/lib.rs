//! Retrieval of remote linked data documents
//!
//! The [`Fetch`] trait is the single I/O boundary of podmail. Everything that
//! needs to look at a pod goes through it: crawling documents during query
//! resolution, probing resources for their access capabilities and writing
//! verification tokens back.

mod error;
pub use error::*;

mod request;
pub use request::*;

mod document;
pub use document::*;

pub mod http;
pub use http::{AuthMethod, FetcherConfig, HttpFetcher};

#[cfg(any(test, feature = "helpers"))]
pub mod memory;
#[cfg(any(test, feature = "helpers"))]
pub use memory::MemoryFetcher;

use std::sync::Arc;

use async_trait::async_trait;

/// Performs a single HTTP exchange on behalf of the configured identity.
///
/// Implementations must be safe to call concurrently; the resolution engine
/// issues several requests at once.
#[async_trait]
pub trait Fetch: Send + Sync {
    /// Send the request and return the response, whatever its status.
    ///
    /// Only transport level problems (connection refused, timeouts) are
    /// reported as errors. A `404` is a successful exchange.
    async fn fetch(&self, request: Request) -> Result<Response, FetchError>;
}

#[async_trait]
impl<'a, F> Fetch for &'a F
where
    F: Fetch + ?Sized,
{
    async fn fetch(&self, request: Request) -> Result<Response, FetchError> {
        (**self).fetch(request).await
    }
}

#[async_trait]
impl<F> Fetch for Arc<F>
where
    F: Fetch + ?Sized,
{
    async fn fetch(&self, request: Request) -> Result<Response, FetchError> {
        (**self).fetch(request).await
    }
}
