//! HTTP implementation of [`Fetch`]

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use tracing::{debug, instrument};

use crate::{Fetch, FetchError, Method, Request, Response};

/// Authentication methods for the HTTP fetcher
#[derive(Clone, Debug)]
pub enum AuthMethod {
    /// No authentication, resources are read as the public
    None,

    /// Bearer token authentication
    ///
    /// Includes `Authorization: Bearer {token}` in every request, identifying
    /// the notification bot to the pod servers.
    Bearer(String),
}

/// Configuration for [`HttpFetcher`]
#[derive(Clone, Debug)]
pub struct FetcherConfig {
    /// Authentication method
    pub auth_method: AuthMethod,

    /// Optional timeout for a whole request (default: 30 seconds)
    pub timeout: Option<Duration>,

    /// Optional custom headers to send with each request
    pub headers: Vec<(String, String)>,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            auth_method: AuthMethod::None,
            timeout: Some(Duration::from_secs(30)),
            headers: Vec::new(),
        }
    }
}

impl FetcherConfig {
    /// Create a new fetcher configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the authentication method
    pub fn with_auth(mut self, auth_method: AuthMethod) -> Self {
        self.auth_method = auth_method;
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Add a custom header
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }
}

/// Fetches resources over HTTP(S) as the configured identity.
///
/// # Examples
///
/// ```no_run
/// use std::time::Duration;
///
/// use podmail_rdf::Iri;
/// use podmail_remote::{AuthMethod, FetcherConfig, HttpFetcher, fetch_document};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = FetcherConfig::new()
///     .with_auth(AuthMethod::Bearer("bot-access-token".to_string()))
///     .with_timeout(Duration::from_secs(10));
/// let fetcher = HttpFetcher::new(config)?;
///
/// let profile = Iri::new("https://alice.example/profile/card#me")?;
/// let triples = fetch_document(&fetcher, &profile).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Create a new HTTP fetcher with the given configuration.
    ///
    /// Credentials and custom headers are attached to every request. Fails
    /// if a header is not valid HTTP or the client cannot be built.
    pub fn new(config: FetcherConfig) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();

        match &config.auth_method {
            AuthMethod::None => {}
            AuthMethod::Bearer(token) => {
                let mut value =
                    HeaderValue::from_str(&format!("Bearer {token}")).map_err(client_error)?;
                value.set_sensitive(true);
                headers.insert(AUTHORIZATION, value);
            }
        }

        for (key, value) in &config.headers {
            headers.append(
                HeaderName::from_bytes(key.as_bytes()).map_err(client_error)?,
                HeaderValue::from_str(value).map_err(client_error)?,
            );
        }

        let mut client_builder = Client::builder().default_headers(headers);
        if let Some(timeout) = config.timeout {
            client_builder = client_builder.timeout(timeout);
        }

        let client = client_builder.build().map_err(client_error)?;

        Ok(Self { client })
    }
}

fn client_error(error: impl std::fmt::Display) -> FetchError {
    FetchError::Client {
        reason: error.to_string(),
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    #[instrument(level = "debug", skip_all, fields(method = %request.method, uri = %request.uri))]
    async fn fetch(&self, request: Request) -> Result<Response, FetchError> {
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Head => reqwest::Method::HEAD,
            Method::Patch => reqwest::Method::PATCH,
        };

        let mut builder = self.client.request(method, request.uri.as_str());
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let uri = request.uri;
        let transport = |error: reqwest::Error| {
            if error.is_timeout() {
                FetchError::Timeout { uri: uri.clone() }
            } else {
                FetchError::Network {
                    uri: uri.clone(),
                    reason: format!("HTTP request failed: {error}"),
                }
            }
        };

        let response = builder.send().await.map_err(transport)?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let body = response.text().await.map_err(transport)?;

        debug!(status, "Received response");
        Ok(Response::new(status, headers, body))
    }
}
