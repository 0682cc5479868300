use podmail_access::authorize;
use podmail_credentials::TokenCodec;
use podmail_query::Resolver;
use podmail_rdf::Iri;
use podmail_remote::{Fetch, HttpFetcher};
use tracing::debug;

use crate::{Config, Discovery, Mailer, NotifyError};

/// The notification service
pub struct Service<F, M> {
    pub(crate) config: Config,
    pub(crate) discovery: Discovery<F>,
    pub(crate) link_codec: TokenCodec,
    pub(crate) verified_codec: TokenCodec,
    pub(crate) mailer: M,
}

impl<M> Service<HttpFetcher, M>
where
    M: Mailer,
{
    /// Create a service reading pods over HTTP as the configured identity,
    /// signing with the key at [`Config::jwt_key`]
    pub fn from_config(config: Config, mailer: M) -> Result<Self, NotifyError> {
        let codec = config.load_codec()?;
        let fetcher = HttpFetcher::new(config.fetcher_config())?;
        Ok(Self::new(config, fetcher, codec, mailer))
    }
}

impl<F, M> Service<F, M>
where
    F: Fetch,
    M: Mailer,
{
    /// Create a service reading pods through `fetcher`.
    ///
    /// `codec` provides the signing key and issuer; the token lifetimes are
    /// taken from `config`.
    pub fn new(config: Config, fetcher: F, codec: TokenCodec, mailer: M) -> Self {
        let resolver = Resolver::new(fetcher).with_config(config.resolver_config());
        let discovery = Discovery::new(
            resolver,
            &config.email_discovery_type,
            config.verification_token_predicate.clone(),
        );

        Self {
            link_codec: codec.clone().with_ttl(config.email_verification_ttl),
            verified_codec: codec.with_ttl(config.verified_token_ttl),
            config,
            discovery,
            mailer,
        }
    }

    /// The active configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Pod search used by the service
    pub fn discovery(&self) -> &Discovery<F> {
        &self.discovery
    }

    /// The mailer messages are sent through
    pub fn mailer(&self) -> &M {
        &self.mailer
    }

    pub(crate) fn fetcher(&self) -> &F {
        self.discovery.resolver().fetcher()
    }

    /// Admits `person` if they belong to one of the allowed groups, or if no
    /// groups are configured
    pub async fn authorize(&self, person: &Iri) -> Result<(), NotifyError> {
        authorize(self.fetcher(), person, &self.config.allowed_groups).await?;
        debug!(person = %person, "Authorized");
        Ok(())
    }
}
