use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use podmail_credentials::TokenCodec;
use podmail_query::ResolverConfig;
use podmail_rdf::Iri;
use podmail_remote::{AuthMethod, FetcherConfig};
use thiserror::Error;

/// Invalid or unusable configuration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// An environment variable holds a value of the wrong shape
    #[error("Invalid value {value:?} for {variable}: {reason}")]
    Invalid {
        variable: &'static str,
        value: String,
        reason: String,
    },

    /// The signing key could not be read
    #[error("Could not read signing key {path:?}: {reason}")]
    Key { path: PathBuf, reason: String },
}

/// Configuration of the notification service
#[derive(Clone, Debug)]
pub struct Config {
    /// Public URL of the service, used to build verification links
    pub base_url: String,

    /// Name of the application notifications are sent for
    pub app_name: String,

    /// Optional URL of the application, linked after a successful verification
    pub app_url: Option<String>,

    /// Address emails are sent from
    pub email_sender: String,

    /// WebID of the identity the service reads and writes pods as
    pub mailer_web_id: Iri,

    /// Access token of that identity, if any
    pub mailer_token: Option<String>,

    /// Path of the PEM encoded P-256 signing key
    pub jwt_key: PathBuf,

    /// Class of the documents that link a person's settings
    pub email_discovery_type: Iri,

    /// Predicate verified tokens are stored under
    pub verification_token_predicate: Iri,

    /// Groups whose members may use the service. Empty admits everybody.
    pub allowed_groups: Vec<Iri>,

    /// Lifetime of verification links
    pub email_verification_ttl: Duration,

    /// Lifetime of verified tokens stored in pods
    pub verified_token_ttl: Duration,

    /// Timeout of a single request to a pod
    pub fetch_timeout: Duration,

    /// Maximum number of documents fetched per resolution
    pub resolve_max_fetches: usize,

    /// Wall-clock budget of a resolution
    pub resolve_deadline: Duration,

    /// Number of documents fetched concurrently
    pub resolve_concurrency: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3005".to_string(),
            app_name: "Sleepy.Bike".to_string(),
            app_url: None,
            email_sender: "noreply@example".to_string(),
            mailer_web_id: Iri::new_unchecked("http://localhost:3456/bot/profile/card#me"),
            mailer_token: None,
            jwt_key: PathBuf::from("./ecdsa-p256-private.pem"),
            email_discovery_type: Iri::new_unchecked(
                "http://w3id.org/hospex/ns#PersonalHospexDocument",
            ),
            verification_token_predicate: Iri::new_unchecked(
                "https://example.com/emailVerificationToken",
            ),
            allowed_groups: Vec::new(),
            email_verification_ttl: Duration::from_secs(3600),
            verified_token_ttl: Duration::from_secs(315_360_000),
            fetch_timeout: Duration::from_secs(30),
            resolve_max_fetches: 256,
            resolve_deadline: Duration::from_secs(60),
            resolve_concurrency: 8,
        }
    }
}

impl Config {
    /// Create a configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the configuration from the process environment. Unset variables
    /// keep their defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read the configuration through `lookup`, which returns the value of a
    /// variable if it is set
    pub fn from_lookup<L>(lookup: L) -> Result<Self, ConfigError>
    where
        L: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        if let Some(value) = var("BASE_URL") {
            config.base_url = value.trim_end_matches('/').to_string();
        }
        if let Some(value) = var("APP_NAME") {
            config.app_name = value;
        }
        config.app_url = var("APP_URL").or(config.app_url);
        if let Some(value) = var("EMAIL_SENDER") {
            config.email_sender = value;
        }
        if let Some(value) = var("MAILER_IDENTITY_WEBID") {
            config.mailer_web_id = parse_iri("MAILER_IDENTITY_WEBID", &value)?;
        }
        config.mailer_token = var("MAILER_IDENTITY_TOKEN").or(config.mailer_token);
        if let Some(value) = var("JWT_KEY") {
            config.jwt_key = PathBuf::from(value);
        }
        if let Some(value) = var("EMAIL_DISCOVERY_TYPE") {
            config.email_discovery_type = parse_iri("EMAIL_DISCOVERY_TYPE", &value)?;
        }
        if let Some(value) = var("VERIFICATION_TOKEN_PREDICATE") {
            config.verification_token_predicate =
                parse_iri("VERIFICATION_TOKEN_PREDICATE", &value)?;
        }
        if let Some(value) = var("ALLOWED_GROUPS") {
            config.allowed_groups = value
                .split(',')
                .map(str::trim)
                .filter(|group| !group.is_empty())
                .map(|group| parse_iri("ALLOWED_GROUPS", group))
                .collect::<Result<_, _>>()?;
        }
        if let Some(value) = var("EMAIL_VERIFICATION_TTL") {
            config.email_verification_ttl = parse_seconds("EMAIL_VERIFICATION_TTL", &value)?;
        }
        if let Some(value) = var("VERIFIED_TOKEN_TTL") {
            config.verified_token_ttl = parse_seconds("VERIFIED_TOKEN_TTL", &value)?;
        }
        if let Some(value) = var("FETCH_TIMEOUT") {
            config.fetch_timeout = parse_seconds("FETCH_TIMEOUT", &value)?;
        }
        if let Some(value) = var("RESOLVE_MAX_FETCHES") {
            config.resolve_max_fetches = parse_number("RESOLVE_MAX_FETCHES", &value)?;
        }
        if let Some(value) = var("RESOLVE_DEADLINE") {
            config.resolve_deadline = parse_seconds("RESOLVE_DEADLINE", &value)?;
        }
        if let Some(value) = var("RESOLVE_CONCURRENCY") {
            config.resolve_concurrency = parse_number("RESOLVE_CONCURRENCY", &value)?;
        }

        Ok(config)
    }

    /// Set the public URL of the service
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the application name
    pub fn with_app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = app_name.into();
        self
    }

    /// Set the class of the documents linking a person's settings
    pub fn with_email_discovery_type(mut self, discovery_type: Iri) -> Self {
        self.email_discovery_type = discovery_type;
        self
    }

    /// Set the predicate verified tokens are stored under
    pub fn with_verification_token_predicate(mut self, predicate: Iri) -> Self {
        self.verification_token_predicate = predicate;
        self
    }

    /// Restrict the service to members of `groups`
    pub fn with_allowed_groups(mut self, groups: Vec<Iri>) -> Self {
        self.allowed_groups = groups;
        self
    }

    /// Configuration of the pod fetcher
    pub fn fetcher_config(&self) -> FetcherConfig {
        let auth = match &self.mailer_token {
            Some(token) => AuthMethod::Bearer(token.clone()),
            None => AuthMethod::None,
        };
        FetcherConfig::new()
            .with_auth(auth)
            .with_timeout(self.fetch_timeout)
    }

    /// Configuration of the resolver
    pub fn resolver_config(&self) -> ResolverConfig {
        ResolverConfig::new()
            .with_max_fetches(self.resolve_max_fetches)
            .with_deadline(self.resolve_deadline)
            .with_fetch_timeout(self.fetch_timeout)
            .with_concurrency(self.resolve_concurrency)
    }

    /// Read the signing key from [`Config::jwt_key`]
    pub fn load_codec(&self) -> Result<TokenCodec, ConfigError> {
        let key_error = |reason: String| ConfigError::Key {
            path: self.jwt_key.clone(),
            reason,
        };
        let pem = std::fs::read_to_string(&self.jwt_key).map_err(|error| key_error(error.to_string()))?;
        TokenCodec::from_pem(&pem, self.mailer_web_id.as_str()).map_err(|error| key_error(error.to_string()))
    }
}

fn parse_iri(variable: &'static str, value: &str) -> Result<Iri, ConfigError> {
    Iri::new(value).map_err(|error| ConfigError::Invalid {
        variable,
        value: value.to_string(),
        reason: error.to_string(),
    })
}

fn parse_number<T>(variable: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|error: T::Err| ConfigError::Invalid {
        variable,
        value: value.to_string(),
        reason: error.to_string(),
    })
}

fn parse_seconds(variable: &'static str, value: &str) -> Result<Duration, ConfigError> {
    parse_number::<u64>(variable, value).map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use testresult::TestResult;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn it_defaults_everything() -> TestResult {
        let config = Config::from_lookup(lookup(&[]))?;

        assert_eq!(config.app_name, "Sleepy.Bike");
        assert_eq!(config.email_verification_ttl, Duration::from_secs(3600));
        assert!(config.allowed_groups.is_empty());
        assert!(matches!(config.fetcher_config().auth_method, AuthMethod::None));
        Ok(())
    }

    #[test]
    fn it_reads_variables() -> TestResult {
        let config = Config::from_lookup(lookup(&[
            ("BASE_URL", "https://notifications.example/"),
            ("ALLOWED_GROUPS", "https://a.example/g#us, https://b.example/g#us"),
            ("RESOLVE_CONCURRENCY", "4"),
            ("MAILER_IDENTITY_TOKEN", "secret"),
            ("APP_URL", ""),
        ]))?;

        assert_eq!(config.base_url, "https://notifications.example");
        assert_eq!(config.allowed_groups.len(), 2);
        assert_eq!(config.resolver_config().concurrency, 4);
        assert!(config.app_url.is_none());
        assert!(matches!(
            config.fetcher_config().auth_method,
            AuthMethod::Bearer(token) if token == "secret"
        ));
        Ok(())
    }

    #[test]
    fn it_rejects_malformed_values() {
        let ttl = Config::from_lookup(lookup(&[("VERIFIED_TOKEN_TTL", "ten years")]));
        let group = Config::from_lookup(lookup(&[("ALLOWED_GROUPS", "not an iri")]));

        assert!(matches!(
            ttl,
            Err(ConfigError::Invalid {
                variable: "VERIFIED_TOKEN_TTL",
                ..
            })
        ));
        assert!(matches!(group, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn it_reports_missing_keys() {
        let config = Config::new();
        let config = Config {
            jwt_key: PathBuf::from("/nonexistent/key.pem"),
            ..config
        };
        assert!(matches!(config.load_codec(), Err(ConfigError::Key { .. })));
    }
}
