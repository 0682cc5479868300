use std::time::{Duration, SystemTime, UNIX_EPOCH};

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use p256::ecdsa::{Signature, SigningKey, VerifyingKey};
use p256::pkcs8::DecodePrivateKey;
use serde::{Deserialize, Serialize};
use signature::{Signer, Verifier};
use tracing::debug;

use crate::{Claim, Grant, TokenError};

/// Signing algorithm, as written in the token header
pub const ALGORITHM: &str = "ES256";

/// Default lifetime of an issued token (one hour)
pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);

#[derive(Serialize, Deserialize)]
struct Header {
    alg: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    typ: Option<String>,
}

/// Issues and verifies tokens with a P-256 key.
///
/// ```
/// use podmail_credentials::{Claim, TokenCodec};
/// use podmail_rdf::Iri;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let key = p256::ecdsa::SigningKey::from_slice(&[7u8; 32])?;
/// let codec = TokenCodec::new(key, "https://bot.example/profile/card#me");
///
/// let claim = Claim::unverified(Iri::new("https://alice.example/card#me")?, "alice@example.com");
/// let token = codec.issue(&claim)?;
/// assert_eq!(codec.verify(&token)?.claim, claim);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct TokenCodec {
    key: SigningKey,
    issuer: String,
    ttl: Duration,
}

impl TokenCodec {
    /// Create a codec signing as `issuer`, with the default lifetime
    pub fn new(key: SigningKey, issuer: impl Into<String>) -> Self {
        Self {
            key,
            issuer: issuer.into(),
            ttl: DEFAULT_TTL,
        }
    }

    /// Load the signing key from a PEM document, PKCS#8 (`PRIVATE KEY`) or
    /// SEC1 (`EC PRIVATE KEY`)
    pub fn from_pem(pem: &str, issuer: impl Into<String>) -> Result<Self, TokenError> {
        let key = match SigningKey::from_pkcs8_pem(pem) {
            Ok(key) => key,
            Err(pkcs8) => p256::SecretKey::from_sec1_pem(pem)
                .map(SigningKey::from)
                .map_err(|sec1| {
                    TokenError::Key(format!("not a PKCS#8 ({pkcs8}) or SEC1 ({sec1}) P-256 key"))
                })?,
        };
        Ok(Self::new(key, issuer))
    }

    /// Set the lifetime of issued tokens
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Lifetime of issued tokens
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Identity stamped into issued tokens
    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Public half of the signing key
    pub fn verifying_key(&self) -> VerifyingKey {
        self.key.verifying_key().clone()
    }

    /// Sign `claim`, valid from now for the configured lifetime
    pub fn issue(&self, claim: &Claim) -> Result<String, TokenError> {
        self.issue_at(claim, now())
    }

    /// Sign `claim` as if issued at `now` (seconds since the Unix epoch)
    pub fn issue_at(&self, claim: &Claim, now: u64) -> Result<String, TokenError> {
        let grant = Grant {
            claim: claim.clone(),
            iss: self.issuer.clone(),
            iat: now,
            exp: now.saturating_add(self.ttl.as_secs()),
        };
        let header = Header {
            alg: ALGORITHM.to_string(),
            typ: Some("JWT".to_string()),
        };

        let header = encode_json(&header)?;
        let payload = encode_json(&grant)?;
        let signing_input = format!("{header}.{payload}");
        let signature: Signature = self.key.sign(signing_input.as_bytes());

        Ok(format!(
            "{signing_input}.{}",
            URL_SAFE_NO_PAD.encode(signature.to_bytes())
        ))
    }

    /// Verify `token` against the current time
    pub fn verify(&self, token: &str) -> Result<Grant, TokenError> {
        self.verify_at(token, now())
    }

    /// Verify `token` as if the current time were `now`.
    ///
    /// The signature is checked before the expiry, so only authentic tokens
    /// are ever reported as [`TokenError::Expired`].
    pub fn verify_at(&self, token: &str, now: u64) -> Result<Grant, TokenError> {
        let mut parts = token.split('.');
        let (Some(header_b64), Some(payload_b64), Some(signature_b64), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(TokenError::Invalid(
                "expected three dot separated parts".to_string(),
            ));
        };

        let header: Header = decode_json(header_b64, "header")?;
        if header.alg != ALGORITHM {
            return Err(TokenError::Invalid(format!(
                "unsupported algorithm {:?}",
                header.alg
            )));
        }

        let signature_bytes = URL_SAFE_NO_PAD
            .decode(signature_b64)
            .map_err(|error| TokenError::Invalid(format!("signature: {error}")))?;
        let signature = Signature::from_slice(&signature_bytes)
            .map_err(|error| TokenError::Invalid(format!("signature: {error}")))?;

        let signing_input = format!("{header_b64}.{payload_b64}");
        self.key
            .verifying_key()
            .verify(signing_input.as_bytes(), &signature)
            .map_err(|_| TokenError::Invalid("signature does not verify".to_string()))?;

        let grant: Grant = decode_json(payload_b64, "payload")?;
        if grant.is_expired_at(now) {
            debug!(exp = grant.exp, now, "Rejecting expired token");
            return Err(TokenError::Expired);
        }

        Ok(grant)
    }
}

fn now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or_default()
}

fn encode_json<T: Serialize>(value: &T) -> Result<String, TokenError> {
    let json = serde_json::to_vec(value)
        .map_err(|error| TokenError::Invalid(format!("serialization: {error}")))?;
    Ok(URL_SAFE_NO_PAD.encode(json))
}

fn decode_json<T: for<'de> Deserialize<'de>>(part: &str, name: &str) -> Result<T, TokenError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(part)
        .map_err(|error| TokenError::Invalid(format!("{name}: {error}")))?;
    serde_json::from_slice(&bytes).map_err(|error| TokenError::Invalid(format!("{name}: {error}")))
}
