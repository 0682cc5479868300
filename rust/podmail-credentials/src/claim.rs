use podmail_rdf::Iri;
use serde::{Deserialize, Serialize};

/// What a token asserts about a person
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claim {
    /// The person the email belongs to
    pub web_id: Iri,
    /// The email address
    pub email: String,
    /// Whether the person proved they control the address
    pub email_verified: bool,
}

impl Claim {
    /// A claim that `web_id` uses `email`, not verified yet
    pub fn unverified(web_id: Iri, email: impl Into<String>) -> Self {
        Self {
            web_id,
            email: email.into(),
            email_verified: false,
        }
    }

    /// A claim that `web_id` proved control of `email`
    pub fn verified(web_id: Iri, email: impl Into<String>) -> Self {
        Self {
            email_verified: true,
            ..Self::unverified(web_id, email)
        }
    }
}

/// A claim together with the metadata stamped by the issuer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grant {
    /// The asserted claim
    #[serde(flatten)]
    pub claim: Claim,
    /// Identity of the issuer
    pub iss: String,
    /// Issue time, seconds since the Unix epoch
    pub iat: u64,
    /// Expiry time, seconds since the Unix epoch
    pub exp: u64,
}

impl Grant {
    /// Returns true if the grant is expired at `now`
    pub fn is_expired_at(&self, now: u64) -> bool {
        now >= self.exp
    }
}
