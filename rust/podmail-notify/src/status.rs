use indexmap::IndexSet;
use podmail_credentials::TokenCodec;
use podmail_rdf::Iri;
use podmail_remote::Fetch;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Mailer, NotifyError, Service};

/// Whether a person can receive notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailStatus {
    /// True if at least one verified address was found
    pub email_verified: bool,
}

/// Email addresses of `web_id` proven by `tokens`.
///
/// A token counts if it verifies, is marked verified and was issued for
/// `web_id` itself. Anything else is skipped: a token copied from another
/// person's pod proves nothing about this one.
pub fn verified_emails(codec: &TokenCodec, web_id: &Iri, tokens: &[String]) -> Vec<String> {
    let mut emails = IndexSet::new();

    for token in tokens {
        match codec.verify(token) {
            Ok(grant) if grant.claim.email_verified && &grant.claim.web_id == web_id => {
                emails.insert(grant.claim.email);
            }
            Ok(_) => debug!("Skipping token of another person or unverified address"),
            Err(error) => debug!("Skipping token: {error}"),
        }
    }

    emails.into_iter().collect()
}

impl<F, M> Service<F, M>
where
    F: Fetch,
    M: Mailer,
{
    /// Verified email addresses of `web_id`
    pub async fn verified_emails(&self, web_id: &Iri) -> Result<Vec<String>, NotifyError> {
        let tokens = self.discovery.find_verification_tokens(web_id).await?;
        Ok(verified_emails(&self.verified_codec, web_id, &tokens))
    }

    /// Whether `web_id` has a verified email address
    pub async fn status(&self, web_id: &Iri) -> Result<EmailStatus, NotifyError> {
        let emails = self.verified_emails(web_id).await?;
        Ok(EmailStatus {
            email_verified: !emails.is_empty(),
        })
    }
}
