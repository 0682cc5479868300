//! Email verification flow
//!
//! 1. [`Service::initialize`] mails a signed, short lived link to the address
//!    a person claims.
//! 2. Following the link hands the token to [`Service::check_link`].
//! 3. [`Service::finish`] issues a long lived verified token and writes it
//!    into every settings document of the person the service may write to.

use futures_util::future::join_all;
use podmail_credentials::Claim;
use podmail_rdf::{Iri, vocab};
use podmail_remote::{Fetch, N3, Request};
use tracing::{info, instrument, warn};

use crate::{Mailbox, Mailer, Message, NotifyError, Service, Template};

/// Path of the verification endpoint, relative to the service's base URL
pub const VERIFY_EMAIL_PATH: &str = "/verify-email";

/// Result of a completed verification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verified {
    /// The verified token
    pub token: String,
    /// Number of documents the token was written to
    pub saved: usize,
    /// Confirmation to show the person
    pub message: String,
}

/// N3 patch inserting `<web_id> <predicate> "token"` into a document
pub fn token_patch(web_id: &Iri, predicate: &Iri, token: &str) -> String {
    let escaped = token.replace('\\', "\\\\").replace('"', "\\\"");
    format!(
        "_:patch a <{patch}>;\n  <{inserts}> {{\n    <{web_id}> <{predicate}> \"{escaped}\" .\n  }} .\n",
        patch = vocab::solid::INSERT_DELETE_PATCH,
        inserts = vocab::solid::INSERTS,
    )
}

impl<F, M> Service<F, M>
where
    F: Fetch,
    M: Mailer,
{
    /// Mail a verification link for `email` to the person `actor`.
    /// Returns the link.
    #[instrument(level = "debug", skip_all, fields(actor = %actor))]
    pub async fn initialize(&self, actor: &Iri, email: &str) -> Result<String, NotifyError> {
        let token = self
            .link_codec
            .issue(&Claim::unverified(actor.clone(), email))?;
        let link = format!(
            "{}{VERIFY_EMAIL_PATH}?token={token}",
            self.config.base_url.trim_end_matches('/')
        );
        let subject = format!("Verify your email for {} notifications", self.config.app_name);

        self.mailer
            .send(Message {
                from: Mailbox::new(
                    format!("{} notifications", self.config.app_name),
                    self.config.email_sender.clone(),
                ),
                to: Mailbox::new("", email),
                subject,
                text: format!("Please verify your email {link}"),
                template: Template::Verification,
            })
            .await?;

        info!("Sent verification link");
        Ok(link)
    }

    /// Validate the token of a verification link
    pub fn check_link(&self, token: Option<&str>) -> Result<Claim, NotifyError> {
        let token = token
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or(NotifyError::MissingLink)?;

        let grant = self
            .link_codec
            .verify(token)
            .map_err(NotifyError::from_link)?;
        Ok(grant.claim)
    }

    /// Store a verified token for the person and address in `claim`
    #[instrument(level = "debug", skip_all, fields(web_id = %claim.web_id))]
    pub async fn finish(&self, claim: &Claim) -> Result<Verified, NotifyError> {
        let web_id = &claim.web_id;
        let token = self
            .verified_codec
            .issue(&Claim::verified(web_id.clone(), claim.email.clone()))?;

        let writable = self.discovery.find_writable_settings(web_id).await;
        let body = token_patch(web_id, &self.config.verification_token_predicate, &token);
        let patches = writable.iter().map(|document| {
            self.fetcher()
                .fetch(Request::patch(document.clone(), N3, body.clone()))
        });

        let mut saved = 0;
        for (document, result) in writable.iter().zip(join_all(patches).await) {
            match result {
                Ok(response) if response.is_success() => saved += 1,
                Ok(response) => {
                    warn!(document = %document, status = response.status, "Token was not saved")
                }
                Err(error) => warn!(document = %document, "Token was not saved: {error}"),
            }
        }

        if saved == 0 {
            return Err(NotifyError::NoWritableLocation { token });
        }

        let mut message = "Your email was successfully verified.".to_string();
        if let Some(app_url) = &self.config.app_url {
            message.push_str(&format!(
                " You can go back to {} at {app_url} now.",
                self.config.app_name
            ));
        }
        info!(saved, "Stored verified token");

        Ok(Verified {
            token,
            saved,
            message,
        })
    }

    /// Handle a followed verification link: [`Service::check_link`] followed
    /// by [`Service::finish`]
    pub async fn verify_email(&self, token: Option<&str>) -> Result<Verified, NotifyError> {
        let claim = self.check_link(token)?;
        self.finish(&claim).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use podmail_rdf::parse_turtle;
    use testresult::TestResult;

    #[test]
    fn it_writes_parsable_patches() -> TestResult {
        let web_id = Iri::new("https://alice.example/card#me")?;
        let predicate = Iri::new("https://example.com/emailVerificationToken")?;

        let patch = token_patch(&web_id, &predicate, "aaa.bbb.ccc");

        assert!(patch.contains(
            "<https://alice.example/card#me> <https://example.com/emailVerificationToken> \"aaa.bbb.ccc\" ."
        ));
        assert!(patch.contains(vocab::solid::INSERT_DELETE_PATCH));
        // The inserted statement on its own is valid Turtle
        let inserted = patch
            .lines()
            .find(|line| line.contains("aaa.bbb.ccc"))
            .unwrap_or_default();
        assert_eq!(parse_turtle(&web_id, inserted)?.len(), 1);
        Ok(())
    }

    #[test]
    fn it_keeps_patches_to_a_single_statement() -> TestResult {
        let predicate = Iri::new("https://example.com/emailVerificationToken")?;
        let injected = "\"https://evil.example/x> <https://example.com/emailVerificationToken> \\\"forged\\\" . <https://evil.example/y\"";

        // Web IDs arrive through deserialized claims and never reach a patch
        // when they could escape their angle brackets
        assert!(serde_json::from_str::<Iri>(injected).is_err());

        let web_id = Iri::new("https://alice.example/card#me")?;
        let patch = token_patch(&web_id, &predicate, "a\" . <https://evil.example/y> <z> \"b");
        let inserted = patch
            .lines()
            .find(|line| line.contains(predicate.as_str()))
            .unwrap_or_default();
        assert_eq!(parse_turtle(&web_id, inserted)?.len(), 1);
        Ok(())
    }
}
