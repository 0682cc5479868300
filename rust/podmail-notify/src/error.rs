use podmail_access::AccessError;
use podmail_credentials::TokenError;
use podmail_query::Status;
use podmail_rdf::Iri;
use podmail_remote::FetchError;
use thiserror::Error;

use crate::{ConfigError, MailError};

/// Errors surfaced by the notification service.
///
/// Each variant maps to the HTTP status an outer web layer should answer
/// with, see [`NotifyError::status`].
#[derive(Error, Debug)]
pub enum NotifyError {
    /// The authenticated caller tried to act as somebody else
    #[error("You can't send notification as somebody else")]
    Forbidden,

    /// The recipient has no verified email address
    #[error("Receiving person doesn't have available email address")]
    NoEmail { person: Iri },

    /// The recipient's pod could not be searched completely
    #[error("Could not finish searching the pod of <{person}> ({status:?})")]
    Incomplete { person: Iri, status: Status },

    /// The verification link carries no token
    #[error("This is not a valid verification link. Have you received the link in your email?")]
    MissingLink,

    /// The verification link is past its expiry
    #[error("Verification link is expired")]
    LinkExpired,

    /// The verification link is not authentic
    #[error("Verification link is invalid")]
    LinkInvalid,

    /// No writable settings document was found. The verified token is
    /// returned so the person can store it manually.
    #[error(
        "We couldn't find any writeable location on your Pod to save the email verification token. You can write it manually."
    )]
    NoWritableLocation { token: String },

    /// The person is not a member of any allowed group
    #[error("Person is not a member of any allowed group")]
    NotMember { person: Iri, groups: Vec<Iri> },

    /// A token could not be issued
    #[error(transparent)]
    Token(#[from] TokenError),

    /// A pod could not be reached
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// An access check could not be completed
    #[error(transparent)]
    Access(AccessError),

    /// The mail could not be handed over for delivery
    #[error(transparent)]
    Mail(#[from] MailError),

    /// The service is misconfigured
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl NotifyError {
    /// HTTP status code to answer with
    pub fn status(&self) -> u16 {
        match self {
            NotifyError::Forbidden => 403,
            NotifyError::NoEmail { .. } => 404,
            NotifyError::Incomplete { .. } => 503,
            NotifyError::MissingLink
            | NotifyError::LinkExpired
            | NotifyError::LinkInvalid
            | NotifyError::NoWritableLocation { .. }
            | NotifyError::NotMember { .. } => 400,
            NotifyError::Fetch(_) | NotifyError::Access(_) => 502,
            NotifyError::Token(_) | NotifyError::Mail(_) | NotifyError::Config(_) => 500,
        }
    }

    /// Map a verification failure of a link token
    pub(crate) fn from_link(error: TokenError) -> Self {
        match error {
            TokenError::Expired => NotifyError::LinkExpired,
            TokenError::Invalid(_) | TokenError::Key(_) => NotifyError::LinkInvalid,
        }
    }
}

impl From<AccessError> for NotifyError {
    fn from(error: AccessError) -> Self {
        match error {
            AccessError::NotMember { person, groups } => NotifyError::NotMember { person, groups },
            other => NotifyError::Access(other),
        }
    }
}
