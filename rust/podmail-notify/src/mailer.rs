use std::fmt::{self, Display};
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

/// An email could not be handed over for delivery
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Could not send email to {recipient}: {reason}")]
pub struct MailError {
    /// Address of the recipient
    pub recipient: String,
    /// Why delivery failed
    pub reason: String,
}

/// A named email address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mailbox {
    /// Display name, may be empty
    pub name: String,
    /// Email address
    pub address: String,
}

impl Mailbox {
    /// A mailbox with a display name
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
        }
    }
}

impl Display for Mailbox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name.is_empty() {
            write!(f, "<{}>", self.address)
        } else {
            write!(f, "\"{}\" <{}>", self.name, self.address)
        }
    }
}

/// Why an email is sent; selects the template of the rendered message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Template {
    /// Asks the recipient to confirm their address
    Verification,
    /// Relays a message from another person
    Message,
}

/// An outgoing email
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Sender
    pub from: Mailbox,
    /// Recipient
    pub to: Mailbox,
    /// Subject line
    pub subject: String,
    /// Plain text body
    pub text: String,
    /// Template the HTML body is rendered with
    pub template: Template,
}

/// Delivers email. Rendering and transport are up to the implementation.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Hand `message` over for delivery
    async fn send(&self, message: Message) -> Result<(), MailError>;
}

#[async_trait]
impl<M> Mailer for Arc<M>
where
    M: Mailer + ?Sized,
{
    async fn send(&self, message: Message) -> Result<(), MailError> {
        (**self).send(message).await
    }
}

/// Mailer that keeps every message in memory
#[cfg(any(test, feature = "helpers"))]
#[derive(Debug, Clone, Default)]
pub struct MemoryMailer {
    messages: Arc<tokio::sync::Mutex<Vec<Message>>>,
}

#[cfg(any(test, feature = "helpers"))]
impl MemoryMailer {
    /// Create an empty mailer
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages sent so far
    pub async fn messages(&self) -> Vec<Message> {
        self.messages.lock().await.clone()
    }
}

#[cfg(any(test, feature = "helpers"))]
#[async_trait]
impl Mailer for MemoryMailer {
    async fn send(&self, message: Message) -> Result<(), MailError> {
        self.messages.lock().await.push(message);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use testresult::TestResult;

    #[tokio::test]
    async fn it_keeps_messages_across_clones() -> TestResult {
        let mailer = MemoryMailer::new();
        let shared: Arc<dyn Mailer> = Arc::new(mailer.clone());

        shared
            .send(Message {
                from: Mailbox::new("Sleepy.Bike notifications", "noreply@sleepy.bike"),
                to: Mailbox::new("", "alice@example.com"),
                subject: "Hello".to_string(),
                text: "Hello Alice".to_string(),
                template: Template::Message,
            })
            .await?;

        let messages = mailer.messages().await;
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].to.address, "alice@example.com");
        Ok(())
    }
}
