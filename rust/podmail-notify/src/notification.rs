use podmail_rdf::Iri;
use podmail_remote::Fetch;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::{Mailbox, Mailer, Message, NotifyError, Service, Template};

/// JSON-LD context of ActivityStreams documents
pub const ACTIVITY_STREAMS: &str = "https://www.w3.org/ns/activitystreams";

/// Activity types accepted as notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivityType {
    /// Somebody created something for the target
    Create,
}

/// Actor types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActorType {
    /// A person identified by their WebID
    Person,
}

/// Object types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectType {
    /// A short message
    Note,
}

/// A person taking part in a notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    /// Always `Person`
    #[serde(rename = "type")]
    pub kind: ActorType,
    /// WebID
    pub id: Iri,
    /// Display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Person {
    /// A person without a display name
    pub fn new(id: Iri) -> Self {
        Self {
            kind: ActorType::Person,
            id,
            name: None,
        }
    }

    /// Set the display name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    fn display_name(&self) -> Option<&str> {
        self.name.as_deref().filter(|name| !name.is_empty())
    }
}

/// The message carried by a notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Always `Note`
    #[serde(rename = "type")]
    pub kind: ObjectType,
    /// Identifier of the message
    pub id: String,
    /// Plain text content
    pub content: String,
}

/// An ActivityStreams `Create` activity: `actor` wrote `object` to `target`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// JSON-LD context, see [`ACTIVITY_STREAMS`]
    #[serde(rename = "@context")]
    pub context: String,
    /// Identifier of the activity
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Always `Create`
    #[serde(rename = "type")]
    pub kind: ActivityType,
    /// Sender
    pub actor: Person,
    /// Message
    pub object: Note,
    /// Recipient
    pub target: Person,
}

impl Notification {
    /// A notification of `actor` writing `content` to `target`
    pub fn new(actor: Person, target: Person, id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            context: ACTIVITY_STREAMS.to_string(),
            id: None,
            kind: ActivityType::Create,
            actor,
            object: Note {
                kind: ObjectType::Note,
                id: id.into(),
                content: content.into(),
            },
            target,
        }
    }
}

impl<F, M> Service<F, M>
where
    F: Fetch,
    M: Mailer,
{
    /// Deliver `notification` on behalf of the authenticated `sender`.
    ///
    /// Returns the number of emails sent, one per verified address of the
    /// target.
    #[instrument(level = "debug", skip_all, fields(sender = %sender, target = %notification.target.id))]
    pub async fn notify(&self, sender: &Iri, notification: &Notification) -> Result<usize, NotifyError> {
        if sender != &notification.actor.id {
            return Err(NotifyError::Forbidden);
        }

        let target = &notification.target;
        let emails = self.verified_emails(&target.id).await?;
        if emails.is_empty() {
            return Err(NotifyError::NoEmail {
                person: target.id.clone(),
            });
        }

        let app_name = &self.config.app_name;
        let actor_name = notification.actor.display_name();
        let from_name = match actor_name {
            Some(name) => format!("{name} (via {app_name})"),
            None => format!("{app_name} notifications"),
        };
        let subject = format!("{} wrote you from {app_name}", actor_name.unwrap_or("Someone"));

        for email in &emails {
            self.mailer
                .send(Message {
                    from: Mailbox::new(from_name.clone(), self.config.email_sender.clone()),
                    to: Mailbox::new(target.name.clone().unwrap_or_default(), email.clone()),
                    subject: subject.clone(),
                    text: notification.object.content.clone(),
                    template: Template::Message,
                })
                .await?;
        }

        info!(emails = emails.len(), "Delivered notification");
        Ok(emails.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use testresult::TestResult;

    #[test]
    fn it_reads_activity_streams_json() -> TestResult {
        let notification: Notification = serde_json::from_str(
            r#"{
                "@context": "https://www.w3.org/ns/activitystreams",
                "type": "Create",
                "actor": {"type": "Person", "id": "https://alice.example/card#me", "name": "Alice"},
                "object": {"type": "Note", "id": "https://alice.example/messages/1", "content": "Hi Bob"},
                "target": {"type": "Person", "id": "https://bob.example/card#me"}
            }"#,
        )?;

        assert_eq!(
            notification,
            Notification::new(
                Person::new(Iri::new("https://alice.example/card#me")?).with_name("Alice"),
                Person::new(Iri::new("https://bob.example/card#me")?),
                "https://alice.example/messages/1",
                "Hi Bob",
            )
        );
        Ok(())
    }

    #[test]
    fn it_rejects_other_activity_types() {
        let result = serde_json::from_str::<Notification>(
            r#"{
                "@context": "https://www.w3.org/ns/activitystreams",
                "type": "Delete",
                "actor": {"type": "Person", "id": "https://alice.example/card#me"},
                "object": {"type": "Note", "id": "https://alice.example/messages/1", "content": "Hi"},
                "target": {"type": "Person", "id": "https://bob.example/card#me"}
            }"#,
        );
        assert!(result.is_err());
    }
}
