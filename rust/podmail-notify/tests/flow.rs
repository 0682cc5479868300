//! End to end tests of the verification and notification flows against an
//! in-memory pod

use anyhow::Result;
use podmail_credentials::TokenCodec;
use podmail_notify::{
    Config, MemoryMailer, Notification, NotifyError, Person, Service, Template,
};
use podmail_rdf::Iri;
use podmail_remote::{MemoryFetcher, Method};
use pretty_assertions::assert_eq;
use std::time::Duration;

const ALICE: &str = "https://alice.example/profile/card#me";
const BOB: &str = "https://bob.example/profile/card#me";
const CARD: &str = "https://alice.example/profile/card";
const TYPE_INDEX: &str = "https://alice.example/settings/publicTypeIndex.ttl";
const HOSPEX: &str = "https://alice.example/hospex/sleepy-bike/card";
const SETTINGS: &str = "https://alice.example/hospex/sleepy-bike/settings";
const GROUP: &str = "https://group.example/community#us";

fn codec() -> TokenCodec {
    let key = p256::ecdsa::SigningKey::from_slice(&[11u8; 32]).expect("valid scalar");
    TokenCodec::new(key, "https://bot.example/profile/card#me")
}

fn pod(settings_access: &str) -> MemoryFetcher {
    MemoryFetcher::new()
        .with_document(
            CARD,
            r#"
            @prefix solid: <http://www.w3.org/ns/solid/terms#>.
            <#me> solid:publicTypeIndex </settings/publicTypeIndex.ttl> .
            "#,
        )
        .with_document(
            TYPE_INDEX,
            r#"
            @prefix solid: <http://www.w3.org/ns/solid/terms#>.
            @prefix hospex: <http://w3id.org/hospex/ns#>.
            <#hospex> a solid:TypeRegistration;
                solid:forClass hospex:PersonalHospexDocument;
                solid:instance </hospex/sleepy-bike/card> .
            <#other> a solid:TypeRegistration;
                solid:forClass <https://vocab.example/Other>;
                solid:instance </elsewhere> .
            "#,
        )
        .with_document(
            HOSPEX,
            r#"
            @prefix space: <http://www.w3.org/ns/pim/space#>.
            </profile/card#me> space:preferencesFile <settings> .
            "#,
        )
        .with_document(SETTINGS, "")
        .with_header(SETTINGS, "WAC-Allow", settings_access)
        .with_patch_status(SETTINGS, 205)
        .with_document(
            "https://group.example/community",
            r#"
            @prefix vcard: <http://www.w3.org/2006/vcard/ns#>.
            <#us> vcard:hasMember <https://alice.example/profile/card#me> .
            "#,
        )
}

fn service(fetcher: &MemoryFetcher, mailer: &MemoryMailer) -> Service<MemoryFetcher, MemoryMailer> {
    Service::new(Config::new(), fetcher.clone(), codec(), mailer.clone())
}

fn token_of(link: &str) -> &str {
    link.split_once("token=").map(|(_, token)| token).unwrap_or_default()
}

#[tokio::test]
async fn it_verifies_an_address_and_delivers_notifications() -> Result<()> {
    let fetcher = pod(r#"user="read write",public="""#);
    let mailer = MemoryMailer::new();
    let service = service(&fetcher, &mailer);
    let alice = Iri::new(ALICE)?;

    // Alice asks for her address to be verified
    let link = service.initialize(&alice, "alice@example.com").await?;
    assert!(link.starts_with("http://localhost:3005/verify-email?token="));

    let sent = mailer.messages().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].subject, "Verify your email for Sleepy.Bike notifications");
    assert_eq!(sent[0].from.name, "Sleepy.Bike notifications");
    assert_eq!(sent[0].to.address, "alice@example.com");
    assert_eq!(sent[0].template, Template::Verification);
    assert!(sent[0].text.contains(&link));

    // She follows the link
    let verified = service.verify_email(Some(token_of(&link))).await?;
    assert_eq!(verified.saved, 1);
    assert_eq!(verified.message, "Your email was successfully verified.");

    let patches = fetcher.requests_for(&Iri::new(SETTINGS)?, Method::Patch).await;
    assert_eq!(patches.len(), 1);
    let body = patches[0].body.clone().unwrap_or_default();
    assert!(body.contains(&format!(
        "<{ALICE}> <https://example.com/emailVerificationToken> \"{}\" .",
        verified.token
    )));
    assert_eq!(
        patches[0].headers,
        vec![("content-type".to_string(), "text/n3".to_string())]
    );

    // The pod now holds the token
    fetcher
        .put_document(
            SETTINGS,
            &format!(
                "</profile/card#me> <https://example.com/emailVerificationToken> \"{}\" .",
                verified.token
            ),
        )
        .await;
    assert!(service.status(&alice).await?.email_verified);
    assert_eq!(
        service.verified_emails(&alice).await?,
        vec!["alice@example.com".to_string()]
    );

    // Bob writes to Alice
    let notification = Notification::new(
        Person::new(Iri::new(BOB)?).with_name("Bob"),
        Person::new(alice.clone()).with_name("Alice"),
        "https://bob.example/messages/1",
        "Are you free next weekend?",
    );
    let delivered = service.notify(&Iri::new(BOB)?, &notification).await?;
    assert_eq!(delivered, 1);

    let message = mailer.messages().await.pop().expect("message was sent");
    assert_eq!(message.from.name, "Bob (via Sleepy.Bike)");
    assert_eq!(message.to.name, "Alice");
    assert_eq!(message.to.address, "alice@example.com");
    assert_eq!(message.subject, "Bob wrote you from Sleepy.Bike");
    assert_eq!(message.text, "Are you free next weekend?");
    assert_eq!(message.template, Template::Message);
    Ok(())
}

#[tokio::test]
async fn it_returns_the_token_when_nothing_is_writable() -> Result<()> {
    let fetcher = pod(r#"user="read",public="read""#);
    let mailer = MemoryMailer::new();
    let service = service(&fetcher, &mailer);

    let link = service.initialize(&Iri::new(ALICE)?, "alice@example.com").await?;
    let result = service.verify_email(Some(token_of(&link))).await;

    match result {
        Err(error @ NotifyError::NoWritableLocation { .. }) => {
            assert_eq!(error.status(), 400);
            if let NotifyError::NoWritableLocation { token } = error {
                let grant = codec().verify(&token)?;
                assert!(grant.claim.email_verified);
            }
        }
        other => panic!("expected NoWritableLocation, got {other:?}"),
    }
    assert!(fetcher.requests_for(&Iri::new(SETTINGS)?, Method::Patch).await.is_empty());
    Ok(())
}

#[tokio::test]
async fn it_distinguishes_broken_links() -> Result<()> {
    let fetcher = pod(r#"user="read write""#);
    let mailer = MemoryMailer::new();
    let service = service(&fetcher, &mailer);

    assert!(matches!(service.check_link(None), Err(NotifyError::MissingLink)));
    assert!(matches!(service.check_link(Some("")), Err(NotifyError::MissingLink)));
    assert!(matches!(
        service.check_link(Some("not.a.token")),
        Err(NotifyError::LinkInvalid)
    ));

    let expiring = Service::new(
        Config {
            email_verification_ttl: Duration::ZERO,
            ..Config::new()
        },
        fetcher.clone(),
        codec(),
        mailer.clone(),
    );
    let link = expiring.initialize(&Iri::new(ALICE)?, "alice@example.com").await?;
    let expired = expiring.check_link(Some(token_of(&link)));
    assert!(matches!(expired, Err(NotifyError::LinkExpired)));
    assert_eq!(
        expired.err().map(|error| error.to_string()),
        Some("Verification link is expired".to_string())
    );
    Ok(())
}

#[tokio::test]
async fn it_refuses_to_notify_on_behalf_of_others() -> Result<()> {
    let fetcher = pod(r#"user="read write""#);
    let mailer = MemoryMailer::new();
    let service = service(&fetcher, &mailer);

    let notification = Notification::new(
        Person::new(Iri::new(BOB)?),
        Person::new(Iri::new(ALICE)?),
        "https://bob.example/messages/1",
        "Hello",
    );
    let forged = service.notify(&Iri::new(ALICE)?, &notification).await;

    assert!(matches!(forged, Err(NotifyError::Forbidden)));
    assert!(mailer.messages().await.is_empty());
    Ok(())
}

#[tokio::test]
async fn it_reports_people_without_addresses() -> Result<()> {
    let fetcher = pod(r#"user="read write""#);
    let mailer = MemoryMailer::new();
    let service = service(&fetcher, &mailer);

    let notification = Notification::new(
        Person::new(Iri::new(ALICE)?),
        Person::new(Iri::new("https://nobody.example/card#me")?),
        "https://alice.example/messages/1",
        "Hello",
    );
    let result = service.notify(&Iri::new(ALICE)?, &notification).await;

    match result {
        Err(error @ NotifyError::NoEmail { .. }) => assert_eq!(error.status(), 404),
        other => panic!("expected NoEmail, got {other:?}"),
    }
    assert!(!service.status(&Iri::new(ALICE)?).await?.email_verified);
    Ok(())
}

#[tokio::test]
async fn it_admits_only_group_members() -> Result<()> {
    let fetcher = pod(r#"user="read write""#);
    let mailer = MemoryMailer::new();
    let service = Service::new(
        Config::new().with_allowed_groups(vec![Iri::new(GROUP)?]),
        fetcher,
        codec(),
        mailer,
    );

    service.authorize(&Iri::new(ALICE)?).await?;
    let denied = service.authorize(&Iri::new(BOB)?).await;

    match denied {
        Err(error @ NotifyError::NotMember { .. }) => {
            assert_eq!(error.to_string(), "Person is not a member of any allowed group")
        }
        other => panic!("expected NotMember, got {other:?}"),
    }
    Ok(())
}
