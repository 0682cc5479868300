use futures_util::StreamExt;
use futures_util::stream::FuturesUnordered;
use podmail_rdf::{Iri, Pattern, Term, vocab};
use podmail_remote::{Fetch, fetch_document};
use tracing::{debug, instrument, warn};

use crate::AccessError;

/// Returns true if the document of `group` states `<group> vcard:hasMember <user>`.
///
/// A group document that cannot be fetched or parsed confirms nothing and
/// yields `false`.
#[instrument(level = "debug", skip_all, fields(user = %user, group = %group))]
pub async fn is_member<F>(fetcher: &F, user: &Iri, group: &Iri) -> bool
where
    F: Fetch + ?Sized,
{
    let triples = match fetch_document(fetcher, group).await {
        Ok(triples) => triples,
        Err(error) => {
            warn!(kind = error.kind(), "Could not read group document: {error}");
            return false;
        }
    };

    let membership = Pattern::new()
        .subject(Term::Iri(group.clone()))
        .predicate(Iri::new_unchecked(vocab::vcard::HAS_MEMBER))
        .object(Term::Iri(user.clone()));
    let found = triples.iter().any(|triple| membership.matches_triple(triple));

    debug!(found, "Checked group membership");
    found
}

/// Returns true if `user` is a member of at least one of `groups`.
///
/// Groups are checked concurrently; the first confirmed membership wins.
pub async fn is_any_member<F>(fetcher: &F, user: &Iri, groups: &[Iri]) -> bool
where
    F: Fetch + ?Sized,
{
    let mut checks = groups
        .iter()
        .map(|group| is_member(fetcher, user, group))
        .collect::<FuturesUnordered<_>>();

    while let Some(member) = checks.next().await {
        if member {
            return true;
        }
    }
    false
}

/// Admits `person` if no groups are configured or if they belong to one of
/// `groups`.
pub async fn authorize<F>(fetcher: &F, person: &Iri, groups: &[Iri]) -> Result<(), AccessError>
where
    F: Fetch + ?Sized,
{
    if groups.is_empty() || is_any_member(fetcher, person, groups).await {
        Ok(())
    } else {
        Err(AccessError::NotMember {
            person: person.clone(),
            groups: groups.to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use podmail_remote::MemoryFetcher;
    use std::time::Duration;
    use testresult::TestResult;

    const GROUP: &str = r#"
        @prefix vcard: <http://www.w3.org/2006/vcard/ns#>.
        <#us> a vcard:Group; vcard:hasMember <https://alice.example/card#me> .
        <#them> vcard:hasMember <https://bob.example/card#me> .
    "#;

    fn iri(value: &str) -> Iri {
        Iri::new_unchecked(value)
    }

    fn fixture() -> MemoryFetcher {
        MemoryFetcher::new()
            .with_document("https://pod.example/group", GROUP)
            .with_failure("https://down.example/group")
    }

    #[tokio::test]
    async fn it_confirms_listed_members_only() {
        let fetcher = fixture();
        let group = iri("https://pod.example/group#us");

        assert!(is_member(&fetcher, &iri("https://alice.example/card#me"), &group).await);
        assert!(!is_member(&fetcher, &iri("https://bob.example/card#me"), &group).await);
    }

    #[tokio::test]
    async fn it_denies_when_the_group_is_unreachable() {
        let fetcher = fixture();
        let group = iri("https://down.example/group#us");

        assert!(!is_member(&fetcher, &iri("https://alice.example/card#me"), &group).await);
        assert!(!is_member(&fetcher, &iri("https://alice.example/card#me"), &iri("https://nowhere.example/g")).await);
    }

    #[tokio::test(start_paused = true)]
    async fn it_accepts_membership_in_any_group() {
        let fetcher = fixture().with_delay("https://down.example/group", Duration::from_secs(5));
        let groups = [
            iri("https://down.example/group#us"),
            iri("https://pod.example/group#them"),
        ];

        assert!(is_any_member(&fetcher, &iri("https://bob.example/card#me"), &groups).await);
        assert!(!is_any_member(&fetcher, &iri("https://carol.example/card#me"), &groups).await);
    }

    #[tokio::test]
    async fn it_authorizes_everybody_without_groups() -> TestResult {
        let fetcher = fixture();
        let carol = iri("https://carol.example/card#me");

        authorize(&fetcher, &carol, &[]).await?;

        let denied = authorize(&fetcher, &carol, &[iri("https://pod.example/group#us")]).await;
        assert!(matches!(denied, Err(AccessError::NotMember { .. })));
        assert_eq!(fetcher.requests().await.len(), 1);
        Ok(())
    }
}
