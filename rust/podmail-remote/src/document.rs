use podmail_rdf::{Iri, Triple, parse_turtle};
use tracing::debug;

use crate::{Fetch, FetchError, Request, TURTLE};

/// Retrieves a document and parses it as Turtle.
///
/// The fragment of `uri` is dropped: `https://a.example/card#me` is read from
/// `https://a.example/card`, which is also the base IRI of the parse.
pub async fn fetch_document<F>(fetcher: &F, uri: &Iri) -> Result<Vec<Triple>, FetchError>
where
    F: Fetch + ?Sized,
{
    let document = uri.document();
    let request = Request::get(document.clone()).with_header("accept", TURTLE);
    let response = fetcher.fetch(request).await?;

    if !response.is_success() {
        return Err(FetchError::Status {
            uri: document,
            status: response.status,
        });
    }

    let triples = parse_turtle(&document, &response.body)?;
    debug!(document = %document, triples = triples.len(), "Fetched document");
    Ok(triples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryFetcher;
    use podmail_rdf::Term;
    use testresult::TestResult;

    #[tokio::test]
    async fn it_fetches_the_document_without_fragment() -> TestResult {
        let fetcher = MemoryFetcher::new().with_document(
            "https://alice.example/card",
            "<#me> <http://www.w3.org/ns/pim/space#preferencesFile> <settings.ttl> .",
        );

        let triples = fetch_document(&fetcher, &Iri::new("https://alice.example/card#me")?).await?;

        assert_eq!(triples.len(), 1);
        assert_eq!(triples[0].object, Term::iri("https://alice.example/settings.ttl"));
        assert_eq!(fetcher.request_count("https://alice.example/card").await, 1);
        Ok(())
    }

    #[tokio::test]
    async fn it_reports_unsuccessful_statuses() -> TestResult {
        let fetcher = MemoryFetcher::new();
        let result = fetch_document(&fetcher, &Iri::new("https://alice.example/nope")?).await;

        assert!(matches!(result, Err(FetchError::Status { status: 404, .. })));
        Ok(())
    }

    #[tokio::test]
    async fn it_reports_unparsable_bodies() -> TestResult {
        let fetcher = MemoryFetcher::new().with_document("https://alice.example/bad", "<<<");
        let result = fetch_document(&fetcher, &Iri::new("https://alice.example/bad")?).await;

        assert!(matches!(result, Err(FetchError::Parse(_))));
        Ok(())
    }
}
