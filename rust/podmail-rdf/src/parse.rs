use oxttl::TurtleParser;

use crate::{Iri, Literal, RdfError, Term, Triple};

/// Parses a Turtle (or N-Triples) document into triples.
///
/// Relative IRIs are resolved against the document IRI. The first syntax
/// error aborts parsing; a document is either understood completely or not
/// at all.
pub fn parse_turtle(document: &Iri, body: &str) -> Result<Vec<Triple>, RdfError> {
    let parser = TurtleParser::new()
        .with_base_iri(document.as_str())
        .map_err(|error| RdfError::InvalidIri {
            iri: document.to_string(),
            reason: error.to_string(),
        })?;

    let mut triples = Vec::new();
    for triple in parser.for_slice(body.as_bytes()) {
        let triple = triple.map_err(|error| RdfError::Syntax {
            document: document.to_string(),
            reason: error.to_string(),
        })?;
        if let Some(triple) = convert(triple) {
            triples.push(triple);
        }
    }

    Ok(triples)
}

// Quoted triples have no counterpart in the podmail data model and are skipped.
#[allow(unreachable_patterns)]
fn convert(triple: oxrdf::Triple) -> Option<Triple> {
    let subject = match triple.subject {
        oxrdf::Subject::NamedNode(node) => Term::Iri(node.into()),
        oxrdf::Subject::BlankNode(node) => Term::Blank(node.as_str().to_owned()),
        _ => return None,
    };

    let object = match triple.object {
        oxrdf::Term::NamedNode(node) => Term::Iri(node.into()),
        oxrdf::Term::BlankNode(node) => Term::Blank(node.as_str().to_owned()),
        oxrdf::Term::Literal(literal) => Term::Literal(Literal::from(literal)),
        _ => return None,
    };

    Some(Triple {
        subject,
        predicate: Iri::from(triple.predicate),
        object,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocab;
    use pretty_assertions::assert_eq;
    use testresult::TestResult;

    #[test]
    fn it_resolves_relative_iris_against_document() -> TestResult {
        let document = Iri::new("https://alice.example/profile/card")?;
        let body = r#"
            @prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#>.
            <#me> rdfs:seeAlso <../extended.ttl> .
        "#;

        let triples = parse_turtle(&document, body)?;

        assert_eq!(
            triples,
            vec![Triple::new(
                Term::iri("https://alice.example/profile/card#me"),
                Iri::new_unchecked(vocab::rdfs::SEE_ALSO),
                Term::iri("https://alice.example/extended.ttl"),
            )]
        );
        Ok(())
    }

    #[test]
    fn it_keeps_literal_metadata() -> TestResult {
        let document = Iri::new("https://alice.example/settings.ttl")?;
        let body = r#"<#me> <https://example.com/token> "abc"@en ."#;

        let triples = parse_turtle(&document, body)?;
        let Term::Literal(literal) = &triples[0].object else {
            panic!("expected a literal object");
        };

        assert_eq!(literal.value(), "abc");
        assert_eq!(literal.language(), Some("en"));
        Ok(())
    }

    #[test]
    fn it_parses_blank_nodes() -> TestResult {
        let document = Iri::new("https://alice.example/index.ttl")?;
        let body = r#"
            @prefix solid: <http://www.w3.org/ns/solid/terms#>.
            [] a solid:TypeRegistration .
        "#;

        let triples = parse_turtle(&document, body)?;

        assert_eq!(triples.len(), 1);
        assert!(matches!(triples[0].subject, Term::Blank(_)));
        Ok(())
    }

    #[test]
    fn it_fails_on_malformed_documents() -> TestResult {
        let document = Iri::new("https://alice.example/broken.ttl")?;
        let result = parse_turtle(&document, "<#me> <#knows> .");

        assert!(matches!(result, Err(RdfError::Syntax { .. })));
        Ok(())
    }
}
