//! Finding a person's settings documents

use podmail_access::find_writable;
use podmail_query::{Bindings, Match, Plan, Resolution, Resolver, Variable};
use podmail_rdf::{Iri, Term, vocab};
use podmail_remote::Fetch;
use tracing::{instrument, warn};

use crate::NotifyError;

/// Variable seeded with the WebID being searched
pub const PERSON: &str = "person";

/// Variable receiving the settings documents
pub const SETTINGS: &str = "settings";

fn var(name: &str) -> Variable {
    Variable::new_unchecked(name)
}

fn term(iri: &str) -> Iri {
    Iri::new_unchecked(iri)
}

/// The plan locating a person's settings.
///
/// Starting at the WebID it follows `rdfs:seeAlso` to extended profile
/// documents, reads the public type index, takes the registrations for
/// `discovery_type` that the type index itself asserts, follows their
/// instances, and finally collects `space:preferencesFile` of the person into
/// `?settings`.
pub fn discovery_plan(discovery_type: &Iri) -> Plan {
    Plan::new()
        .step(
            Match::objects(term(vocab::rdfs::SEE_ALSO), var("extendedDocument"))
                .with_subject(var(PERSON)),
        )
        .add_resources(var("extendedDocument"))
        .step(
            Match::objects(term(vocab::solid::PUBLIC_TYPE_INDEX), var("publicTypeIndex"))
                .with_subject(var(PERSON)),
        )
        .add_resources(var("publicTypeIndex"))
        .step(
            Match::subjects(term(vocab::rdf::TYPE), var("typeRegistration"))
                .with_object(term(vocab::solid::TYPE_REGISTRATION))
                .in_graph(var("publicTypeIndex")),
        )
        .step(
            Match::subjects(term(vocab::solid::FOR_CLASS), var("typeRegistrationForClass"))
                .with_subject(var("typeRegistration"))
                .with_object(discovery_type.clone()),
        )
        .step(
            Match::objects(term(vocab::solid::INSTANCE), var("classDocument"))
                .with_subject(var("typeRegistrationForClass")),
        )
        .add_resources(var("classDocument"))
        .step(
            Match::objects(term(vocab::space::PREFERENCES_FILE), var(SETTINGS))
                .with_subject(var(PERSON)),
        )
        .add_resources(var(SETTINGS))
}

/// Searches pods for settings documents and the tokens stored in them
pub struct Discovery<F> {
    resolver: Resolver<F>,
    plan: Plan,
    token_predicate: Iri,
}

impl<F> Discovery<F>
where
    F: Fetch,
{
    /// Create a discovery searching with `resolver`
    pub fn new(resolver: Resolver<F>, discovery_type: &Iri, token_predicate: Iri) -> Self {
        Self {
            resolver,
            plan: discovery_plan(discovery_type),
            token_predicate,
        }
    }

    /// The resolver pods are crawled with
    pub fn resolver(&self) -> &Resolver<F> {
        &self.resolver
    }

    /// Crawl the pod of `web_id`
    pub async fn resolve(&self, web_id: &Iri) -> Resolution {
        let seed = Bindings::new().bind(var(PERSON), Term::Iri(web_id.clone()));
        self.resolver.resolve(&self.plan, seed).await
    }

    /// All tokens stored for `web_id`.
    ///
    /// Tokens found are returned even if the crawl was cut short. Finding none
    /// in an incomplete crawl is reported as [`NotifyError::Incomplete`]
    /// because the tokens may live in a document that was never read.
    #[instrument(level = "debug", skip_all, fields(web_id = %web_id))]
    pub async fn find_verification_tokens(&self, web_id: &Iri) -> Result<Vec<String>, NotifyError> {
        let resolution = self.resolve(web_id).await;
        let tokens: Vec<String> = resolution
            .store
            .objects(&Term::Iri(web_id.clone()), &self.token_predicate)
            .into_iter()
            .filter_map(|object| match object {
                Term::Literal(literal) => Some(literal.value().to_string()),
                Term::Iri(_) | Term::Blank(_) => None,
            })
            .collect();

        if tokens.is_empty() && !resolution.is_converged() {
            warn!(status = ?resolution.status, "Pod search did not complete");
            return Err(NotifyError::Incomplete {
                person: web_id.clone(),
                status: resolution.status,
            });
        }
        Ok(tokens)
    }

    /// Settings documents of `web_id` the service may write to
    #[instrument(level = "debug", skip_all, fields(web_id = %web_id))]
    pub async fn find_writable_settings(&self, web_id: &Iri) -> Vec<Iri> {
        let resolution = self.resolve(web_id).await;
        let settings: Vec<Iri> = resolution
            .variable(&var(SETTINGS))
            .iter()
            .filter_map(Term::as_iri)
            .cloned()
            .collect();

        find_writable(self.resolver.fetcher(), &settings).await
    }
}
