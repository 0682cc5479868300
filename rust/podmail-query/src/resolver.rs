//! Fixed-point resolution of a [`Plan`] against remote documents

use std::sync::Arc;
use std::time::Duration;

use futures_util::{StreamExt, stream};
use indexmap::{IndexMap, IndexSet};
use podmail_rdf::{Iri, Store, Term, Triple};
use podmail_remote::{Fetch, FetchError, fetch_document};
use tokio::time::{Instant, sleep_until, timeout};
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

use crate::{Bindings, Plan, Step, Variable};

/// Limits applied to a single resolution run
#[derive(Clone, Debug)]
pub struct ResolverConfig {
    /// Maximum number of documents fetched in one run (default: 256)
    pub max_fetches: usize,

    /// Maximum wall-clock duration of one run (default: 60 seconds)
    pub deadline: Option<Duration>,

    /// Maximum duration of a single fetch (default: 30 seconds)
    pub fetch_timeout: Duration,

    /// Number of documents fetched concurrently within a pass (default: 8)
    pub concurrency: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_fetches: 256,
            deadline: Some(Duration::from_secs(60)),
            fetch_timeout: Duration::from_secs(30),
            concurrency: 8,
        }
    }
}

impl ResolverConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of fetches per run
    pub fn with_max_fetches(mut self, max_fetches: usize) -> Self {
        self.max_fetches = max_fetches;
        self
    }

    /// Set the wall-clock budget of a run
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Remove the wall-clock budget
    pub fn without_deadline(mut self) -> Self {
        self.deadline = None;
        self
    }

    /// Set the timeout of a single fetch
    pub fn with_fetch_timeout(mut self, fetch_timeout: Duration) -> Self {
        self.fetch_timeout = fetch_timeout;
        self
    }

    /// Set the number of concurrent fetches, at least one
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }
}

/// How a resolution run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// No document remained to be fetched. The bindings are authoritative.
    Converged,
    /// The run was cancelled. The bindings are partial.
    Cancelled,
    /// The fetch count or time budget ran out. The bindings are partial.
    BudgetExhausted,
}

/// What happened to one fetched document
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The document was fetched and parsed
    Loaded {
        /// Number of triples it contained
        triples: usize,
    },
    /// The document contributed nothing
    Failed {
        /// Why
        error: FetchError,
    },
}

impl Outcome {
    /// Returns true for [`Outcome::Loaded`]
    pub fn is_loaded(&self) -> bool {
        matches!(self, Outcome::Loaded { .. })
    }
}

/// Receives the outcome of every document fetched during resolution.
///
/// Failed fetches are absorbed by the resolver. Observers can tell a
/// transient failure (see [`FetchError::is_transient`]) from a fact that is
/// genuinely absent, e.g. to count, alert on, or retry a denied request.
pub trait ResolveObserver: Send + Sync {
    /// Called once per fetched document, in completion order
    fn observe(&self, document: &Iri, outcome: &Outcome);
}

/// Observer that ignores everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl ResolveObserver for NoopObserver {
    fn observe(&self, _document: &Iri, _outcome: &Outcome) {}
}

/// Result of a resolution run
#[derive(Debug, Clone)]
pub struct Resolution {
    /// Every quad gathered during the run
    pub store: Store,
    /// Final variable bindings
    pub bindings: Bindings,
    /// How the run ended
    pub status: Status,
    /// Outcome of each fetched document, in completion order
    pub outcomes: IndexMap<Iri, Outcome>,
    /// Number of plan evaluations performed
    pub passes: usize,
}

impl Resolution {
    /// The values bound to `variable` at the end of the run
    pub fn variable(&self, variable: &Variable) -> IndexSet<Term> {
        self.bindings.values(variable).cloned().collect()
    }

    /// Returns true if the run reached its fixed point
    pub fn is_converged(&self) -> bool {
        self.status == Status::Converged
    }

    /// Documents that failed to load
    pub fn failures(&self) -> impl Iterator<Item = (&Iri, &FetchError)> {
        self.outcomes
            .iter()
            .filter_map(|(document, outcome)| match outcome {
                Outcome::Failed { error } => Some((document, error)),
                Outcome::Loaded { .. } => None,
            })
    }
}

/// State owned by a single run
struct Run {
    store: Store,
    bindings: Bindings,
    resources: IndexSet<Iri>,
    outcomes: IndexMap<Iri, Outcome>,
    passes: usize,
}

impl Run {
    fn new(seed: Bindings) -> Self {
        let mut resources = IndexSet::new();
        for (variable, _) in seed.iter() {
            collect_resources(&mut resources, &seed, variable);
        }
        Self {
            store: Store::new(),
            bindings: seed,
            resources,
            outcomes: IndexMap::new(),
            passes: 0,
        }
    }

    fn evaluate(&mut self, plan: &Plan) {
        self.passes += 1;
        for step in plan.steps() {
            match step {
                Step::Match(step) => {
                    let values = step.evaluate(&self.store, &self.bindings);
                    self.bindings.set(step.target.clone(), values);
                }
                Step::AddResources { variable } => {
                    collect_resources(&mut self.resources, &self.bindings, variable);
                }
            }
        }
    }

    fn pending(&self) -> Vec<Iri> {
        self.resources
            .iter()
            .filter(|document| !self.outcomes.contains_key(*document))
            .cloned()
            .collect()
    }

    fn finish(self, status: Status) -> Resolution {
        Resolution {
            store: self.store,
            bindings: self.bindings,
            status,
            outcomes: self.outcomes,
            passes: self.passes,
        }
    }
}

/// Adds the documents of the named values of `variable` to `resources`.
/// Literals and blank nodes cannot be dereferenced and are skipped.
fn collect_resources(resources: &mut IndexSet<Iri>, bindings: &Bindings, variable: &Variable) {
    resources.extend(
        bindings
            .values(variable)
            .filter_map(Term::as_iri)
            .map(Iri::document),
    );
}

/// Executes query plans by crawling documents until no new ones turn up.
///
/// Each pass evaluates the whole plan against the quads gathered so far, then
/// fetches every newly discovered resource. A document is fetched at most once
/// per run; a document that fails to load is remembered as fetched and
/// contributes nothing.
///
/// ```no_run
/// use podmail_query::{Bindings, Match, Plan, Resolver, Variable};
/// use podmail_rdf::{Iri, Term, vocab};
/// use podmail_remote::{FetcherConfig, HttpFetcher};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let person = Variable::new("person")?;
/// let settings = Variable::new("settings")?;
/// let plan = Plan::new().step(
///     Match::objects(Iri::new(vocab::space::PREFERENCES_FILE)?, settings.clone())
///         .with_subject(person.clone()),
/// );
///
/// let resolver = Resolver::new(HttpFetcher::new(FetcherConfig::new())?);
/// let seed = Bindings::new().bind(person, Term::iri("https://alice.example/card#me"));
/// let resolution = resolver.resolve(&plan, seed).await;
/// println!("{:?}", resolution.variable(&settings));
/// # Ok(())
/// # }
/// ```
pub struct Resolver<F> {
    fetcher: F,
    config: ResolverConfig,
    observer: Arc<dyn ResolveObserver>,
}

impl<F> Resolver<F>
where
    F: Fetch,
{
    /// Create a resolver with the default configuration
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher,
            config: ResolverConfig::default(),
            observer: Arc::new(NoopObserver),
        }
    }

    /// Replace the configuration
    pub fn with_config(mut self, config: ResolverConfig) -> Self {
        self.config = config;
        self
    }

    /// Install an observer for fetch outcomes
    pub fn with_observer(mut self, observer: Arc<dyn ResolveObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// The fetcher documents are retrieved with
    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// The active configuration
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolve `plan` starting from `seed`. Seed values are fetched in the
    /// first round.
    pub async fn resolve(&self, plan: &Plan, seed: Bindings) -> Resolution {
        self.resolve_with_cancel(plan, seed, CancellationToken::new())
            .await
    }

    /// Like [`Resolver::resolve`], returning early with
    /// [`Status::Cancelled`] once `cancel` fires. In-flight fetches are
    /// abandoned.
    #[instrument(level = "debug", skip_all, fields(steps = plan.steps().len()))]
    pub async fn resolve_with_cancel(
        &self,
        plan: &Plan,
        seed: Bindings,
        cancel: CancellationToken,
    ) -> Resolution {
        let deadline = self.config.deadline.map(|budget| Instant::now() + budget);
        let mut run = Run::new(seed);

        loop {
            run.evaluate(plan);

            let mut pending = run.pending();
            if pending.is_empty() {
                debug!(passes = run.passes, documents = run.outcomes.len(), "Resolution converged");
                return run.finish(Status::Converged);
            }
            if cancel.is_cancelled() {
                return run.finish(Status::Cancelled);
            }

            let remaining = self.config.max_fetches.saturating_sub(run.outcomes.len());
            if remaining == 0 || deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                warn!(
                    pending = pending.len(),
                    fetched = run.outcomes.len(),
                    "Resolution budget exhausted"
                );
                return run.finish(Status::BudgetExhausted);
            }
            pending.truncate(remaining);

            debug!(pass = run.passes, documents = pending.len(), "Fetching documents");
            if let Some(status) = self.fetch_batch(&mut run, pending, deadline, &cancel).await {
                return run.finish(status);
            }
        }
    }

    /// Fetches one batch, returning early if the run must stop. Every
    /// document that completes before then is recorded.
    async fn fetch_batch(
        &self,
        run: &mut Run,
        documents: Vec<Iri>,
        deadline: Option<Instant>,
        cancel: &CancellationToken,
    ) -> Option<Status> {
        let mut batch = stream::iter(documents)
            .map(|document| self.load(document))
            .buffer_unordered(self.config.concurrency.max(1));

        let expired = async {
            match deadline {
                Some(deadline) => sleep_until(deadline).await,
                None => std::future::pending().await,
            }
        };
        tokio::pin!(expired);

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!("Resolution cancelled");
                    return Some(Status::Cancelled);
                }
                _ = &mut expired => {
                    warn!("Resolution deadline reached with fetches in flight");
                    return Some(Status::BudgetExhausted);
                }
                next = batch.next() => match next {
                    Some((document, result)) => self.record(run, document, result),
                    None => return None,
                },
            }
        }
    }

    async fn load(&self, document: Iri) -> (Iri, Result<Vec<Triple>, FetchError>) {
        let fetched = timeout(
            self.config.fetch_timeout,
            fetch_document(&self.fetcher, &document),
        )
        .await;
        let result = match fetched {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout {
                uri: document.clone(),
            }),
        };
        (document, result)
    }

    fn record(&self, run: &mut Run, document: Iri, result: Result<Vec<Triple>, FetchError>) {
        let outcome = match result {
            Ok(triples) => {
                let count = triples.len();
                run.store.extend_graph(&document, triples);
                Outcome::Loaded { triples: count }
            }
            Err(error) => {
                warn!(
                    document = %document,
                    kind = error.kind(),
                    transient = error.is_transient(),
                    "Document contributed no facts: {error}"
                );
                Outcome::Failed { error }
            }
        };
        self.observer.observe(&document, &outcome);
        run.outcomes.insert(document, outcome);
    }
}
