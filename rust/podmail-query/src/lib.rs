//! Follow-your-nose query resolution.
//!
//! A [`Plan`] describes which links to follow out of a person's profile and
//! which facts to collect along the way. The [`Resolver`] evaluates the plan,
//! fetches every newly discovered document, and repeats until no new
//! documents turn up.
//!
//! ```no_run
//! use podmail_query::{Bindings, Plan, Resolver, Variable};
//! use podmail_rdf::Term;
//! use podmail_remote::{FetcherConfig, HttpFetcher};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let plan = Plan::from_json(r#"[
//!     {"type": "match", "subject": "?person", "predicate": "http://www.w3.org/2000/01/rdf-schema#seeAlso", "pick": "object", "target": "?extended"},
//!     {"type": "add resources", "variable": "?extended"}
//! ]"#)?;
//! let seed = Bindings::new().bind(Variable::new("person")?, Term::iri("https://alice.example/card#me"));
//!
//! let resolution = Resolver::new(HttpFetcher::new(FetcherConfig::new())?)
//!     .resolve(&plan, seed)
//!     .await;
//! assert!(resolution.is_converged());
//! # Ok(())
//! # }
//! ```
#![warn(missing_docs)]

mod error;
pub use error::*;

mod variable;
pub use variable::*;

mod bindings;
pub use bindings::*;

mod plan;
pub use plan::*;

mod resolver;
pub use resolver::*;

pub use tokio_util::sync::CancellationToken;
