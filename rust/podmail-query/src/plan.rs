//! Query plans
//!
//! A [`Plan`] is an ordered list of [`Step`]s. Plans are data: they can be
//! built in code or loaded from JSON, where a step looks like
//!
//! ```json
//! { "type": "match", "subject": "?person", "predicate": "http://www.w3.org/2000/01/rdf-schema#seeAlso", "pick": "object", "target": "?extended" }
//! { "type": "add resources", "variable": "?extended" }
//! ```
//!
//! Strings starting with `?` are variables, any other string is an IRI
//! constant, and an omitted slot matches anything. Literal and blank node
//! constants have no JSON form, so plans holding them cannot be saved.

use indexmap::IndexSet;
use podmail_rdf::{Iri, Pattern, Store, Term};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{Bindings, QueryError, QueryResult, Variable};

/// One position of a [`Match`] step
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Slot {
    /// Matches any term
    #[default]
    Any,
    /// Matches exactly this term
    Constant(Term),
    /// Matches any of the terms currently bound to the variable. An unbound
    /// variable matches nothing.
    Variable(Variable),
}

impl Slot {
    /// Returns true for [`Slot::Any`]
    pub fn is_any(&self) -> bool {
        matches!(self, Slot::Any)
    }

    fn parse(value: &str) -> QueryResult<Self> {
        if value.starts_with('?') {
            Ok(Slot::Variable(Variable::new(value)?))
        } else {
            let iri = Iri::new(value).map_err(|error| QueryError::InvalidConstant {
                value: value.to_string(),
                reason: error.to_string(),
            })?;
            Ok(Slot::Constant(Term::Iri(iri)))
        }
    }

    fn candidates(&self, bindings: &Bindings) -> Option<IndexSet<Term>> {
        match self {
            Slot::Any => None,
            Slot::Constant(term) => Some(IndexSet::from([term.clone()])),
            Slot::Variable(variable) => Some(bindings.values(variable).cloned().collect()),
        }
    }
}

impl From<Variable> for Slot {
    fn from(variable: Variable) -> Self {
        Slot::Variable(variable)
    }
}

impl From<Term> for Slot {
    fn from(term: Term) -> Self {
        Slot::Constant(term)
    }
}

impl From<Iri> for Slot {
    fn from(iri: Iri) -> Self {
        Slot::Constant(Term::Iri(iri))
    }
}

impl Serialize for Slot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Slot::Any => serializer.serialize_none(),
            Slot::Constant(Term::Iri(iri)) => serializer.serialize_str(iri.as_str()),
            Slot::Constant(term) => Err(serde::ser::Error::custom(format!(
                "constant {term} is not an IRI and cannot be written to a plan"
            ))),
            Slot::Variable(variable) => serializer.serialize_str(&variable.to_string()),
        }
    }
}

impl<'de> Deserialize<'de> for Slot {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(Slot::Any),
            Some(value) => Slot::parse(&value).map_err(serde::de::Error::custom),
        }
    }
}

/// Which side of a matched quad populates the target variable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pick {
    /// The subject
    Subject,
    /// The object
    Object,
}

/// Binds `target` to the picked side of every quad in the store that matches
/// the step's slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    /// Subject slot
    #[serde(default, skip_serializing_if = "Slot::is_any")]
    pub subject: Slot,
    /// Predicate, always fixed
    pub predicate: Iri,
    /// Object slot
    #[serde(default, skip_serializing_if = "Slot::is_any")]
    pub object: Slot,
    /// Restricts matching to quads asserted by the documents bound to this
    /// variable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graph: Option<Variable>,
    /// Side of the matched quads to collect
    pub pick: Pick,
    /// Variable receiving the collected terms
    pub target: Variable,
}

impl Match {
    /// A step matching `predicate` that collects objects into `target`
    pub fn objects(predicate: Iri, target: Variable) -> Self {
        Self {
            subject: Slot::Any,
            predicate,
            object: Slot::Any,
            graph: None,
            pick: Pick::Object,
            target,
        }
    }

    /// A step matching `predicate` that collects subjects into `target`
    pub fn subjects(predicate: Iri, target: Variable) -> Self {
        Self {
            pick: Pick::Subject,
            ..Self::objects(predicate, target)
        }
    }

    /// Sets the subject slot
    pub fn with_subject(mut self, subject: impl Into<Slot>) -> Self {
        self.subject = subject.into();
        self
    }

    /// Sets the object slot
    pub fn with_object(mut self, object: impl Into<Slot>) -> Self {
        self.object = object.into();
        self
    }

    /// Restricts the step to quads asserted by the documents in `graph`
    pub fn in_graph(mut self, graph: Variable) -> Self {
        self.graph = Some(graph);
        self
    }

    /// Evaluates the step, returning the fresh value set of the target
    pub fn evaluate(&self, store: &Store, bindings: &Bindings) -> IndexSet<Term> {
        let mut pattern = Pattern::new().predicate(self.predicate.clone());

        if let Some(subjects) = self.subject.candidates(bindings) {
            pattern = pattern.subject_in(subjects);
        }
        if let Some(objects) = self.object.candidates(bindings) {
            pattern = pattern.object_in(objects);
        }
        if let Some(graph) = &self.graph {
            pattern = pattern.graph_in(
                bindings
                    .values(graph)
                    .filter_map(Term::as_iri)
                    .map(Iri::document),
            );
        }

        store
            .select(&pattern)
            .map(|quad| match self.pick {
                Pick::Subject => quad.subject.clone(),
                Pick::Object => quad.object.clone(),
            })
            .collect()
    }
}

/// A single instruction of a [`Plan`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Step {
    /// Pattern match against the store
    #[serde(rename = "match")]
    Match(Match),

    /// Marks the current values of `variable` as documents to fetch
    #[serde(rename = "add resources")]
    AddResources {
        /// Variable holding the resources
        variable: Variable,
    },
}

impl From<Match> for Step {
    fn from(step: Match) -> Self {
        Step::Match(step)
    }
}

/// An ordered list of steps evaluated top to bottom on every pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Plan {
    steps: Vec<Step>,
}

impl Plan {
    /// An empty plan
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a step
    pub fn step(mut self, step: impl Into<Step>) -> Self {
        self.steps.push(step.into());
        self
    }

    /// Appends an [`Step::AddResources`] step
    pub fn add_resources(self, variable: Variable) -> Self {
        self.step(Step::AddResources { variable })
    }

    /// The steps in evaluation order
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Loads a plan from its JSON form
    pub fn from_json(json: &str) -> QueryResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serializes the plan to JSON
    pub fn to_json(&self) -> QueryResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl FromIterator<Step> for Plan {
    fn from_iter<T: IntoIterator<Item = Step>>(iter: T) -> Self {
        Self {
            steps: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use podmail_rdf::{Triple, vocab};
    use pretty_assertions::assert_eq;
    use testresult::TestResult;

    fn var(name: &str) -> Variable {
        Variable::new(name).expect("valid variable")
    }

    #[test]
    fn it_refuses_to_save_literal_constants() -> TestResult {
        let plan = Plan::new().step(
            Match::subjects(Iri::new(vocab::rdfs::SEE_ALSO)?, var("person"))
                .with_object(Term::literal("https://alice.example/card#me")),
        );

        assert!(matches!(
            plan.to_json(),
            Err(QueryError::Serialization { .. })
        ));

        let saved = Plan::new()
            .step(
                Match::subjects(Iri::new(vocab::rdfs::SEE_ALSO)?, var("person"))
                    .with_object(Iri::new("https://alice.example/card#me")?),
            )
            .to_json()?;
        assert_eq!(
            Plan::from_json(&saved)?.steps()[0],
            Step::Match(
                Match::subjects(Iri::new(vocab::rdfs::SEE_ALSO)?, var("person"))
                    .with_object(Term::iri("https://alice.example/card#me")),
            )
        );
        Ok(())
    }

    #[test]
    fn it_loads_plans_from_json() -> TestResult {
        let plan = Plan::from_json(
            r#"[
                {"type": "match", "subject": "?person", "predicate": "http://www.w3.org/2000/01/rdf-schema#seeAlso", "pick": "object", "target": "?extended"},
                {"type": "add resources", "variable": "?extended"},
                {"type": "match", "predicate": "http://www.w3.org/1999/02/22-rdf-syntax-ns#type", "object": "http://www.w3.org/ns/solid/terms#TypeRegistration", "graph": "?index", "pick": "subject", "target": "?registration"}
            ]"#,
        )?;

        let expected = Plan::new()
            .step(
                Match::objects(Iri::new_unchecked(vocab::rdfs::SEE_ALSO), var("extended"))
                    .with_subject(var("person")),
            )
            .add_resources(var("extended"))
            .step(
                Match::subjects(Iri::new_unchecked(vocab::rdf::TYPE), var("registration"))
                    .with_object(Iri::new_unchecked(vocab::solid::TYPE_REGISTRATION))
                    .in_graph(var("index")),
            );

        assert_eq!(plan, expected);
        assert_eq!(Plan::from_json(&plan.to_json()?)?, plan);
        Ok(())
    }

    #[test]
    fn it_rejects_unknown_step_kinds() {
        let result = Plan::from_json(r#"[{"type": "fetch everything"}]"#);
        assert!(matches!(result, Err(QueryError::Serialization { .. })));
    }

    #[test]
    fn it_rejects_relative_constants() {
        let result = Plan::from_json(
            r#"[{"type": "match", "predicate": "http://x.example/p", "object": "not an iri", "pick": "subject", "target": "?s"}]"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn it_restricts_matches_to_bound_graphs() -> TestResult {
        let predicate = Iri::new("https://vocab.example/p")?;
        let trusted = Iri::new("https://a.example/index")?;
        let other = Iri::new("https://b.example/doc")?;

        let mut store = Store::new();
        store.extend_graph(
            &trusted,
            [Triple::new(Term::iri("https://a.example/index#r"), predicate.clone(), Term::iri("https://a.example/x"))],
        );
        store.extend_graph(
            &other,
            [Triple::new(Term::iri("https://a.example/index#r"), predicate.clone(), Term::iri("https://a.example/y"))],
        );

        let bindings = Bindings::new().bind(var("index"), Term::iri("https://a.example/index#this"));
        let step = Match::objects(predicate, var("out")).in_graph(var("index"));

        assert_eq!(
            step.evaluate(&store, &bindings),
            IndexSet::from([Term::iri("https://a.example/x")])
        );
        Ok(())
    }

    #[test]
    fn it_matches_nothing_through_unbound_variables() -> TestResult {
        let predicate = Iri::new("https://vocab.example/p")?;
        let mut store = Store::new();
        store.extend_graph(
            &Iri::new("https://a.example/doc")?,
            [Triple::new(Term::iri("https://a.example/s"), predicate.clone(), Term::literal("o"))],
        );

        let step = Match::objects(predicate.clone(), var("out")).with_subject(var("missing"));
        assert!(step.evaluate(&store, &Bindings::new()).is_empty());

        let open = Match::objects(predicate, var("out"));
        assert_eq!(open.evaluate(&store, &Bindings::new()).len(), 1);
        Ok(())
    }
}
