use indexmap::{IndexMap, IndexSet};
use podmail_rdf::Term;

use crate::Variable;

/// Variable binding table of a resolution run.
///
/// Every variable maps to a deduplicated set of terms. A variable that was
/// never bound behaves exactly like one bound to the empty set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bindings {
    values: IndexMap<Variable, IndexSet<Term>>,
}

impl Bindings {
    /// An empty binding table
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `term` to the values of `variable`
    pub fn bind(mut self, variable: Variable, term: impl Into<Term>) -> Self {
        self.insert(variable, term);
        self
    }

    /// Adds `term` to the values of `variable`, returning true if it was not
    /// bound already
    pub fn insert(&mut self, variable: Variable, term: impl Into<Term>) -> bool {
        self.values.entry(variable).or_default().insert(term.into())
    }

    /// Replaces the values of `variable`
    pub fn set(&mut self, variable: Variable, terms: IndexSet<Term>) {
        self.values.insert(variable, terms);
    }

    /// The values bound to `variable`, if any
    pub fn get(&self, variable: &Variable) -> Option<&IndexSet<Term>> {
        self.values.get(variable)
    }

    /// Iterates the values bound to `variable`
    pub fn values<'a>(&'a self, variable: &Variable) -> impl Iterator<Item = &'a Term> + use<'a> {
        self.values.get(variable).into_iter().flatten()
    }

    /// Returns true if `variable` has at least one value
    pub fn is_bound(&self, variable: &Variable) -> bool {
        self.values
            .get(variable)
            .is_some_and(|terms| !terms.is_empty())
    }

    /// Iterates all variables together with their values
    pub fn iter(&self) -> impl Iterator<Item = (&Variable, &IndexSet<Term>)> {
        self.values.iter()
    }
}

impl FromIterator<(Variable, Term)> for Bindings {
    fn from_iter<T: IntoIterator<Item = (Variable, Term)>>(iter: T) -> Self {
        let mut bindings = Bindings::new();
        for (variable, term) in iter {
            bindings.insert(variable, term);
        }
        bindings
    }
}
