use std::hash::Hash;

use indexmap::IndexSet;

use crate::{Iri, Quad, Term, Triple};

/// Restriction placed on a single position of a [`Pattern`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint<T: Eq + Hash> {
    /// Any value is admitted
    Any,
    /// Only the given value is admitted
    Is(T),
    /// Only members of the given set are admitted. An empty set admits nothing.
    OneOf(IndexSet<T>),
}

impl<T: Eq + Hash> Default for Constraint<T> {
    fn default() -> Self {
        Constraint::Any
    }
}

impl<T: Eq + Hash> Constraint<T> {
    /// Returns true if the value satisfies the constraint
    pub fn admits(&self, value: &T) -> bool {
        match self {
            Constraint::Any => true,
            Constraint::Is(expected) => expected == value,
            Constraint::OneOf(candidates) => candidates.contains(value),
        }
    }

    /// Returns true if no value can satisfy the constraint
    pub fn is_unsatisfiable(&self) -> bool {
        matches!(self, Constraint::OneOf(candidates) if candidates.is_empty())
    }
}

/// A quad pattern used to select from a [`Store`]
///
/// ```
/// use podmail_rdf::{Iri, Pattern, Term};
///
/// let pattern = Pattern::new()
///     .subject(Term::iri("https://alice.example/card#me"))
///     .predicate(Iri::new_unchecked("http://www.w3.org/2000/01/rdf-schema#seeAlso"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Pattern {
    /// Constraint on the subject
    pub subject: Constraint<Term>,
    /// Constraint on the predicate
    pub predicate: Constraint<Iri>,
    /// Constraint on the object
    pub object: Constraint<Term>,
    /// Constraint on the asserting document
    pub graph: Constraint<Iri>,
}

impl Pattern {
    /// A pattern matching every quad
    pub fn new() -> Self {
        Self::default()
    }

    /// Requires the subject to equal `subject`
    pub fn subject(mut self, subject: Term) -> Self {
        self.subject = Constraint::Is(subject);
        self
    }

    /// Requires the subject to be one of `subjects`
    pub fn subject_in(mut self, subjects: impl IntoIterator<Item = Term>) -> Self {
        self.subject = Constraint::OneOf(subjects.into_iter().collect());
        self
    }

    /// Requires the predicate to equal `predicate`
    pub fn predicate(mut self, predicate: Iri) -> Self {
        self.predicate = Constraint::Is(predicate);
        self
    }

    /// Requires the object to equal `object`
    pub fn object(mut self, object: Term) -> Self {
        self.object = Constraint::Is(object);
        self
    }

    /// Requires the object to be one of `objects`
    pub fn object_in(mut self, objects: impl IntoIterator<Item = Term>) -> Self {
        self.object = Constraint::OneOf(objects.into_iter().collect());
        self
    }

    /// Requires the quad to be asserted by one of `graphs`
    pub fn graph_in(mut self, graphs: impl IntoIterator<Item = Iri>) -> Self {
        self.graph = Constraint::OneOf(graphs.into_iter().collect());
        self
    }

    /// Returns true if the quad satisfies every constraint of the pattern
    pub fn matches(&self, quad: &Quad) -> bool {
        self.predicate.admits(&quad.predicate)
            && self.subject.admits(&quad.subject)
            && self.object.admits(&quad.object)
            && self.graph.admits(&quad.graph)
    }

    /// Returns true if the triple satisfies the pattern, ignoring the graph
    /// constraint. Used when matching a single document on its own.
    pub fn matches_triple(&self, triple: &Triple) -> bool {
        self.predicate.admits(&triple.predicate)
            && self.subject.admits(&triple.subject)
            && self.object.admits(&triple.object)
    }

    fn is_unsatisfiable(&self) -> bool {
        self.subject.is_unsatisfiable()
            || self.predicate.is_unsatisfiable()
            || self.object.is_unsatisfiable()
            || self.graph.is_unsatisfiable()
    }
}

/// Append-only set of quads accumulated during one resolution run.
///
/// Duplicate quads collapse. Equality between stores is set equality and does
/// not depend on the order quads were inserted in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Store {
    quads: IndexSet<Quad>,
}

impl Store {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct quads in the store
    pub fn len(&self) -> usize {
        self.quads.len()
    }

    /// Returns true if the store holds no quads
    pub fn is_empty(&self) -> bool {
        self.quads.is_empty()
    }

    /// Inserts a quad, returning false if it was already present
    pub fn insert(&mut self, quad: Quad) -> bool {
        self.quads.insert(quad)
    }

    /// Adds every triple of a document, tagged with the document IRI.
    /// Returns the number of quads that were not already present.
    pub fn extend_graph(&mut self, graph: &Iri, triples: impl IntoIterator<Item = Triple>) -> usize {
        triples
            .into_iter()
            .map(|triple| self.quads.insert(triple.in_graph(graph.clone())))
            .filter(|inserted| *inserted)
            .count()
    }

    /// Iterates over every quad in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Quad> {
        self.quads.iter()
    }

    /// Iterates over the quads matching `pattern`
    pub fn select<'a>(&'a self, pattern: &'a Pattern) -> impl Iterator<Item = &'a Quad> + 'a {
        let unsatisfiable = pattern.is_unsatisfiable();
        self.quads
            .iter()
            .filter(move |quad| !unsatisfiable && pattern.matches(quad))
    }

    /// Objects of every statement `<subject> <predicate> ?object`, in any document
    pub fn objects(&self, subject: &Term, predicate: &Iri) -> IndexSet<Term> {
        let pattern = Pattern::new()
            .subject(subject.clone())
            .predicate(predicate.clone());
        self.select(&pattern)
            .map(|quad| quad.object.clone())
            .collect()
    }

    /// Distinct documents that contributed at least one quad
    pub fn graphs(&self) -> IndexSet<Iri> {
        self.quads.iter().map(|quad| quad.graph.clone()).collect()
    }
}

impl Extend<Quad> for Store {
    fn extend<I: IntoIterator<Item = Quad>>(&mut self, iter: I) {
        self.quads.extend(iter)
    }
}

impl FromIterator<Quad> for Store {
    fn from_iter<I: IntoIterator<Item = Quad>>(iter: I) -> Self {
        Self {
            quads: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocab;
    use pretty_assertions::assert_eq;

    fn iri(value: &str) -> Iri {
        Iri::new_unchecked(value)
    }

    fn sample() -> Store {
        let alice = Term::iri("https://alice.example/card#me");
        let mut store = Store::new();
        store.extend_graph(
            &iri("https://alice.example/card"),
            [
                Triple::new(
                    alice.clone(),
                    iri(vocab::rdfs::SEE_ALSO),
                    Term::iri("https://alice.example/extra"),
                ),
                Triple::new(
                    alice.clone(),
                    iri(vocab::rdf::TYPE),
                    Term::iri("http://xmlns.com/foaf/0.1/Person"),
                ),
            ],
        );
        store.extend_graph(
            &iri("https://mallory.example/doc"),
            [Triple::new(
                alice,
                iri(vocab::rdfs::SEE_ALSO),
                Term::iri("https://mallory.example/trap"),
            )],
        );
        store
    }

    #[test]
    fn it_collapses_duplicate_quads() {
        let mut store = sample();
        let before = store.len();
        let added = store.extend_graph(
            &iri("https://alice.example/card"),
            [Triple::new(
                Term::iri("https://alice.example/card#me"),
                iri(vocab::rdfs::SEE_ALSO),
                Term::iri("https://alice.example/extra"),
            )],
        );

        assert_eq!(added, 0);
        assert_eq!(store.len(), before);
    }

    #[test]
    fn it_keeps_same_triple_from_different_documents() {
        let mut store = Store::new();
        let triple = Triple::new(
            Term::iri("https://a.example/s"),
            iri("https://a.example/p"),
            Term::literal("o"),
        );
        store.extend_graph(&iri("https://a.example/one"), [triple.clone()]);
        store.extend_graph(&iri("https://a.example/two"), [triple]);

        assert_eq!(store.len(), 2);
        assert_eq!(store.graphs().len(), 2);
    }

    #[test]
    fn it_restricts_selection_to_graph() {
        let store = sample();
        let pattern = Pattern::new()
            .predicate(iri(vocab::rdfs::SEE_ALSO))
            .graph_in([iri("https://alice.example/card")]);

        let objects: Vec<_> = store.select(&pattern).map(|q| q.object.clone()).collect();
        assert_eq!(objects, vec![Term::iri("https://alice.example/extra")]);
    }

    #[test]
    fn it_selects_nothing_for_empty_candidate_sets() {
        let store = sample();
        let pattern = Pattern::new().subject_in(Vec::<Term>::new());
        assert_eq!(store.select(&pattern).count(), 0);
    }

    #[test]
    fn it_finds_objects_across_documents() {
        let store = sample();
        let objects = store.objects(
            &Term::iri("https://alice.example/card#me"),
            &iri(vocab::rdfs::SEE_ALSO),
        );
        assert_eq!(objects.len(), 2);
    }

    #[test]
    fn it_compares_stores_as_sets() {
        let quads: Vec<Quad> = sample().iter().cloned().collect();
        let reversed: Store = quads.iter().rev().cloned().collect();
        assert_eq!(reversed, sample());
    }
}
