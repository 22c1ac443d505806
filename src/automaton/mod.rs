//! Automata over infinite words.
//!
//! One [`Automaton`] type covers both acceptance flavors used by the
//! pipeline: plain Büchi acceptance (one final state set) and generalized
//! Büchi acceptance (a family of final state sets, each visited infinitely
//! often). Automata are immutable and only produced by [`AutomatonBuilder`].
//!
//! States are identified by string labels. The symbol type `S` is generic;
//! the pipeline uses [`Letter`]. Each state may carry a payload of type `D`.

pub mod builder;
pub mod letter;

pub use builder::AutomatonBuilder;
pub use letter::Letter;

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// A state of an [`Automaton`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AutomatonState<D = ()> {
    label: String,
    initial: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<D>,
}

impl<D> AutomatonState<D> {
    pub fn new(label: impl Into<String>, initial: bool, data: Option<D>) -> Self {
        Self {
            label: label.into(),
            initial,
            data,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_initial(&self) -> bool {
        self.initial
    }

    pub fn data(&self) -> Option<&D> {
        self.data.as_ref()
    }
}

/// Acceptance condition of an [`Automaton`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum Acceptance {
    /// Accept runs visiting the set infinitely often.
    Buchi(BTreeSet<String>),
    /// Accept runs visiting every member of the family infinitely often.
    Generalized(Vec<BTreeSet<String>>),
}

impl Acceptance {
    /// The final state sets, one for Büchi acceptance.
    pub fn sets(&self) -> &[BTreeSet<String>] {
        match self {
            Acceptance::Buchi(set) => std::slice::from_ref(set),
            Acceptance::Generalized(family) => family,
        }
    }

    pub fn is_generalized(&self) -> bool {
        matches!(self, Acceptance::Generalized(_))
    }

    fn remove_state(&mut self, label: &str) {
        match self {
            Acceptance::Buchi(set) => {
                set.remove(label);
            }
            Acceptance::Generalized(family) => {
                for set in family {
                    set.remove(label);
                }
            }
        }
    }
}

pub(crate) type TransitionTable<S> = BTreeMap<String, BTreeMap<String, BTreeSet<S>>>;

/// Immutable automaton with symbols `S` and state payloads `D`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Automaton<S, D = ()> {
    states: BTreeMap<String, AutomatonState<D>>,
    transitions: TransitionTable<S>,
    acceptance: Acceptance,
}

impl<S, D> Automaton<S, D> {
    pub fn states(&self) -> impl Iterator<Item = &AutomatonState<D>> {
        self.states.values()
    }

    pub fn state(&self, label: &str) -> Option<&AutomatonState<D>> {
        self.states.get(label)
    }

    pub fn has_state(&self, label: &str) -> bool {
        self.states.contains_key(label)
    }

    pub fn initial_states(&self) -> impl Iterator<Item = &AutomatonState<D>> {
        self.states.values().filter(|state| state.is_initial())
    }

    /// All transitions as `(from, to, symbols)`.
    pub fn transitions(&self) -> impl Iterator<Item = (&str, &str, &BTreeSet<S>)> {
        self.transitions.iter().flat_map(|(from, row)| {
            row.iter()
                .map(move |(to, symbols)| (from.as_str(), to.as_str(), symbols))
        })
    }

    /// Outgoing transitions of `from` as `(to, symbols)`.
    pub fn transitions_from(&self, from: &str) -> impl Iterator<Item = (&str, &BTreeSet<S>)> + '_ {
        self.transitions
            .get(from)
            .into_iter()
            .flat_map(|row| row.iter().map(|(to, symbols)| (to.as_str(), symbols)))
    }

    /// Incoming transitions of `to` as `(from, symbols)`.
    pub fn transitions_to<'a>(&'a self, to: &'a str) -> impl Iterator<Item = (&'a str, &'a BTreeSet<S>)> + 'a {
        self.transitions
            .iter()
            .filter_map(move |(from, row)| row.get(to).map(|symbols| (from.as_str(), symbols)))
    }

    pub fn transition_symbols(&self, from: &str, to: &str) -> Option<&BTreeSet<S>> {
        self.transitions.get(from).and_then(|row| row.get(to))
    }

    pub fn has_transition(&self, from: &str, to: &str) -> bool {
        self.transition_symbols(from, to).is_some()
    }

    /// Number of `(from, to)` pairs with at least one symbol.
    pub fn transition_count(&self) -> usize {
        self.transitions.values().map(BTreeMap::len).sum()
    }

    pub fn acceptance(&self) -> &Acceptance {
        &self.acceptance
    }

    /// The final state set, for Büchi acceptance only.
    pub fn final_states(&self) -> Option<&BTreeSet<String>> {
        match &self.acceptance {
            Acceptance::Buchi(set) => Some(set),
            Acceptance::Generalized(_) => None,
        }
    }

    pub fn final_state_sets(&self) -> &[BTreeSet<String>] {
        self.acceptance.sets()
    }

    /// Number of states.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

impl<S: Clone + Ord + std::fmt::Debug, D: Clone> Automaton<S, D> {
    /// A builder preloaded with this automaton's states, transitions and
    /// acceptance.
    pub fn to_builder(&self) -> AutomatonBuilder<S, D> {
        AutomatonBuilder::from(self)
    }

    /// Copy with joinable states merged.
    pub fn optimized(&self) -> Self {
        self.to_builder().with_optimization(true).build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Automaton<char> {
        AutomatonBuilder::buchi()
            .with_state("p", true)
            .with_state("q", false)
            .with_transition("p", "q", ['a'])
            .unwrap()
            .with_transition("q", "q", ['a', 'b'])
            .unwrap()
            .with_transition("q", "p", ['c'])
            .unwrap()
            .with_final_state("q")
            .unwrap()
            .build()
    }

    #[test]
    fn read_api() {
        let automaton = sample();
        assert_eq!(automaton.len(), 2);
        assert!(!automaton.is_empty());
        assert_eq!(
            automaton.initial_states().map(|s| s.label()).collect::<Vec<_>>(),
            vec!["p"]
        );
        assert_eq!(automaton.transition_count(), 3);
        assert!(automaton.has_transition("q", "p"));
        assert!(!automaton.has_transition("p", "p"));
        assert_eq!(
            automaton.transition_symbols("q", "q"),
            Some(&BTreeSet::from(['a', 'b']))
        );
        assert_eq!(
            automaton.transitions_to("q").map(|(from, _)| from).collect::<Vec<_>>(),
            vec!["p", "q"]
        );
        assert_eq!(automaton.final_states(), Some(&BTreeSet::from(["q".to_string()])));
        assert!(!automaton.acceptance().is_generalized());
    }

    #[test]
    fn generalized_has_no_single_final_set() {
        let automaton: Automaton<char> = AutomatonBuilder::generalized()
            .with_state("p", true)
            .with_final_state("p")
            .unwrap()
            .build();
        assert!(automaton.final_states().is_none());
        assert_eq!(automaton.final_state_sets().len(), 1);
    }

    #[test]
    fn serializes_structure() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["states"]["p"]["initial"], serde_json::json!(true));
        assert_eq!(json["transitions"]["q"]["q"], serde_json::json!(["a", "b"]));
        assert_eq!(json["acceptance"]["buchi"], serde_json::json!(["q"]));
    }
}
