//! Incremental construction of [`Automaton`] values.
//!
//! The builder is the only way to create an automaton. It validates that
//! every transition and final state refers to a declared state, so a built
//! automaton never holds a dangling reference. Duplicate declarations are
//! logged and tolerated.

use super::{Acceptance, Automaton, AutomatonState, TransitionTable};
use crate::error::AutomatonError;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Debug;
use tracing::{debug, trace, warn};

/// Consuming builder for [`Automaton`].
#[derive(Debug, Clone)]
pub struct AutomatonBuilder<S, D = ()> {
    states: BTreeMap<String, AutomatonState<D>>,
    transitions: TransitionTable<S>,
    acceptance: Acceptance,
    optimize: bool,
}

impl<S: Clone + Ord + Debug, D: Clone> AutomatonBuilder<S, D> {
    /// Builder for an automaton with a single final state set.
    pub fn buchi() -> Self {
        Self::with_acceptance(Acceptance::Buchi(BTreeSet::new()))
    }

    /// Builder for an automaton with a family of final state sets.
    pub fn generalized() -> Self {
        Self::with_acceptance(Acceptance::Generalized(Vec::new()))
    }

    fn with_acceptance(acceptance: Acceptance) -> Self {
        Self {
            states: BTreeMap::new(),
            transitions: BTreeMap::new(),
            acceptance,
            optimize: false,
        }
    }

    /// Merge joinable states when building.
    pub fn with_optimization(mut self, enabled: bool) -> Self {
        self.optimize = enabled;
        self
    }

    pub fn with_state(self, label: impl Into<String>, initial: bool) -> Self {
        self.with_state_data(label, initial, None)
    }

    /// Declare a state with a payload. Redeclaring a label replaces it.
    pub fn with_state_data(mut self, label: impl Into<String>, initial: bool, data: Option<D>) -> Self {
        let label = label.into();
        if self.states.contains_key(&label) {
            warn!(state = %label, "Duplicate state declaration, overwriting");
        }
        self.states
            .insert(label.clone(), AutomatonState::new(label, initial, data));
        self
    }

    /// Declare copies of existing states, keeping labels, flags and payloads.
    pub fn with_states_from<'a>(mut self, states: impl IntoIterator<Item = &'a AutomatonState<D>>) -> Self
    where
        D: 'a,
    {
        for state in states {
            self = self.with_state_data(state.label(), state.is_initial(), state.data().cloned());
        }
        self
    }

    pub fn has_state(&self, label: &str) -> bool {
        self.states.contains_key(label)
    }

    /// Add `symbols` to the transition from `from` to `to`.
    ///
    /// Repeated calls for the same pair union their symbols.
    pub fn with_transition<I>(mut self, from: &str, to: &str, symbols: I) -> Result<Self, AutomatonError>
    where
        I: IntoIterator<Item = S>,
    {
        self.require_state(from)?;
        self.require_state(to)?;

        let symbols: BTreeSet<S> = symbols.into_iter().collect();
        if symbols.is_empty() {
            return Err(AutomatonError::EmptyTransition {
                from: from.to_string(),
                to: to.to_string(),
            });
        }

        let existing = self
            .transitions
            .entry(from.to_string())
            .or_default()
            .entry(to.to_string())
            .or_default();
        if !existing.is_empty() {
            debug!(from, to, added = ?symbols, "Extending existing transition");
        }
        existing.extend(symbols);
        Ok(self)
    }

    /// Mark a state final.
    ///
    /// On a generalized builder this adds the singleton set `{label}` to the
    /// family.
    pub fn with_final_state(mut self, label: &str) -> Result<Self, AutomatonError> {
        self.require_state(label)?;
        match &mut self.acceptance {
            Acceptance::Buchi(set) => {
                if !set.insert(label.to_string()) {
                    warn!(state = label, "Duplicate final state declaration");
                }
            }
            Acceptance::Generalized(family) => {
                push_family_member(family, BTreeSet::from([label.to_string()]));
            }
        }
        Ok(self)
    }

    /// Add a set of final states.
    ///
    /// On a Büchi builder the labels join the final set; on a generalized
    /// builder the set becomes one member of the family.
    pub fn with_final_state_set<I, L>(mut self, labels: I) -> Result<Self, AutomatonError>
    where
        I: IntoIterator<Item = L>,
        L: Into<String>,
    {
        let labels: BTreeSet<String> = labels.into_iter().map(Into::into).collect();
        let missing: Vec<String> = labels
            .iter()
            .filter(|label| !self.states.contains_key(label.as_str()))
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(AutomatonError::InvalidFinalStateSet { missing });
        }

        match &mut self.acceptance {
            Acceptance::Buchi(set) => set.extend(labels),
            Acceptance::Generalized(family) => push_family_member(family, labels),
        }
        Ok(self)
    }

    /// Freeze the builder into an automaton.
    pub fn build(mut self) -> Automaton<S, D> {
        if self.optimize {
            self.merge_joinable_states();
        }
        Automaton {
            states: self.states,
            transitions: self.transitions,
            acceptance: self.acceptance,
        }
    }

    fn require_state(&self, label: &str) -> Result<(), AutomatonError> {
        if self.states.contains_key(label) {
            Ok(())
        } else {
            Err(AutomatonError::UnknownState {
                label: label.to_string(),
            })
        }
    }

    /// Merge joinable pairs until none remain.
    fn merge_joinable_states(&mut self) {
        let before = self.states.len();
        while let Some((keep, remove)) = self.find_joinable_pair() {
            trace!(keep = %keep, remove = %remove, "Merging joinable states");
            self.merge(&keep, &remove);
        }
        debug!(before, after = self.states.len(), "State merge pass finished");
    }

    fn find_joinable_pair(&self) -> Option<(String, String)> {
        let labels: Vec<&String> = self.states.keys().collect();
        for (i, first) in labels.iter().enumerate() {
            for second in &labels[i + 1..] {
                if self.joinable(first, second) {
                    return Some(((*first).clone(), (*second).clone()));
                }
            }
        }
        None
    }

    /// Same initial flag, same outgoing row and same acceptance membership.
    fn joinable(&self, first: &str, second: &str) -> bool {
        let (Some(a), Some(b)) = (self.states.get(first), self.states.get(second)) else {
            return false;
        };
        a.is_initial() == b.is_initial()
            && self.transitions.get(first) == self.transitions.get(second)
            && self
                .acceptance
                .sets()
                .iter()
                .all(|set| set.contains(first) == set.contains(second))
    }

    fn merge(&mut self, keep: &str, remove: &str) {
        self.transitions.remove(remove);
        for row in self.transitions.values_mut() {
            if let Some(symbols) = row.remove(remove) {
                row.entry(keep.to_string()).or_default().extend(symbols);
            }
        }
        self.states.remove(remove);
        self.acceptance.remove_state(remove);
    }
}

fn push_family_member(family: &mut Vec<BTreeSet<String>>, set: BTreeSet<String>) {
    if family.contains(&set) {
        warn!(states = ?set, "Duplicate final state set, ignoring");
    } else {
        family.push(set);
    }
}

impl<S: Clone, D: Clone> From<&Automaton<S, D>> for AutomatonBuilder<S, D> {
    fn from(automaton: &Automaton<S, D>) -> Self {
        Self {
            states: automaton.states.clone(),
            transitions: automaton.transitions.clone(),
            acceptance: automaton.acceptance.clone(),
            optimize: false,
        }
    }
}
