//! Conversion between generalized and plain Büchi acceptance.
//!
//! [`degeneralize`] uses the counting construction: with `k` acceptance
//! sets every state `s` is copied into `(s, 0) .. (s, k-1)`. The counter
//! advances from `i` to `i + 1 mod k` when leaving a state of set `i`, so
//! copy 0 is visited infinitely often exactly when every set is.

use crate::automaton::{Automaton, AutomatonBuilder};
use crate::error::AutomatonError;
use std::fmt::Debug;
use tracing::debug;

/// Equivalent automaton with a single final state set.
///
/// A Büchi input counts as one acceptance set. An input with no
/// acceptance sets yields copies without final states.
pub fn degeneralize<S, D>(automaton: &Automaton<S, D>) -> Result<Automaton<S, D>, AutomatonError>
where
    S: Clone + Ord + Debug,
    D: Clone,
{
    let sets = automaton.final_state_sets();
    let k = sets.len();
    let rounds = k.max(1);

    let mut builder = AutomatonBuilder::buchi();
    for round in 0..rounds {
        for state in automaton.states() {
            builder = builder.with_state_data(
                copy_label(state.label(), round),
                round == 0 && state.is_initial(),
                state.data().cloned(),
            );
        }
    }

    if let Some(first) = sets.first() {
        builder = builder.with_final_state_set(first.iter().map(|label| copy_label(label, 0)))?;
    }

    for round in 0..rounds {
        let leaving = sets.get(round);
        for (from, to, symbols) in automaton.transitions() {
            let target = if leaving.is_some_and(|set| set.contains(from)) {
                (round + 1) % k
            } else {
                round
            };
            builder = builder.with_transition(
                &copy_label(from, round),
                &copy_label(to, target),
                symbols.iter().cloned(),
            )?;
        }
    }

    let degeneralized = builder.build();
    debug!(
        acceptance_sets = k,
        states = degeneralized.len(),
        transitions = degeneralized.transition_count(),
        "Degeneralized automaton"
    );
    Ok(degeneralized)
}

/// Same automaton with its final state set as the only member of a
/// generalized acceptance family.
pub fn generalize<S, D>(automaton: &Automaton<S, D>) -> Result<Automaton<S, D>, AutomatonError>
where
    S: Clone + Ord + Debug,
    D: Clone,
{
    let mut builder = AutomatonBuilder::generalized().with_states_from(automaton.states());
    for (from, to, symbols) in automaton.transitions() {
        builder = builder.with_transition(from, to, symbols.iter().cloned())?;
    }
    for set in automaton.final_state_sets() {
        builder = builder.with_final_state_set(set.iter().cloned())?;
    }
    Ok(builder.build())
}

fn copy_label(label: &str, round: usize) -> String {
    format!("({label}, {round})")
}
