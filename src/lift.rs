//! Kripke structure to Büchi automaton.
//!
//! The automaton accepts exactly the infinite paths of the structure that
//! start in an initial state. A fresh state `"0"` enters the initial
//! states; every other state is the image of a Kripke state, labelled by
//! its 1-based position. Each edge reads the atoms of the state it enters,
//! and every state is final since the model carries no fairness.

use crate::automaton::{Automaton, AutomatonBuilder, Letter};
use crate::error::AutomatonError;
use crate::kripke::{KripkeState, KripkeStructure};
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

/// Label of the entry state of a lifted structure.
pub const SYSTEM_INITIAL_STATE: &str = "0";

/// Büchi automaton of a structure. States carry the Kripke state name.
pub type SystemAutomaton = Automaton<Letter, String>;

/// Lift with each letter holding all atoms of the entered state.
pub fn lift(kripke: &KripkeStructure) -> Result<SystemAutomaton, AutomatonError> {
    lift_with(kripke, KripkeState::letter)
}

/// Lift with each letter restricted to `propositions`.
///
/// Used to put the system in the alphabet of a specification automaton
/// that only mentions `propositions`.
pub fn lift_projected(
    kripke: &KripkeStructure,
    propositions: &BTreeSet<String>,
) -> Result<SystemAutomaton, AutomatonError> {
    lift_with(kripke, |state| state.letter().project(propositions))
}

fn lift_with<F>(kripke: &KripkeStructure, letter_of: F) -> Result<SystemAutomaton, AutomatonError>
where
    F: Fn(&KripkeState) -> Letter,
{
    let labels: HashMap<&str, String> = kripke
        .states()
        .enumerate()
        .map(|(i, state)| (state.name(), (i + 1).to_string()))
        .collect();
    let label_of = |state: &KripkeState| {
        labels
            .get(state.name())
            .map(String::as_str)
            .ok_or_else(|| AutomatonError::UnknownState {
                label: state.name().to_string(),
            })
    };

    let mut builder = AutomatonBuilder::buchi()
        .with_state(SYSTEM_INITIAL_STATE, true)
        .with_final_state(SYSTEM_INITIAL_STATE)?;
    for state in kripke.states() {
        let label = label_of(state)?;
        builder = builder
            .with_state_data(label, false, Some(state.name().to_string()))
            .with_final_state(label)?;
    }

    for state in kripke.initial_states() {
        builder = builder.with_transition(SYSTEM_INITIAL_STATE, label_of(state)?, [letter_of(state)])?;
    }
    for source in kripke.states() {
        let from = label_of(source)?;
        for target in kripke.successors(source.name()) {
            builder = builder.with_transition(from, label_of(target)?, [letter_of(target)])?;
        }
    }

    let automaton = builder.build();
    debug!(
        states = automaton.len(),
        transitions = automaton.transition_count(),
        "Lifted Kripke structure"
    );
    Ok(automaton)
}
