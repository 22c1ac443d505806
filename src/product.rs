//! Synchronized product of two Büchi automata.
//!
//! Product states are triples `(left, right, phase)`. The phase moves from
//! 0 to 1 when the left operand enters a final state, from 1 to 2 when the
//! right operand does, and back to 0 on the step after that. Phase 2 states
//! are final, so an accepting product run visits both operands' final sets
//! infinitely often.
//!
//! All initial pairs are folded into one state labelled
//! [`PRODUCT_INITIAL_STATE`] that copies their outgoing transitions.
//!
//! Operand labels may themselves contain commas, so two distinct triples
//! can render to the same text. Such a triple gets a `#n` suffix, and every
//! triple keeps exactly one label.

use crate::automaton::{Automaton, AutomatonBuilder};
use crate::error::AutomatonError;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::fmt::Debug;
use tracing::{debug, warn};

/// Label of the product's single initial state.
pub const PRODUCT_INITIAL_STATE: &str = "init";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
struct ProductState<'a> {
    left: &'a str,
    right: &'a str,
    phase: u8,
}

impl ProductState<'_> {
    fn display(&self) -> String {
        format!("({},{},{})", self.left, self.right, self.phase)
    }

    fn successor_phase(&self, left_final: bool, right_final: bool) -> u8 {
        match self.phase {
            0 if left_final => 1,
            1 if right_final => 2,
            2 => 0,
            phase => phase,
        }
    }
}

/// One distinct label per discovered product state.
#[derive(Default)]
struct ProductLabels<'a> {
    labels: HashMap<ProductState<'a>, String>,
    taken: HashSet<String>,
}

impl<'a> ProductLabels<'a> {
    /// Label a newly seen state. `None` if it already has one.
    fn assign(&mut self, state: ProductState<'a>) -> Option<String> {
        if self.labels.contains_key(&state) {
            return None;
        }
        let base = state.display();
        let mut label = base.clone();
        let mut suffix = 1;
        while label == PRODUCT_INITIAL_STATE || self.taken.contains(&label) {
            label = format!("{base}#{suffix}");
            suffix += 1;
        }
        if label != base {
            debug!(state = %base, label = %label, "Product label collision, renamed");
        }
        self.taken.insert(label.clone());
        self.labels.insert(state, label.clone());
        Some(label)
    }

    /// Label of a state already passed to [`assign`](Self::assign).
    fn get(&self, state: &ProductState<'a>) -> &str {
        &self.labels[state]
    }
}

/// Automaton accepting the intersection of the operands' languages.
///
/// Both operands need Büchi acceptance; degeneralize first otherwise.
pub fn product<S, L, R>(left: &Automaton<S, L>, right: &Automaton<S, R>) -> Result<Automaton<S>, AutomatonError>
where
    S: Clone + Ord + Debug,
{
    let left_final = left.final_states().ok_or(AutomatonError::AcceptanceMismatch {
        operand: "left",
        expected: "Büchi",
    })?;
    let right_final = right.final_states().ok_or(AutomatonError::AcceptanceMismatch {
        operand: "right",
        expected: "Büchi",
    })?;

    let mut labels = ProductLabels::default();
    let mut queue = VecDeque::new();
    let mut initial = Vec::new();
    let mut builder = AutomatonBuilder::buchi();

    for a in left.initial_states() {
        for b in right.initial_states() {
            let state = ProductState {
                left: a.label(),
                right: b.label(),
                phase: 0,
            };
            if let Some(label) = labels.assign(state) {
                builder = builder.with_state(label, false);
                initial.push(state);
                queue.push_back(state);
            }
        }
    }

    if initial.is_empty() {
        warn!("No initial state pair, product is empty");
        return Ok(builder.build());
    }

    let mut edges: BTreeMap<ProductState, BTreeMap<ProductState, BTreeSet<S>>> = BTreeMap::new();
    while let Some(current) = queue.pop_front() {
        for (left_to, left_symbols) in left.transitions_from(current.left) {
            for (right_to, right_symbols) in right.transitions_from(current.right) {
                let shared: BTreeSet<S> = left_symbols.intersection(right_symbols).cloned().collect();
                if shared.is_empty() {
                    continue;
                }

                let target = ProductState {
                    left: left_to,
                    right: right_to,
                    phase: current.successor_phase(left_final.contains(left_to), right_final.contains(right_to)),
                };
                if let Some(label) = labels.assign(target) {
                    builder = builder.with_state(label.clone(), false);
                    if target.phase == 2 {
                        builder = builder.with_final_state(&label)?;
                    }
                    queue.push_back(target);
                }
                edges
                    .entry(current)
                    .or_default()
                    .entry(target)
                    .or_default()
                    .extend(shared);
            }
        }
    }

    builder = builder.with_state(PRODUCT_INITIAL_STATE, true);
    for (from, row) in &edges {
        for (to, symbols) in row {
            builder = builder.with_transition(labels.get(from), labels.get(to), symbols.iter().cloned())?;
        }
    }
    for state in &initial {
        for (to, symbols) in edges.get(state).into_iter().flatten() {
            builder = builder.with_transition(PRODUCT_INITIAL_STATE, labels.get(to), symbols.iter().cloned())?;
        }
    }

    let automaton = builder.build();
    debug!(
        states = automaton.len(),
        transitions = automaton.transition_count(),
        "Built product automaton"
    );
    Ok(automaton)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emptiness::emptiness_check;

    /// Single final state looping on `symbol`.
    fn constant(symbol: char) -> Automaton<char> {
        AutomatonBuilder::buchi()
            .with_state("p", true)
            .with_transition("p", "p", [symbol])
            .unwrap()
            .with_final_state("p")
            .unwrap()
            .build()
    }

    #[test]
    fn disjoint_alphabets_give_empty_product() {
        let product = product(&constant('a'), &constant('b')).unwrap();
        let result = emptiness_check(&product).unwrap();
        assert!(result.is_empty);
        assert!(result.counterexamples.is_empty());
    }

    #[test]
    fn shared_loop_is_accepted() {
        let product = product(&constant('a'), &constant('a')).unwrap();
        assert!(product.state(PRODUCT_INITIAL_STATE).unwrap().is_initial());
        assert!(product.has_transition(PRODUCT_INITIAL_STATE, "(p,p,1)"));
        assert!(product.has_transition("(p,p,1)", "(p,p,2)"));
        assert!(product.has_transition("(p,p,2)", "(p,p,0)"));
        assert!(product.has_transition("(p,p,0)", "(p,p,1)"));
        assert!(product.final_states().unwrap().contains("(p,p,2)"));

        let result = emptiness_check(&product).unwrap();
        assert!(!result.is_empty);
        assert!(result.counterexamples.iter().all(|c| c.contains('(')));
    }

    #[test]
    fn phase_waits_for_left_final_state() {
        // Left reaches its final state only after one step.
        let left: Automaton<char> = AutomatonBuilder::buchi()
            .with_state("s", true)
            .with_state("f", false)
            .with_transition("s", "f", ['a'])
            .unwrap()
            .with_transition("f", "f", ['a'])
            .unwrap()
            .with_final_state("f")
            .unwrap()
            .build();
        let product = product(&left, &constant('a')).unwrap();
        assert!(product.has_transition("(s,p,0)", "(f,p,1)"));
        assert!(!product.has_state("(s,p,1)"));
    }

    #[test]
    fn comma_labels_keep_pairs_apart() {
        // (x,y | z) and (x | y,z) render to the same text.
        let left: Automaton<char> = AutomatonBuilder::buchi()
            .with_state("i", true)
            .with_state("x,y", false)
            .with_state("x", false)
            .with_transition("i", "x,y", ['a'])
            .unwrap()
            .with_transition("i", "x", ['b'])
            .unwrap()
            .with_transition("x,y", "x,y", ['a'])
            .unwrap()
            .with_transition("x", "x", ['b'])
            .unwrap()
            .build();
        let right: Automaton<char> = AutomatonBuilder::buchi()
            .with_state("j", true)
            .with_state("z", false)
            .with_state("y,z", false)
            .with_transition("j", "z", ['a'])
            .unwrap()
            .with_transition("j", "y,z", ['b'])
            .unwrap()
            .with_transition("z", "z", ['a'])
            .unwrap()
            .with_transition("y,z", "y,z", ['b'])
            .unwrap()
            .build();

        let product = product(&left, &right).unwrap();
        assert_eq!(product.len(), 4);
        assert!(product.has_state("(x,y,z,0)"));
        assert!(product.has_state("(x,y,z,0)#1"));
        for label in ["(x,y,z,0)", "(x,y,z,0)#1"] {
            let row: Vec<_> = product.transitions_from(label).collect();
            assert_eq!(row.len(), 1, "{label}");
            assert_eq!(row[0].0, label);
            assert_eq!(row[0].1.len(), 1, "{label}");
        }
        assert_eq!(product.transitions_from(PRODUCT_INITIAL_STATE).count(), 2);
    }

    #[test]
    fn generalized_operand_is_rejected() {
        let generalized: Automaton<char> = AutomatonBuilder::generalized()
            .with_state("p", true)
            .build();
        let err = product(&constant('a'), &generalized).unwrap_err();
        assert!(matches!(
            err,
            AutomatonError::AcceptanceMismatch { operand: "right", .. }
        ));
    }

    #[test]
    fn no_initial_pair_gives_empty_automaton() {
        let no_initial: Automaton<char> = AutomatonBuilder::buchi().with_state("p", false).build();
        let product = product(&constant('a'), &no_initial).unwrap();
        assert!(product.is_empty());
    }
}
