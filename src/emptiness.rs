//! Accepting lasso search over Büchi automata.
//!
//! The language of a Büchi automaton is non-empty iff some final state is
//! reachable from an initial state and lies on a cycle. For every pair of
//! initial and final state the search looks for the shortest such lasso and
//! renders it as a witness word `prefix(cycle)`, standing for
//! `prefix · cycle^ω`.

use crate::automaton::Automaton;
use crate::error::AutomatonError;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use std::fmt::Display;
use tracing::debug;

/// Accepting run in lasso shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Lasso {
    /// States from an initial state to the final state, both included.
    pub prefix: Vec<String>,
    /// States after the final state, ending with the final state again.
    pub cycle: Vec<String>,
}

impl Lasso {
    /// Witness word read along the lasso, one symbol per edge.
    pub fn render<S: Display, D>(&self, automaton: &Automaton<S, D>) -> String {
        let mut word = String::new();
        push_symbols(&mut word, automaton, self.prefix.iter());
        word.push('(');
        push_symbols(&mut word, automaton, self.prefix.last().into_iter().chain(&self.cycle));
        word.push(')');
        word
    }
}

fn push_symbols<'a, S: Display, D>(
    word: &mut String,
    automaton: &Automaton<S, D>,
    states: impl Iterator<Item = &'a String>,
) {
    let states: Vec<&String> = states.collect();
    for step in states.windows(2) {
        if let Some(symbol) = automaton
            .transition_symbols(step[0], step[1])
            .and_then(|symbols| symbols.iter().next())
        {
            word.push_str(&symbol.to_string());
        }
    }
}

/// Outcome of [`emptiness_check`].
#[derive(Debug, Clone, Serialize)]
#[must_use = "emptiness result should be checked"]
pub struct EmptinessResult {
    /// No accepting run exists.
    pub is_empty: bool,
    pub lassos: Vec<Lasso>,
    /// Rendered witness words.
    pub counterexamples: BTreeSet<String>,
}

impl EmptinessResult {
    pub fn is_accepting(&self) -> bool {
        !self.is_empty
    }
}

/// Decide language emptiness of a Büchi automaton.
pub fn emptiness_check<S: Display, D>(automaton: &Automaton<S, D>) -> Result<EmptinessResult, AutomatonError> {
    let finals = automaton
        .final_states()
        .ok_or(AutomatonError::AcceptanceMismatch {
            operand: "input",
            expected: "Büchi",
        })?;

    let mut cycles: BTreeMap<&str, Option<Vec<String>>> = BTreeMap::new();
    let mut lassos = Vec::new();
    for initial in automaton.initial_states() {
        let parents = reachable(automaton, initial.label());
        for target in finals {
            if !parents.contains_key(target.as_str()) {
                continue;
            }
            let cycle = cycles
                .entry(target.as_str())
                .or_insert_with(|| shortest_cycle(automaton, target));
            if let Some(cycle) = cycle {
                lassos.push(Lasso {
                    prefix: path_to(&parents, target),
                    cycle: cycle.clone(),
                });
            }
        }
    }

    let counterexamples: BTreeSet<String> = lassos.iter().map(|lasso| lasso.render(automaton)).collect();
    debug!(
        states = automaton.len(),
        lassos = lassos.len(),
        "Emptiness check finished"
    );
    Ok(EmptinessResult {
        is_empty: lassos.is_empty(),
        lassos,
        counterexamples,
    })
}

/// Breadth-first parent map of the states reachable from `root`.
fn reachable<'a, S, D>(automaton: &'a Automaton<S, D>, root: &'a str) -> HashMap<&'a str, Option<&'a str>> {
    let mut parents = HashMap::from([(root, None)]);
    let mut queue = VecDeque::from([root]);
    while let Some(current) = queue.pop_front() {
        for (to, _) in automaton.transitions_from(current) {
            if !parents.contains_key(to) {
                parents.insert(to, Some(current));
                queue.push_back(to);
            }
        }
    }
    parents
}

fn path_to(parents: &HashMap<&str, Option<&str>>, target: &str) -> Vec<String> {
    let mut path = vec![target.to_string()];
    let mut current = target;
    while let Some(Some(parent)) = parents.get(current) {
        path.push(parent.to_string());
        current = *parent;
    }
    path.reverse();
    path
}

/// Shortest cycle through `target`, as the states after `target` ending
/// with `target`.
fn shortest_cycle<S, D>(automaton: &Automaton<S, D>, target: &str) -> Option<Vec<String>> {
    let mut parents: HashMap<&str, &str> = HashMap::new();
    let mut queue = VecDeque::new();
    for (to, _) in automaton.transitions_from(target) {
        if to == target {
            return Some(vec![target.to_string()]);
        }
        if !parents.contains_key(to) {
            parents.insert(to, target);
            queue.push_back(to);
        }
    }

    while let Some(current) = queue.pop_front() {
        for (to, _) in automaton.transitions_from(current) {
            if to == target {
                let mut cycle = vec![target.to_string()];
                let mut step = current;
                while step != target {
                    cycle.push(step.to_string());
                    step = parents.get(step).copied().unwrap_or(target);
                }
                cycle.reverse();
                return Some(cycle);
            }
            if !parents.contains_key(to) {
                parents.insert(to, current);
                queue.push_back(to);
            }
        }
    }
    None
}
