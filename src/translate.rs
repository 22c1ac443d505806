//! Tableau translation of LTL formulas into generalized Büchi automata.
//!
//! The formula is normalized and expanded into a graph of tableau nodes.
//! Each node collects the subformulas that must hold at one position
//! (`old`) and those that must hold at the next one (`next`). Nodes with
//! equal `old` and `next` sets are one automaton state, which bounds the
//! expansion.
//!
//! Every until-subformula `a U b` yields one acceptance set: the states in
//! which the obligation is either not pending or already discharged.
//! Transitions into a node are labelled with every letter over the
//! formula's propositions that satisfies the node's literals.

use crate::automaton::{Automaton, AutomatonBuilder, Letter};
use crate::error::TranslationError;
use crate::formula::{Atom, BinaryOp, Formula, UnaryOp};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::{debug, trace};

/// Label of the initial state of a translated automaton.
pub const INITIAL_STATE: &str = "init";

/// Upper bound on unconstrained propositions enumerated per tableau node.
pub const MAX_FREE_PROPOSITIONS: usize = 32;

/// Generalized Büchi automaton produced by translation. States carry the
/// formulas their tableau node committed to.
pub type SpecificationAutomaton = Automaton<Letter, Vec<Formula>>;

/// Formula to generalized Büchi automaton translator.
#[derive(Debug, Clone)]
pub struct Translator {
    max_free_propositions: usize,
    optimize: bool,
}

impl Default for Translator {
    fn default() -> Self {
        Self {
            max_free_propositions: MAX_FREE_PROPOSITIONS,
            optimize: false,
        }
    }
}

impl Translator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lower the per-node enumeration bound. Values above
    /// [`MAX_FREE_PROPOSITIONS`] are clamped.
    pub fn with_max_free_propositions(mut self, limit: usize) -> Self {
        self.max_free_propositions = limit.min(MAX_FREE_PROPOSITIONS);
        self
    }

    /// Merge joinable states of the produced automaton.
    pub fn with_optimization(mut self, enabled: bool) -> Self {
        self.optimize = enabled;
        self
    }

    /// Translate `formula` into a generalized Büchi automaton accepting
    /// exactly its models.
    pub fn translate(&self, formula: &Formula) -> Result<SpecificationAutomaton, TranslationError> {
        let formula = formula.normalized();
        let nodes = expand(&formula)?;
        let acceptance = acceptance_sets(&nodes);
        debug!(
            formula = %formula,
            nodes = nodes.len(),
            acceptance_sets = acceptance.len(),
            "Tableau expansion finished"
        );
        self.materialize(&formula, &nodes, &acceptance)
    }

    fn materialize(
        &self,
        formula: &Formula,
        nodes: &[GraphNode],
        acceptance: &[BTreeSet<String>],
    ) -> Result<SpecificationAutomaton, TranslationError> {
        let propositions = formula.propositions(None);

        let mut builder = AutomatonBuilder::generalized()
            .with_optimization(self.optimize)
            .with_state(INITIAL_STATE, true);
        for node in nodes {
            builder = builder.with_state_data(node.id.clone(), false, Some(node.old.iter().cloned().collect()));
        }

        for node in nodes {
            let letters = self.node_letters(node, &propositions)?;
            if letters.is_empty() {
                debug!(node = %node.id, "Tableau node admits no letter");
                continue;
            }
            for source in &node.incoming {
                builder = builder.with_transition(source, &node.id, letters.iter().cloned())?;
            }
        }

        for set in acceptance {
            builder = builder.with_final_state_set(set.iter().cloned())?;
        }

        Ok(builder.build())
    }

    /// Letters over `propositions` consistent with the node's literals.
    fn node_letters(
        &self,
        node: &GraphNode,
        propositions: &BTreeSet<String>,
    ) -> Result<BTreeSet<Letter>, TranslationError> {
        let literals: Vec<&Formula> = node.old.iter().filter(|f| f.is_literal()).collect();

        let mut fixed = BTreeSet::new();
        let mut positive = Letter::new();
        for literal in &literals {
            match literal {
                Formula::Atom(Atom::Var(name)) => {
                    fixed.insert(name.as_str());
                    positive.insert(name.as_str());
                }
                Formula::Unary(UnaryOp::Neg, inner) => {
                    if let Formula::Atom(Atom::Var(name)) = inner.as_ref() {
                        fixed.insert(name.as_str());
                    }
                }
                _ => {}
            }
        }

        let free: Vec<&str> = propositions
            .iter()
            .map(String::as_str)
            .filter(|name| !fixed.contains(name))
            .collect();
        if free.len() > self.max_free_propositions {
            return Err(TranslationError::TooManyPropositions {
                count: free.len(),
                limit: self.max_free_propositions,
            });
        }

        let constraint = literals
            .into_iter()
            .cloned()
            .reduce(Formula::and)
            .unwrap_or_else(Formula::top);

        let mut letters = BTreeSet::new();
        for mask in 0..(1u64 << free.len()) {
            let mut letter = positive.clone();
            for (bit, name) in free.iter().enumerate() {
                if mask & (1u64 << bit) != 0 {
                    letter.insert(*name);
                }
            }
            if constraint.evaluate(letter.atoms())? {
                letters.insert(letter);
            }
        }
        Ok(letters)
    }
}

/// Translate with default settings.
pub fn translate(formula: &Formula) -> Result<SpecificationAutomaton, TranslationError> {
    Translator::default().translate(formula)
}

#[derive(Debug, Clone)]
struct GraphNode {
    id: String,
    incoming: BTreeSet<String>,
    new: Vec<Formula>,
    old: BTreeSet<Formula>,
    next: BTreeSet<Formula>,
}

impl GraphNode {
    fn seed(id: String, incoming: String, formulas: impl IntoIterator<Item = Formula>) -> Self {
        Self {
            id,
            incoming: BTreeSet::from([incoming]),
            new: formulas.into_iter().collect(),
            old: BTreeSet::new(),
            next: BTreeSet::new(),
        }
    }

    fn require(&mut self, formula: &Formula) {
        if !self.old.contains(formula) && !self.new.contains(formula) {
            self.new.push(formula.clone());
        }
    }
}

type Signature = (BTreeSet<Formula>, BTreeSet<Formula>);

#[derive(Default)]
struct Tableau {
    nodes: Vec<GraphNode>,
    index: HashMap<Signature, usize>,
    next_id: usize,
}

impl Tableau {
    fn fresh_id(&mut self) -> String {
        let id = self.next_id.to_string();
        self.next_id += 1;
        id
    }

    /// Copy of `node` under a fresh id.
    fn split(&mut self, node: &GraphNode) -> GraphNode {
        GraphNode {
            id: self.fresh_id(),
            ..node.clone()
        }
    }

    /// Commit a fully expanded node, or fold it into the committed node
    /// with the same signature.
    fn close(&mut self, node: GraphNode, pending: &mut Vec<GraphNode>) {
        let signature = (node.old.clone(), node.next.clone());
        if let Some(&existing) = self.index.get(&signature) {
            trace!(node = %node.id, into = %self.nodes[existing].id, "Merging tableau node");
            self.nodes[existing].incoming.extend(node.incoming);
            return;
        }

        let successor = GraphNode::seed(self.fresh_id(), node.id.clone(), node.next.iter().cloned());
        trace!(node = %node.id, successor = %successor.id, "Committing tableau node");
        self.index.insert(signature, self.nodes.len());
        self.nodes.push(node);
        pending.push(successor);
    }
}

fn expand(formula: &Formula) -> Result<Vec<GraphNode>, TranslationError> {
    let mut tableau = Tableau::default();
    let seed = GraphNode::seed(tableau.fresh_id(), INITIAL_STATE.to_string(), [formula.clone()]);
    let mut pending = vec![seed];

    while let Some(mut node) = pending.pop() {
        let Some(current) = node.new.pop() else {
            tableau.close(node, &mut pending);
            continue;
        };
        if node.old.contains(&current) {
            pending.push(node);
            continue;
        }

        match &current {
            literal if literal.is_literal() => {
                let contradicted = matches!(literal, Formula::Atom(Atom::False))
                    || literal
                        .complement()
                        .is_some_and(|complement| node.old.contains(&complement));
                if contradicted {
                    trace!(node = %node.id, literal = %literal, "Discarding contradictory branch");
                    continue;
                }
                node.old.insert(current.clone());
                pending.push(node);
            }
            Formula::Unary(UnaryOp::Next, inner) => {
                node.next.insert(inner.as_ref().clone());
                node.old.insert(current.clone());
                pending.push(node);
            }
            Formula::Binary(BinaryOp::And, left, right) => {
                node.require(left);
                node.require(right);
                node.old.insert(current.clone());
                pending.push(node);
            }
            Formula::Binary(op @ (BinaryOp::Or | BinaryOp::Until | BinaryOp::Release), left, right) => {
                let mut second = tableau.split(&node);
                let mut first = node;
                match op {
                    BinaryOp::Or => {
                        first.require(left);
                        second.require(right);
                    }
                    BinaryOp::Until => {
                        first.require(left);
                        first.next.insert(current.clone());
                        second.require(right);
                    }
                    _ => {
                        first.require(right);
                        first.next.insert(current.clone());
                        second.require(left);
                        second.require(right);
                    }
                }
                first.old.insert(current.clone());
                second.old.insert(current.clone());
                pending.push(second);
                pending.push(first);
            }
            other => {
                return Err(TranslationError::NotNormalized {
                    formula: other.to_string(),
                })
            }
        }
    }

    Ok(tableau.nodes)
}

/// One final state set per until-subformula of the committed nodes.
fn acceptance_sets(nodes: &[GraphNode]) -> Vec<BTreeSet<String>> {
    let untils: BTreeMap<&Formula, &Formula> = nodes
        .iter()
        .flat_map(|node| &node.old)
        .filter_map(|formula| match formula {
            Formula::Binary(BinaryOp::Until, _, goal) => Some((formula, goal.as_ref())),
            _ => None,
        })
        .collect();

    if untils.is_empty() {
        if nodes.is_empty() {
            return Vec::new();
        }
        return vec![nodes.iter().map(|node| node.id.clone()).collect()];
    }

    let mut family: Vec<BTreeSet<String>> = Vec::new();
    for (until, goal) in untils {
        let set: BTreeSet<String> = nodes
            .iter()
            .filter(|node| !node.old.contains(until) || node.old.contains(goal))
            .map(|node| node.id.clone())
            .collect();
        if !family.contains(&set) {
            family.push(set);
        }
    }
    family
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formula::parse;

    fn letter(atoms: &[&str]) -> Letter {
        atoms.iter().copied().collect()
    }

    #[test]
    fn globally_a_has_one_looping_state() {
        let automaton = translate(&parse("G a").unwrap()).unwrap();
        assert_eq!(automaton.len(), 2);
        assert!(automaton.state(INITIAL_STATE).unwrap().is_initial());

        let looping: Vec<_> = automaton
            .states()
            .filter(|s| s.label() != INITIAL_STATE)
            .map(|s| s.label().to_string())
            .collect();
        assert_eq!(looping.len(), 1);
        let state = &looping[0];

        assert_eq!(automaton.transition_count(), 2);
        let expected = BTreeSet::from([letter(&["a"])]);
        assert_eq!(automaton.transition_symbols(INITIAL_STATE, state), Some(&expected));
        assert_eq!(automaton.transition_symbols(state, state), Some(&expected));
        assert_eq!(automaton.final_state_sets(), &[BTreeSet::from([state.clone()])]);
    }

    #[test]
    fn unsatisfiable_until_is_pruned() {
        let automaton = translate(&parse("(0 U 0)").unwrap()).unwrap();
        assert_eq!(automaton.len(), 1);
        assert!(automaton.has_state(INITIAL_STATE));
        assert_eq!(automaton.transition_count(), 0);
        assert!(automaton.final_state_sets().is_empty());
    }

    #[test]
    fn finally_has_one_acceptance_set_per_until() {
        let automaton = translate(&parse("F a && F b").unwrap()).unwrap();
        assert!(automaton.acceptance().is_generalized());
        assert_eq!(automaton.final_state_sets().len(), 2);
    }

    #[test]
    fn states_carry_committed_formulas() {
        let automaton = translate(&parse("X a").unwrap()).unwrap();
        let payloads: Vec<&Vec<Formula>> = automaton.states().filter_map(|s| s.data()).collect();
        assert!(payloads
            .iter()
            .any(|formulas| formulas.contains(&Formula::var("a").next())));
        assert!(payloads.iter().any(|formulas| formulas.contains(&Formula::var("a"))));
    }

    #[test]
    fn next_labels_first_step_freely() {
        let automaton = translate(&parse("X a").unwrap()).unwrap();
        let first_step: BTreeSet<&Letter> = automaton
            .transitions_from(INITIAL_STATE)
            .flat_map(|(_, symbols)| symbols)
            .collect();
        assert!(first_step.contains(&letter(&[])));
        assert!(first_step.contains(&letter(&["a"])));
    }

    #[test]
    fn free_proposition_limit() {
        let formula = parse("X (a && b && c)").unwrap();
        let err = Translator::new()
            .with_max_free_propositions(2)
            .translate(&formula)
            .unwrap_err();
        assert!(matches!(err, TranslationError::TooManyPropositions { count: 3, limit: 2 }));
        assert!(Translator::new().with_max_free_propositions(3).translate(&formula).is_ok());
    }

    #[test]
    fn limit_is_clamped() {
        let translator = Translator::new().with_max_free_propositions(1000);
        assert_eq!(translator.max_free_propositions, MAX_FREE_PROPOSITIONS);
    }

    #[test]
    fn contradiction_has_no_accepting_structure() {
        let automaton = translate(&parse("a && !a").unwrap()).unwrap();
        assert_eq!(automaton.len(), 1);
        assert_eq!(automaton.transition_count(), 0);
    }
}
