//! Language-level tests: automata are compared by the lasso words they
//! accept, never by their exact shape.

use ltl_verify::*;
use std::collections::BTreeSet;
use std::fmt::{Debug, Display};

/// Büchi automaton accepting exactly `prefix · cycle^ω`.
fn word_automaton<S: Clone + Ord + Debug>(prefix: &[S], cycle: &[S]) -> Automaton<S> {
    assert!(!cycle.is_empty());
    let word: Vec<&S> = prefix.iter().chain(cycle).collect();
    let label = |i: usize| format!("w{i}");

    let mut builder = AutomatonBuilder::buchi();
    for i in 0..word.len() {
        builder = builder.with_state(label(i), i == 0);
        builder = builder.with_final_state(&label(i)).unwrap();
    }
    for (i, symbol) in word.iter().enumerate() {
        let target = if i + 1 < word.len() { i + 1 } else { prefix.len() };
        builder = builder
            .with_transition(&label(i), &label(target), [(*symbol).clone()])
            .unwrap();
    }
    builder.build()
}

fn accepts<S, D>(automaton: &Automaton<S, D>, prefix: &[S], cycle: &[S]) -> bool
where
    S: Clone + Ord + Debug + Display,
    D: Clone,
{
    let buchi = if automaton.acceptance().is_generalized() {
        degeneralize(automaton).unwrap()
    } else {
        automaton.clone()
    };
    let product = product(&word_automaton(prefix, cycle), &buchi).unwrap();
    emptiness_check(&product).unwrap().is_accepting()
}

fn letter(atoms: &[&str]) -> Letter {
    atoms.iter().copied().collect()
}

fn word(letters: &[&[&str]]) -> Vec<Letter> {
    letters.iter().map(|atoms| letter(atoms)).collect()
}

fn project(word: &[Letter], propositions: &BTreeSet<String>) -> Vec<Letter> {
    word.iter().map(|l| l.project(propositions)).collect()
}

/// Lasso words over `{a, b}`.
fn sample_words() -> Vec<(Vec<Letter>, Vec<Letter>)> {
    vec![
        (word(&[]), word(&[&["a"]])),
        (word(&[]), word(&[&[]])),
        (word(&[&["a"], &["a"]]), word(&[&["b"]])),
        (word(&[&["a"], &[]]), word(&[&["b"]])),
        (word(&[]), word(&[&["a"], &["b"]])),
        (word(&[&["b"]]), word(&[&["a", "b"], &[]])),
        (word(&[&[], &["a"]]), word(&[&["a", "b"]])),
        (word(&[&["a", "b"]]), word(&[&[]])),
    ]
}

fn sample_formulas() -> Vec<Formula> {
    [
        "G a",
        "F b",
        "a U b",
        "a R b",
        "X a",
        "X X b",
        "G F a",
        "F G b",
        "G (a -> F b)",
        "(a U b) || G !a",
        "X (a && !b)",
        "!(a U (b && X a))",
        "G F a && G F b",
    ]
    .iter()
    .map(|text| parse(text).unwrap())
    .collect()
}

#[test]
fn test_globally_a_language() {
    let automaton = translate(&parse("G a").unwrap()).unwrap();
    assert!(accepts(&automaton, &[], &word(&[&["a"]])));
    assert!(!accepts(&automaton, &[], &word(&[&["a"], &[]])));
    assert!(!accepts(&automaton, &word(&[&[]]), &word(&[&["a"]])));
}

#[test]
fn test_finally_language() {
    let automaton = translate(&parse("F a").unwrap()).unwrap();
    assert!(accepts(&automaton, &word(&[&[], &["a"]]), &word(&[&[]])));
    assert!(accepts(&automaton, &[], &word(&[&[], &["a"]])));
    assert!(!accepts(&automaton, &[], &word(&[&[]])));
}

#[test]
fn test_until_language() {
    let automaton = translate(&parse("a U b").unwrap()).unwrap();
    assert!(accepts(&automaton, &word(&[&["a"], &["a"], &["b"]]), &word(&[&[]])));
    assert!(accepts(&automaton, &[], &word(&[&["b"]])));
    assert!(!accepts(&automaton, &word(&[&["a"], &[]]), &word(&[&["b"]])));
    assert!(!accepts(&automaton, &[], &word(&[&["a"]])));
}

#[test]
fn test_release_language() {
    let automaton = translate(&parse("a R b").unwrap()).unwrap();
    assert!(accepts(&automaton, &[], &word(&[&["b"]])));
    assert!(accepts(&automaton, &word(&[&["b"], &["a", "b"]]), &word(&[&[]])));
    assert!(!accepts(&automaton, &word(&[&["b"], &["a"]]), &word(&[&["b"]])));
}

#[test]
fn test_recurrence_language() {
    let automaton = translate(&parse("G F a").unwrap()).unwrap();
    assert!(accepts(&automaton, &[], &word(&[&[], &[], &["a"]])));
    assert!(!accepts(&automaton, &word(&[&["a"], &["a"]]), &word(&[&[]])));
}

#[test]
fn test_formula_and_negation_split_every_word() {
    for formula in sample_formulas() {
        let propositions = formula.propositions(None);
        let positive = translate(&formula).unwrap();
        let negative = translate(&formula.invert()).unwrap();
        for (prefix, cycle) in sample_words() {
            let prefix = project(&prefix, &propositions);
            let cycle = project(&cycle, &propositions);
            let holds = accepts(&positive, &prefix, &cycle);
            let fails = accepts(&negative, &prefix, &cycle);
            assert_ne!(holds, fails, "{formula} on {prefix:?}({cycle:?})");
        }
    }
}

#[test]
fn test_optimization_preserves_language() {
    let optimizing = Translator::new().with_optimization(true);
    for formula in sample_formulas() {
        let propositions = formula.propositions(None);
        let plain = translate(&formula).unwrap();
        let merged = optimizing.translate(&formula).unwrap();
        assert!(merged.len() <= plain.len());
        for (prefix, cycle) in sample_words() {
            let prefix = project(&prefix, &propositions);
            let cycle = project(&cycle, &propositions);
            assert_eq!(
                accepts(&plain, &prefix, &cycle),
                accepts(&merged, &prefix, &cycle),
                "{formula} on {prefix:?}({cycle:?})"
            );
        }
    }
}

#[test]
fn test_degeneralized_language_matches_generalized() {
    // Remembers the last symbol; needs infinitely many 'x' and 'y'.
    let generalized: Automaton<char> = AutomatonBuilder::generalized()
        .with_state("0", true)
        .with_state("1", false)
        .with_transition("0", "0", ['x'])
        .unwrap()
        .with_transition("0", "1", ['y'])
        .unwrap()
        .with_transition("1", "1", ['y'])
        .unwrap()
        .with_transition("1", "0", ['x'])
        .unwrap()
        .with_final_state_set(["1"])
        .unwrap()
        .with_final_state_set(["0"])
        .unwrap()
        .build();
    let buchi = degeneralize(&generalized).unwrap();
    assert!(buchi.len() <= generalized.len() * 2);

    assert!(accepts(&buchi, &[], &['x', 'y']));
    assert!(accepts(&buchi, &['y', 'y'], &['x', 'x', 'y']));
    assert!(!accepts(&buchi, &[], &['x']));
    assert!(!accepts(&buchi, &['x', 'y'], &['y']));
}

#[test]
fn test_generalize_then_degeneralize_keeps_language() {
    let buchi: Automaton<char> = AutomatonBuilder::buchi()
        .with_state("p", true)
        .with_state("q", false)
        .with_transition("p", "p", ['a'])
        .unwrap()
        .with_transition("p", "q", ['b'])
        .unwrap()
        .with_transition("q", "p", ['a'])
        .unwrap()
        .with_final_state("q")
        .unwrap()
        .build();
    let round_trip = degeneralize(&generalize(&buchi).unwrap()).unwrap();
    for (prefix, cycle) in [
        (vec![], vec!['a', 'b']),
        (vec!['b'], vec!['a']),
        (vec!['a'], vec!['b', 'a', 'a']),
    ] {
        assert_eq!(
            accepts(&buchi, &prefix, &cycle),
            accepts(&round_trip, &prefix, &cycle),
            "{prefix:?}({cycle:?})"
        );
    }
}
