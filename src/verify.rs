//! LTL verification of Kripke structures.
//!
//! A structure satisfies a formula iff no infinite path of the structure
//! is a model of the negated formula. [`verify`] builds the Büchi automaton
//! of the structure, translates the negation into a Büchi automaton, and
//! checks their product for emptiness. Accepting lassos of the product are
//! reported as counterexamples.

use crate::automaton::{Automaton, Letter};
use crate::builder::impl_builder;
use crate::degeneralize::degeneralize;
use crate::emptiness::emptiness_check;
use crate::error::{BuilderError, LtlResult};
use crate::formula::{parse, Formula};
use crate::kripke::KripkeStructure;
use crate::lift::{lift_projected, SystemAutomaton};
use crate::product::product;
use crate::translate::{SpecificationAutomaton, Translator, MAX_FREE_PROPOSITIONS};
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::Path;
use tracing::{debug, info};

/// Settings for [`verify_with_config`].
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct VerifierConfig {
    /// Unconstrained propositions enumerated per tableau node. Capped at
    /// [`MAX_FREE_PROPOSITIONS`].
    pub max_free_propositions: usize,

    /// Merge equivalent states of the specification automata.
    pub optimize: bool,

    /// Keep at most this many counterexamples. `None` keeps all.
    pub max_counterexamples: Option<usize>,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            max_free_propositions: MAX_FREE_PROPOSITIONS,
            optimize: true,
            max_counterexamples: None,
        }
    }
}

impl_builder!(VerifierConfig => VerifierConfigBuilder {
    values {
        max_free_propositions: usize,
        optimize: bool,
    }
    options {
        max_counterexamples: usize,
    }
    validate = validate_config;
});

fn validate_config(config: &VerifierConfig) -> Result<(), BuilderError> {
    if config.max_free_propositions > MAX_FREE_PROPOSITIONS {
        return Err(BuilderError::InvalidValue {
            builder: "VerifierConfigBuilder",
            field: "max_free_propositions",
            reason: format!("{} exceeds the limit of {MAX_FREE_PROPOSITIONS}", config.max_free_propositions),
        });
    }
    Ok(())
}

/// Outcome of a verification run, with every intermediate automaton.
#[derive(Debug, Clone, Serialize)]
#[non_exhaustive]
#[must_use = "verification result should be checked"]
pub struct VerificationResult {
    /// Formula that was checked.
    pub specification: Formula,
    /// Normalized negation of the specification.
    pub negated_specification: Formula,
    /// Structure that was checked.
    pub kripke: KripkeStructure,
    pub system: SystemAutomaton,
    /// Generalized Büchi automaton of the negated specification.
    pub specification_automaton: SpecificationAutomaton,
    /// Büchi automaton of the negated specification.
    pub degeneralized_specification: SpecificationAutomaton,
    pub product: Automaton<Letter>,
    /// The structure satisfies the specification.
    pub confirmed: bool,
    /// Witness words `prefix(cycle)` of paths violating the specification.
    pub counterexamples: BTreeSet<String>,
}

impl VerificationResult {
    pub fn is_confirmed(&self) -> bool {
        self.confirmed
    }
}

/// Verify `specification` against `kripke` with default settings.
pub fn verify(kripke: &KripkeStructure, specification: &Formula) -> LtlResult<VerificationResult> {
    verify_with_config(kripke, specification, &VerifierConfig::default())
}

pub fn verify_with_config(
    kripke: &KripkeStructure,
    specification: &Formula,
    config: &VerifierConfig,
) -> LtlResult<VerificationResult> {
    info!(
        specification = %specification,
        states = kripke.len(),
        "Verifying LTL specification"
    );

    let negated_specification = specification.normalized().invert().normalized();
    let propositions = specification.propositions(None);

    let system = lift_projected(kripke, &propositions)?;

    let specification_automaton = Translator::new()
        .with_max_free_propositions(config.max_free_propositions)
        .with_optimization(config.optimize)
        .translate(&negated_specification)?;
    debug!(
        states = specification_automaton.len(),
        acceptance_sets = specification_automaton.final_state_sets().len(),
        "Translated negated specification"
    );

    let mut degeneralized_specification = degeneralize(&specification_automaton)?;
    if config.optimize {
        degeneralized_specification = degeneralized_specification.optimized();
    }

    let product = product(&system, &degeneralized_specification)?;
    let emptiness = emptiness_check(&product)?;

    let confirmed = emptiness.is_empty;
    let counterexamples = match config.max_counterexamples {
        Some(limit) => emptiness.counterexamples.into_iter().take(limit).collect(),
        None => emptiness.counterexamples,
    };

    info!(
        confirmed,
        counterexamples = counterexamples.len(),
        "Verification finished"
    );

    Ok(VerificationResult {
        specification: specification.clone(),
        negated_specification,
        kripke: kripke.clone(),
        system,
        specification_automaton,
        degeneralized_specification,
        product,
        confirmed,
        counterexamples,
    })
}

/// Parse `specification` and verify it with default settings.
pub fn verify_str(kripke: &KripkeStructure, specification: &str) -> LtlResult<VerificationResult> {
    let formula = parse(specification)?;
    verify(kripke, &formula)
}

/// Load a structure from a JSON file and verify `specification` against it.
pub fn verify_file(path: impl AsRef<Path>, specification: &str) -> LtlResult<VerificationResult> {
    let kripke = KripkeStructure::from_file(path)?;
    verify_str(&kripke, specification)
}
