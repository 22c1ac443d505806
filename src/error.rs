//! Typed errors for ltl-verify.
//!
//! One error enum per concern, wrapped by the top-level [`Error`] so callers
//! can either match precisely or just propagate with `?`.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for ltl-verify operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Error while evaluating a formula.
    #[error("Formula error: {0}")]
    Formula(#[from] FormulaError),

    /// Error while parsing LTL text.
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// Error while building an automaton.
    #[error("Automaton error: {0}")]
    Automaton(#[from] AutomatonError),

    /// Error while translating a formula into an automaton.
    #[error("Translation error: {0}")]
    Translation(#[from] TranslationError),

    /// Error in a Kripke structure.
    #[error("Kripke structure error: {0}")]
    Kripke(#[from] KripkeError),

    /// Error while building a configuration.
    #[error("Builder error: {0}")]
    Builder(#[from] BuilderError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Error during propositional evaluation of a formula.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FormulaError {
    /// Temporal operators have no propositional value.
    #[error("Cannot evaluate temporal operator '{operator}' in '{formula}'")]
    TemporalEvaluation { operator: String, formula: String },
}

/// Error while parsing LTL formula text.
#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum ParseError {
    /// Input contained no formula.
    #[error("Formula text is empty")]
    Empty,

    /// Character that starts no token.
    #[error("Unexpected character '{found}' at position {position}")]
    UnexpectedChar { position: usize, found: char },

    /// Token that does not fit the grammar at this point.
    #[error("Unexpected '{found}' at position {position}, expected {expected}")]
    UnexpectedToken {
        position: usize,
        found: String,
        expected: &'static str,
    },

    /// Input ended in the middle of a formula.
    #[error("Unexpected end of formula, expected {expected}")]
    UnexpectedEnd { expected: &'static str },

    /// A complete formula was followed by more tokens.
    #[error("Trailing input '{found}' at position {position}")]
    TrailingInput { position: usize, found: String },
}

/// Error while building or combining automata.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AutomatonError {
    /// Referenced state was never declared.
    #[error("State '{label}' is not declared")]
    UnknownState { label: String },

    /// Transitions must carry at least one symbol.
    #[error("Transition from '{from}' to '{to}' has no symbols")]
    EmptyTransition { from: String, to: String },

    /// Final state set references undeclared states.
    #[error("Invalid final state set. States {missing:?} are missing")]
    InvalidFinalStateSet { missing: Vec<String> },

    /// Operation requires a different acceptance condition.
    #[error("Expected {expected} acceptance on automaton '{operand}'")]
    AcceptanceMismatch {
        operand: &'static str,
        expected: &'static str,
    },
}

/// Error during tableau translation.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TranslationError {
    /// Alphabet enumeration would exceed the configured bound.
    #[error("Tableau node has {count} unconstrained propositions, limit is {limit}")]
    TooManyPropositions { count: usize, limit: usize },

    /// The tableau met an operator that normalization removes.
    #[error("Formula is not in normal form: {formula}")]
    NotNormalized { formula: String },

    /// Literal conjunction could not be evaluated.
    #[error(transparent)]
    Formula(#[from] FormulaError),

    /// Materialized automaton was malformed.
    #[error(transparent)]
    Automaton(#[from] AutomatonError),
}

/// Error in a Kripke structure description.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum KripkeError {
    /// Transition references a state that does not exist.
    #[error("Kripke state '{label}' is not declared")]
    UnknownState { label: String },

    /// Failed to read a model file.
    #[error("Failed to read Kripke structure {path}: {reason}")]
    Read { path: PathBuf, reason: String },
}

/// Error while building a configuration value.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BuilderError {
    /// A builder field was set to an unsupported value.
    #[error("{builder}: invalid value for '{field}': {reason}")]
    InvalidValue {
        builder: &'static str,
        field: &'static str,
        reason: String,
    },
}

/// Result type alias using ltl-verify's Error.
pub type LtlResult<T> = std::result::Result<T, Error>;
