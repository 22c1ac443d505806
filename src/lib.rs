//! ltl-verify: automata-theoretic LTL model checking.
//!
//! Decides whether every infinite path of a Kripke structure satisfies an
//! LTL formula, and produces counterexample paths when it does not.
//!
//! The pipeline:
//!
//! 1. **Lift** the Kripke structure into a Büchi automaton accepting its
//!    infinite paths ([`lift()`]).
//! 2. **Translate** the negated formula into a generalized Büchi automaton
//!    by tableau expansion ([`translate()`]), then **degeneralize** it into a
//!    plain Büchi automaton ([`degeneralize()`]).
//! 3. Build the **product** of both automata ([`product()`]) and search it for
//!    an accepting lasso ([`emptiness_check`]). An empty product means the
//!    formula holds; every lasso found is a counterexample.
//!
//! # Quick Start
//!
//! ```ignore
//! use ltl_verify::*;
//!
//! let oven = KripkeStructure::builder()
//!     .with_state("idle", Vec::<String>::new(), true)
//!     .with_state("closed", ["close"], false)
//!     .with_state("cooking", ["close", "start", "cooking"], false)
//!     .with_transition("idle", "closed")
//!     .with_transition("closed", "idle")
//!     .with_transition("closed", "cooking")
//!     .with_transition("cooking", "cooking")
//!     .with_transition("cooking", "closed")
//!     .build()?;
//!
//! let result = verify_str(&oven, "G ((!close && start) -> F cooking)")?;
//! assert!(result.confirmed);
//!
//! let result = verify_str(&oven, "G F cooking")?;
//! for counterexample in &result.counterexamples {
//!     println!("{counterexample}");
//! }
//! ```

pub mod automaton;
mod builder;
pub mod degeneralize;
pub mod emptiness;
pub mod error;
pub mod formula;
pub mod kripke;
pub mod lift;
pub mod product;
pub mod translate;
pub mod verify;

// Re-export core types for convenience
pub use automaton::{Acceptance, Automaton, AutomatonBuilder, AutomatonState, Letter};
pub use degeneralize::{degeneralize, generalize};
pub use emptiness::{emptiness_check, EmptinessResult, Lasso};
pub use error::{
    AutomatonError, BuilderError, Error, FormulaError, KripkeError, LtlResult, ParseError, TranslationError,
};
pub use formula::{parse, Atom, BinaryOp, Formula, UnaryOp};
pub use kripke::{KripkeBuilder, KripkeState, KripkeStructure};
pub use lift::{lift, lift_projected, SystemAutomaton};
pub use product::product;
pub use translate::{translate, SpecificationAutomaton, Translator};
pub use verify::{
    verify, verify_file, verify_str, verify_with_config, VerificationResult, VerifierConfig, VerifierConfigBuilder,
};
