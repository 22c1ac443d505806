//! LTL formula syntax tree.
//!
//! A [`Formula`] is an immutable tree of atoms, unary operators and binary
//! operators. Besides construction and display it supplies the three
//! rewrites the automata pipeline depends on:
//!
//! - [`Formula::invert`] pushes a negation one level inward using the
//!   operator dualities,
//! - [`Formula::normalized`] removes `->`, `G` and `F` and leaves negation
//!   only directly over variables,
//! - [`Formula::evaluate`] gives the propositional value of a literal
//!   conjunction under a set of true atoms.

pub mod parser;

pub use parser::parse;

use crate::error::{FormulaError, ParseError};
use serde::{Serialize, Serializer};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Leaf of a formula.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Atom {
    False,
    True,
    Var(String),
}

/// Prefix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum UnaryOp {
    Neg,
    Next,
    Globally,
    Finally,
}

impl UnaryOp {
    /// Concrete syntax of the operator.
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Neg => "!",
            UnaryOp::Next => "X",
            UnaryOp::Globally => "G",
            UnaryOp::Finally => "F",
        }
    }
}

/// Infix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BinaryOp {
    And,
    Or,
    Implies,
    Until,
    Release,
}

impl BinaryOp {
    /// Concrete syntax of the operator.
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
            BinaryOp::Implies => "->",
            BinaryOp::Until => "U",
            BinaryOp::Release => "R",
        }
    }
}

/// An LTL formula.
///
/// Equality, hashing and ordering are structural. `Display` prints the
/// syntax accepted by [`parse`], fully parenthesizing binary operators, so
/// `parse(&f.to_string())` rebuilds `f`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Formula {
    Atom(Atom),
    Unary(UnaryOp, Box<Formula>),
    Binary(BinaryOp, Box<Formula>, Box<Formula>),
}

impl Formula {
    pub fn var(name: impl Into<String>) -> Self {
        Formula::Atom(Atom::Var(name.into()))
    }

    /// The constant `1`.
    pub fn top() -> Self {
        Formula::Atom(Atom::True)
    }

    /// The constant `0`.
    pub fn bottom() -> Self {
        Formula::Atom(Atom::False)
    }

    pub fn unary(op: UnaryOp, operand: Formula) -> Self {
        Formula::Unary(op, Box::new(operand))
    }

    pub fn binary(op: BinaryOp, left: Formula, right: Formula) -> Self {
        Formula::Binary(op, Box::new(left), Box::new(right))
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Self {
        Formula::unary(UnaryOp::Neg, self)
    }

    pub fn next(self) -> Self {
        Formula::unary(UnaryOp::Next, self)
    }

    pub fn globally(self) -> Self {
        Formula::unary(UnaryOp::Globally, self)
    }

    pub fn finally(self) -> Self {
        Formula::unary(UnaryOp::Finally, self)
    }

    pub fn and(self, other: Formula) -> Self {
        Formula::binary(BinaryOp::And, self, other)
    }

    pub fn or(self, other: Formula) -> Self {
        Formula::binary(BinaryOp::Or, self, other)
    }

    pub fn implies(self, other: Formula) -> Self {
        Formula::binary(BinaryOp::Implies, self, other)
    }

    pub fn until(self, other: Formula) -> Self {
        Formula::binary(BinaryOp::Until, self, other)
    }

    pub fn release(self, other: Formula) -> Self {
        Formula::binary(BinaryOp::Release, self, other)
    }

    /// Constants, variables and negated variables.
    pub fn is_literal(&self) -> bool {
        match self {
            Formula::Atom(_) => true,
            Formula::Unary(UnaryOp::Neg, inner) => matches!(inner.as_ref(), Formula::Atom(Atom::Var(_))),
            _ => false,
        }
    }

    /// The opposite literal, or `None` if this is not a literal.
    pub fn complement(&self) -> Option<Formula> {
        if !self.is_literal() {
            return None;
        }
        Some(self.invert())
    }

    /// Negation of this formula with the negation pushed one level inward.
    ///
    /// The result is logically equivalent to `!self`. Operands are left as
    /// they are apart from the duality being applied, so the result may
    /// still contain `->`, `G` or `F`.
    pub fn invert(&self) -> Formula {
        match self {
            Formula::Atom(Atom::True) => Formula::bottom(),
            Formula::Atom(Atom::False) => Formula::top(),
            Formula::Atom(Atom::Var(_)) => self.clone().not(),
            Formula::Unary(op, inner) => match op {
                UnaryOp::Neg => inner.as_ref().clone(),
                UnaryOp::Next => inner.invert().next(),
                UnaryOp::Globally => inner.invert().finally(),
                UnaryOp::Finally => inner.invert().globally(),
            },
            Formula::Binary(op, left, right) => match op {
                BinaryOp::And => left.invert().or(right.invert()),
                BinaryOp::Or => left.invert().and(right.invert()),
                BinaryOp::Implies => left.as_ref().clone().and(right.invert()),
                BinaryOp::Until => left.invert().release(right.invert()),
                BinaryOp::Release => left.invert().until(right.invert()),
            },
        }
    }

    /// Equivalent formula over `!`, `X`, `U`, `R`, `&&`, `||` and atoms only,
    /// with `!` applied to variables only.
    pub fn normalized(&self) -> Formula {
        match self {
            Formula::Atom(_) => self.clone(),
            Formula::Unary(UnaryOp::Neg, inner) => match inner.as_ref() {
                Formula::Atom(Atom::Var(_)) => self.clone(),
                other => other.invert().normalized(),
            },
            Formula::Unary(UnaryOp::Next, inner) => inner.normalized().next(),
            Formula::Unary(UnaryOp::Globally, inner) => Formula::bottom().release(inner.normalized()),
            Formula::Unary(UnaryOp::Finally, inner) => Formula::top().until(inner.normalized()),
            Formula::Binary(BinaryOp::Implies, left, right) => {
                left.invert().normalized().or(right.normalized())
            }
            Formula::Binary(op, left, right) => {
                Formula::binary(*op, left.normalized(), right.normalized())
            }
        }
    }

    /// Propositional value under the given set of true atoms.
    ///
    /// Only constants, variables, `!`, `&&`, `||` and `->` have a value;
    /// temporal operators yield [`FormulaError::TemporalEvaluation`].
    pub fn evaluate(&self, true_atoms: &BTreeSet<String>) -> Result<bool, FormulaError> {
        match self {
            Formula::Atom(Atom::True) => Ok(true),
            Formula::Atom(Atom::False) => Ok(false),
            Formula::Atom(Atom::Var(name)) => Ok(true_atoms.contains(name)),
            Formula::Unary(UnaryOp::Neg, inner) => Ok(!inner.evaluate(true_atoms)?),
            Formula::Unary(op, _) => Err(self.temporal_error(op.symbol())),
            Formula::Binary(op @ (BinaryOp::And | BinaryOp::Or | BinaryOp::Implies), left, right) => {
                let left = left.evaluate(true_atoms)?;
                let right = right.evaluate(true_atoms)?;
                Ok(match op {
                    BinaryOp::And => left && right,
                    BinaryOp::Or => left || right,
                    _ => !left || right,
                })
            }
            Formula::Binary(op, _, _) => Err(self.temporal_error(op.symbol())),
        }
    }

    fn temporal_error(&self, operator: &str) -> FormulaError {
        FormulaError::TemporalEvaluation {
            operator: operator.to_string(),
            formula: self.to_string(),
        }
    }

    /// Variable names occurring in the formula.
    ///
    /// `None` collects every name, `Some(true)` only names occurring without
    /// a negation directly above them, `Some(false)` only names occurring
    /// directly under a single `!`.
    pub fn propositions(&self, polarity: Option<bool>) -> BTreeSet<String> {
        let mut names = BTreeSet::new();
        self.collect_propositions(polarity, &mut names);
        names
    }

    fn collect_propositions(&self, polarity: Option<bool>, names: &mut BTreeSet<String>) {
        match self {
            Formula::Atom(Atom::Var(name)) => {
                if polarity != Some(false) {
                    names.insert(name.clone());
                }
            }
            Formula::Atom(_) => {}
            Formula::Unary(UnaryOp::Neg, inner) => match inner.as_ref() {
                Formula::Atom(Atom::Var(name)) => {
                    if polarity != Some(true) {
                        names.insert(name.clone());
                    }
                }
                other => other.collect_propositions(polarity, names),
            },
            Formula::Unary(_, inner) => inner.collect_propositions(polarity, names),
            Formula::Binary(_, left, right) => {
                left.collect_propositions(polarity, names);
                right.collect_propositions(polarity, names);
            }
        }
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Atom::False => f.write_str("0"),
            Atom::True => f.write_str("1"),
            Atom::Var(name) => f.write_str(name),
        }
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Formula::Atom(atom) => write!(f, "{atom}"),
            Formula::Unary(UnaryOp::Neg, inner) => write!(f, "!{inner}"),
            Formula::Unary(op, inner) => write!(f, "{} {inner}", op.symbol()),
            Formula::Binary(op, left, right) => write!(f, "({left} {} {right})", op.symbol()),
        }
    }
}

impl Serialize for Formula {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl FromStr for Formula {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}
