//! Alphabet symbols over atomic propositions.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// The set of atomic propositions true at one position of a word.
///
/// The empty letter matches every position once the alphabet has been
/// projected onto an empty proposition set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Letter(BTreeSet<String>);

impl Letter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, atom: &str) -> bool {
        self.0.contains(atom)
    }

    pub fn insert(&mut self, atom: impl Into<String>) -> bool {
        self.0.insert(atom.into())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn atoms(&self) -> &BTreeSet<String> {
        &self.0
    }

    /// Keep only the atoms in `propositions`.
    pub fn project(&self, propositions: &BTreeSet<String>) -> Letter {
        Letter(self.0.intersection(propositions).cloned().collect())
    }
}

impl From<BTreeSet<String>> for Letter {
    fn from(atoms: BTreeSet<String>) -> Self {
        Letter(atoms)
    }
}

impl<A: Into<String>> FromIterator<A> for Letter {
    fn from_iter<I: IntoIterator<Item = A>>(iter: I) -> Self {
        Letter(iter.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for Letter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, atom) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(atom)?;
        }
        f.write_str("}")
    }
}
