//! Kripke structures: the system models being verified.
//!
//! A structure is an ordered list of named states, each labelled with the
//! atomic propositions true in it, plus a successor relation. Structures
//! are built with [`KripkeBuilder`] or loaded from JSON:
//!
//! ```json
//! {
//!   "states": [{ "name": "idle", "initial": true, "atoms": [] }],
//!   "transitions": [{ "source": "idle", "destinations": ["idle"] }]
//! }
//! ```

use crate::automaton::Letter;
use crate::error::{KripkeError, LtlResult};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;
use tracing::{debug, warn};

/// One state of a [`KripkeStructure`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KripkeState {
    name: String,
    #[serde(default)]
    initial: bool,
    #[serde(default)]
    atoms: BTreeSet<String>,
}

impl KripkeState {
    pub fn new<I, A>(name: impl Into<String>, atoms: I, initial: bool) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<String>,
    {
        Self {
            name: name.into(),
            initial,
            atoms: atoms.into_iter().map(Into::into).collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_initial(&self) -> bool {
        self.initial
    }

    pub fn atoms(&self) -> &BTreeSet<String> {
        &self.atoms
    }

    /// The state's atoms as an alphabet symbol.
    pub fn letter(&self) -> Letter {
        Letter::from(self.atoms.clone())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct TransitionRecord {
    source: String,
    #[serde(default)]
    destinations: Vec<String>,
}

/// On-disk shape of a structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct KripkeDocument {
    states: Vec<KripkeState>,
    #[serde(default)]
    transitions: Vec<TransitionRecord>,
}

/// A validated Kripke structure.
///
/// Every transition endpoint names a declared state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "KripkeDocument", into = "KripkeDocument")]
pub struct KripkeStructure {
    states: Vec<KripkeState>,
    index: HashMap<String, usize>,
    successors: BTreeMap<String, BTreeSet<String>>,
}

impl KripkeStructure {
    pub fn builder() -> KripkeBuilder {
        KripkeBuilder::default()
    }

    /// Parse a structure from JSON text.
    pub fn from_json_str(json: &str) -> LtlResult<Self> {
        let document: KripkeDocument = serde_json::from_str(json)?;
        Ok(Self::try_from(document)?)
    }

    /// Load a structure from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> LtlResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| KripkeError::Read {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let structure = Self::from_json_str(&json)?;
        debug!(
            path = %path.display(),
            states = structure.len(),
            "Loaded Kripke structure"
        );
        Ok(structure)
    }

    pub fn to_json_string(&self) -> LtlResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the structure to a JSON file.
    pub fn to_file(&self, path: impl AsRef<Path>) -> LtlResult<()> {
        let path = path.as_ref();
        std::fs::write(path, self.to_json_string()?)?;
        debug!(path = %path.display(), states = self.len(), "Saved Kripke structure");
        Ok(())
    }

    /// States in declaration order.
    pub fn states(&self) -> impl Iterator<Item = &KripkeState> {
        self.states.iter()
    }

    pub fn state(&self, name: &str) -> Option<&KripkeState> {
        self.index.get(name).map(|&i| &self.states[i])
    }

    pub fn initial_states(&self) -> impl Iterator<Item = &KripkeState> {
        self.states.iter().filter(|state| state.is_initial())
    }

    /// Successors of `name`, empty for unknown names and deadlocks.
    pub fn successors<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a KripkeState> + 'a {
        self.successors
            .get(name)
            .into_iter()
            .flatten()
            .filter_map(move |target| self.state(target))
    }

    pub fn has_transition(&self, from: &str, to: &str) -> bool {
        self.successors
            .get(from)
            .is_some_and(|targets| targets.contains(to))
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

impl TryFrom<KripkeDocument> for KripkeStructure {
    type Error = KripkeError;

    fn try_from(document: KripkeDocument) -> Result<Self, Self::Error> {
        let mut builder = KripkeBuilder::default();
        for state in document.states {
            builder = builder.with_kripke_state(state);
        }
        for record in document.transitions {
            for destination in &record.destinations {
                builder = builder.with_transition(&record.source, destination);
            }
        }
        builder.build()
    }
}

impl From<KripkeStructure> for KripkeDocument {
    fn from(structure: KripkeStructure) -> Self {
        let transitions = structure
            .successors
            .into_iter()
            .map(|(source, destinations)| TransitionRecord {
                source,
                destinations: destinations.into_iter().collect(),
            })
            .collect();
        KripkeDocument {
            states: structure.states,
            transitions,
        }
    }
}

/// Builder for [`KripkeStructure`]. References are checked in
/// [`build`](KripkeBuilder::build).
#[derive(Debug, Clone, Default)]
pub struct KripkeBuilder {
    states: Vec<KripkeState>,
    index: HashMap<String, usize>,
    transitions: Vec<(String, String)>,
}

impl KripkeBuilder {
    /// Declare a state. Redeclaring a name replaces the earlier state in
    /// place.
    pub fn with_state<I, A>(self, name: impl Into<String>, atoms: I, initial: bool) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<String>,
    {
        self.with_kripke_state(KripkeState::new(name, atoms, initial))
    }

    fn with_kripke_state(mut self, state: KripkeState) -> Self {
        match self.index.get(state.name()) {
            Some(&i) => {
                warn!(state = %state.name(), "Duplicate Kripke state, overwriting");
                self.states[i] = state;
            }
            None => {
                self.index.insert(state.name().to_string(), self.states.len());
                self.states.push(state);
            }
        }
        self
    }

    pub fn with_transition(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.transitions.push((from.into(), to.into()));
        self
    }

    pub fn build(self) -> Result<KripkeStructure, KripkeError> {
        let mut successors: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for (from, to) in self.transitions {
            for label in [&from, &to] {
                if !self.index.contains_key(label) {
                    return Err(KripkeError::UnknownState {
                        label: label.clone(),
                    });
                }
            }
            successors.entry(from).or_default().insert(to);
        }

        for state in &self.states {
            if !successors.contains_key(state.name()) {
                debug!(state = %state.name(), "Kripke state has no successors");
            }
        }

        Ok(KripkeStructure {
            states: self.states,
            index: self.index,
            successors,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OVEN: &str = r#"{
        "states": [
            { "name": "idle", "initial": true, "atoms": [] },
            { "name": "closed", "atoms": ["close"] },
            { "name": "cooking", "atoms": ["close", "start", "cooking"] }
        ],
        "transitions": [
            { "source": "idle", "destinations": ["closed"] },
            { "source": "closed", "destinations": ["idle", "cooking"] },
            { "source": "cooking", "destinations": ["cooking", "closed"] }
        ]
    }"#;

    #[test]
    fn parses_json() {
        let kripke = KripkeStructure::from_json_str(OVEN).unwrap();
        assert_eq!(kripke.len(), 3);
        assert_eq!(
            kripke.states().map(KripkeState::name).collect::<Vec<_>>(),
            vec!["idle", "closed", "cooking"]
        );
        assert_eq!(
            kripke.initial_states().map(KripkeState::name).collect::<Vec<_>>(),
            vec!["idle"]
        );
        assert!(!kripke.state("closed").unwrap().is_initial());
        assert!(kripke.has_transition("closed", "cooking"));
        assert!(!kripke.has_transition("idle", "cooking"));
        assert_eq!(
            kripke.successors("cooking").map(KripkeState::name).collect::<Vec<_>>(),
            vec!["closed", "cooking"]
        );
    }

    #[test]
    fn json_round_trips() {
        let kripke = KripkeStructure::from_json_str(OVEN).unwrap();
        let json = kripke.to_json_string().unwrap();
        assert_eq!(KripkeStructure::from_json_str(&json).unwrap(), kripke);
    }

    #[test]
    fn unknown_destination_is_rejected() {
        let json = r#"{
            "states": [{ "name": "a", "initial": true }],
            "transitions": [{ "source": "a", "destinations": ["b"] }]
        }"#;
        let err = KripkeStructure::from_json_str(json).unwrap_err();
        assert!(matches!(
            err,
            crate::Error::Kripke(KripkeError::UnknownState { ref label }) if label == "b"
        ));
    }

    #[test]
    fn malformed_json_is_rejected() {
        let err = KripkeStructure::from_json_str("{ \"states\": 3 }").unwrap_err();
        assert!(matches!(err, crate::Error::Json(_)));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = KripkeStructure::from_file(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, crate::Error::Kripke(KripkeError::Read { .. })));
    }

    #[test]
    fn file_round_trips() {
        let kripke = KripkeStructure::from_json_str(OVEN).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("oven.json");
        kripke.to_file(&path).unwrap();
        assert_eq!(KripkeStructure::from_file(&path).unwrap(), kripke);
    }

    #[test]
    fn write_into_missing_directory_is_an_io_error() {
        let kripke = KripkeStructure::from_json_str(OVEN).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let err = kripke.to_file(dir.path().join("absent").join("oven.json")).unwrap_err();
        assert!(matches!(err, crate::Error::Io(_)));
    }

    #[test]
    fn builder_overwrites_duplicates_in_place() {
        let kripke = KripkeStructure::builder()
            .with_state("a", ["p"], true)
            .with_state("b", Vec::<String>::new(), false)
            .with_state("a", ["q"], false)
            .with_transition("a", "b")
            .with_transition("b", "a")
            .build()
            .unwrap();
        assert_eq!(kripke.len(), 2);
        let first = kripke.states().next().unwrap();
        assert_eq!(first.name(), "a");
        assert!(first.atoms().contains("q"));
        assert!(!first.is_initial());
    }

    #[test]
    fn builder_rejects_unknown_source() {
        let err = KripkeStructure::builder()
            .with_state("a", ["p"], true)
            .with_transition("x", "a")
            .build()
            .unwrap_err();
        assert!(matches!(err, KripkeError::UnknownState { ref label } if label == "x"));
    }
}
