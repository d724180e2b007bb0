//! # Transition Table
//!
//! Runtime resolution over the declared transition defs. Resolution
//! distinguishes a name that is absent from the table from a name that
//! exists but is not allowed from the current state — callers get told
//! which mistake they made.

use serde::{Deserialize, Serialize};

use statefield_core::{StateId, TransitionName};

use crate::error::MachineError;
use crate::spec::TransitionDef;

/// The compiled transition table of a machine definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionTable {
    defs: Vec<TransitionDef>,
}

impl TransitionTable {
    /// Build a table from defs in declaration order.
    pub fn new(defs: Vec<TransitionDef>) -> Self {
        Self { defs }
    }

    /// The defs, in declaration order.
    pub fn defs(&self) -> &[TransitionDef] {
        &self.defs
    }

    /// Resolve `name` fired from `from`.
    ///
    /// Returns the first def whose name matches and whose `from` set
    /// contains the current state. A name with no matching def at all is
    /// `UnknownTransition`; a known name not allowed from `from` is
    /// `IllegalTransition`.
    pub fn resolve(&self, from: &StateId, name: &str) -> Result<&TransitionDef, MachineError> {
        let mut known = false;
        for def in &self.defs {
            if def.name == name {
                known = true;
                if def.from.contains(from) {
                    return Ok(def);
                }
            }
        }
        if known {
            Err(MachineError::IllegalTransition {
                transition: TransitionName::from(name),
                from: from.clone(),
            })
        } else {
            Err(MachineError::UnknownTransition {
                transition: TransitionName::from(name),
            })
        }
    }

    /// Whether `name` may fire from `from`.
    pub fn can(&self, from: &StateId, name: &str) -> bool {
        self.defs
            .iter()
            .any(|def| def.name == name && def.from.contains(from))
    }

    /// Transition names allowed from `from`, declaration order, deduplicated.
    pub fn transitions_from(&self, from: &StateId) -> Vec<TransitionName> {
        let mut names = Vec::new();
        for def in &self.defs {
            if def.from.contains(from) && !names.contains(&def.name) {
                names.push(def.name.clone());
            }
        }
        names
    }

    /// Every declared transition name, declaration order, deduplicated.
    pub fn transition_names(&self) -> Vec<TransitionName> {
        let mut names = Vec::new();
        for def in &self.defs {
            if !names.contains(&def.name) {
                names.push(def.name.clone());
            }
        }
        names
    }

    /// Every state mentioned by the table (sources then destination, per
    /// def), first appearance order, deduplicated.
    pub fn states(&self) -> Vec<StateId> {
        let mut states = Vec::new();
        for def in &self.defs {
            for state in def.from.iter().chain(std::iter::once(&def.to)) {
                if !states.contains(state) {
                    states.push(state.clone());
                }
            }
        }
        states
    }
}
