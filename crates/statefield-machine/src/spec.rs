//! # Machine Specification
//!
//! The caller-facing description of a state machine: declared initial
//! state, transition table, and optional enter-state hook. A spec is
//! immutable input — consumers read it and may wrap (never replace) its
//! hook before compiling it into a shared [`MachineDefinition`].

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use statefield_core::{StateId, TransitionName};

use crate::error::HookError;
use crate::table::TransitionTable;

// ─── Notification Contract ──────────────────────────────────────────

/// The payload delivered to the enter-state hook on every successful
/// transition.
///
/// `from` is `None` for the `init` pseudo-transition fired when a machine
/// is attached to its host; every real transition carries a source state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnterStateEvent {
    /// The transition that fired.
    pub transition: TransitionName,
    /// State before the transition, if any.
    pub from: Option<StateId>,
    /// State entered by the transition.
    pub to: StateId,
}

/// Enter-state hook: invoked synchronously with the host as receiver.
pub type EnterStateHook<H> =
    Arc<dyn Fn(&mut H, &EnterStateEvent) -> Result<(), HookError> + Send + Sync>;

// ─── Transition Definitions ─────────────────────────────────────────

/// One row of a machine's transition table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionDef {
    /// Name callers invoke the transition by.
    pub name: TransitionName,
    /// States the transition is allowed from.
    pub from: Vec<StateId>,
    /// State the transition moves to.
    pub to: StateId,
}

// ─── Machine Spec ───────────────────────────────────────────────────

/// A state machine specification, generic over the host type its hook
/// receives.
pub struct MachineSpec<H> {
    /// The state a freshly attached machine starts in.
    pub initial_state: StateId,
    /// The transition table, in declaration order.
    pub transitions: Vec<TransitionDef>,
    /// Caller-supplied enter-state hook, if any.
    pub on_enter_state: Option<EnterStateHook<H>>,
}

impl<H> MachineSpec<H> {
    /// Start building a spec with the given initial state.
    pub fn builder(initial_state: impl Into<StateId>) -> MachineSpecBuilder<H> {
        MachineSpecBuilder {
            initial_state: initial_state.into(),
            transitions: Vec::new(),
            on_enter_state: None,
        }
    }
}

/// Builder for [`MachineSpec`].
pub struct MachineSpecBuilder<H> {
    initial_state: StateId,
    transitions: Vec<TransitionDef>,
    on_enter_state: Option<EnterStateHook<H>>,
}

impl<H> MachineSpecBuilder<H> {
    /// Declare a transition `name` allowed from each state in `from`,
    /// moving to `to`.
    pub fn transition<I, S>(
        mut self,
        name: impl Into<TransitionName>,
        from: I,
        to: impl Into<StateId>,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<StateId>,
    {
        self.transitions.push(TransitionDef {
            name: name.into(),
            from: from.into_iter().map(Into::into).collect(),
            to: to.into(),
        });
        self
    }

    /// Install the caller's enter-state hook.
    pub fn on_enter_state<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut H, &EnterStateEvent) -> Result<(), HookError> + Send + Sync + 'static,
    {
        self.on_enter_state = Some(Arc::new(hook));
        self
    }

    /// Finish the spec.
    pub fn build(self) -> MachineSpec<H> {
        MachineSpec {
            initial_state: self.initial_state,
            transitions: self.transitions,
            on_enter_state: self.on_enter_state,
        }
    }
}

// ─── Compiled Definition ────────────────────────────────────────────

/// The compiled, shareable form of a machine spec.
///
/// Built once per schema and shared read-only (via `Arc`) by every handle
/// attached from it. Holds the table and the final, possibly wrapped,
/// enter-state hook.
pub struct MachineDefinition<H> {
    initial_state: StateId,
    table: TransitionTable,
    on_enter_state: Option<EnterStateHook<H>>,
}

impl<H> MachineDefinition<H> {
    /// Compile a definition from its parts.
    pub fn new(
        initial_state: StateId,
        transitions: Vec<TransitionDef>,
        on_enter_state: Option<EnterStateHook<H>>,
    ) -> Self {
        Self {
            initial_state,
            table: TransitionTable::new(transitions),
            on_enter_state,
        }
    }

    /// Compile a spec as-is, keeping its hook unwrapped.
    pub fn from_spec(spec: MachineSpec<H>) -> Self {
        Self::new(spec.initial_state, spec.transitions, spec.on_enter_state)
    }

    /// The declared initial state.
    pub fn initial_state(&self) -> &StateId {
        &self.initial_state
    }

    /// The compiled transition table.
    pub fn table(&self) -> &TransitionTable {
        &self.table
    }

    /// The enter-state hook, if any.
    pub fn on_enter_state(&self) -> Option<&EnterStateHook<H>> {
        self.on_enter_state.as_ref()
    }

    /// Every state the machine can be in: the initial state followed by
    /// the table's states, first appearance order, deduplicated.
    pub fn states(&self) -> Vec<StateId> {
        let mut states = vec![self.initial_state.clone()];
        for state in self.table.states() {
            if !states.contains(&state) {
                states.push(state);
            }
        }
        states
    }
}

impl<H> std::fmt::Debug for MachineDefinition<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MachineDefinition")
            .field("initial_state", &self.initial_state)
            .field("table", &self.table)
            .field("on_enter_state", &self.on_enter_state.is_some())
            .finish()
    }
}
