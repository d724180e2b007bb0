//! # statefield-machine — Runtime State Machine Engine
//!
//! A data-driven finite-state machine: states and transitions are values
//! supplied at runtime, not types. A machine is described by a
//! [`MachineSpec`] (initial state, transition table, optional enter-state
//! hook), compiled once into a shared [`MachineDefinition`], and attached to
//! any host implementing [`MachineHost`] as a per-host [`Machine`] handle.
//!
//! ## Design
//!
//! - **The table is data.** [`TransitionDef`] triples (`name`, `from` set,
//!   `to`) resolve at invocation time; an unknown name and a known name
//!   fired from the wrong state are distinct errors.
//! - **Hosts expose a slot, the engine does the rest.** [`MachineHost`] is
//!   the one capability a host provides (access to its optional handle).
//!   The full invocation/query surface — [`StateDriven`] — is a blanket
//!   impl over it.
//! - **Notification is synchronous.** Every successful transition,
//!   including the `init` pseudo-transition fired on attachment and
//!   self-loop transitions, runs the definition's enter-state hook before
//!   the invocation returns. Hook failures surface after the state has
//!   advanced; there is no rollback.

pub mod error;
pub mod machine;
pub mod spec;
pub mod table;

// ─── Re-exports ─────────────────────────────────────────────────────

pub use error::{HookError, MachineError};
pub use machine::{Machine, MachineHost, StateDriven, TransitionRecord, INIT_TRANSITION};
pub use spec::{
    EnterStateEvent, EnterStateHook, MachineDefinition, MachineSpec, MachineSpecBuilder,
    TransitionDef,
};
pub use table::TransitionTable;
