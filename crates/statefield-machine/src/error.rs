//! # Machine Errors
//!
//! Failure modes of transition invocation. Errors carry the identifiers at
//! fault so callers can report them without re-deriving context.

use thiserror::Error;

use statefield_core::{StateId, TransitionName};

/// Boxed failure returned by an enter-state hook.
///
/// Hooks compose caller-supplied behavior with binding-layer
/// synchronization, so their failure type is open-ended.
pub type HookError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised by machine attachment and transition invocation.
#[derive(Error, Debug)]
pub enum MachineError {
    /// The transition name does not appear in the machine's table at all.
    #[error("unknown transition '{transition}'")]
    UnknownTransition {
        /// The unrecognized transition name.
        transition: TransitionName,
    },

    /// The transition exists but is not allowed from the current state.
    #[error("invalid transition '{transition}' from state '{from}'")]
    IllegalTransition {
        /// The attempted transition.
        transition: TransitionName,
        /// The state the machine was in.
        from: StateId,
    },

    /// The host has no machine attached.
    #[error("no state machine is attached to this host")]
    NotAttached,

    /// The enter-state hook failed. The state had already advanced when
    /// the hook ran; it is not rolled back.
    #[error("enter-state hook failed during '{transition}': {source}")]
    Hook {
        /// The transition whose notification failed.
        transition: TransitionName,
        /// The underlying hook failure.
        #[source]
        source: HookError,
    },
}
