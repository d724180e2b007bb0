//! # Machine Handle and Host Surface
//!
//! A [`Machine`] is the per-host handle of a running state machine: the
//! current state, a shared reference to the compiled definition, and the
//! transition history. Hosts expose a slot for it through [`MachineHost`];
//! everything else — invocation, queries, enumerations — arrives as the
//! blanket [`StateDriven`] impl.
//!
//! ## Invariant
//!
//! A handle is owned by exactly one host and lives exactly as long as that
//! host. It is never shared across hosts and never serialized; persistence
//! of the state it mirrors is the host's concern.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use statefield_core::{StateId, Timestamp, TransitionName};

use crate::error::MachineError;
use crate::spec::{EnterStateEvent, MachineDefinition};

/// Name of the pseudo-transition fired when a machine is attached.
pub const INIT_TRANSITION: &str = "init";

// ─── Transition Record ──────────────────────────────────────────────

/// Record of one fired transition in a handle's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionRecord {
    /// The transition that fired.
    pub transition: TransitionName,
    /// State before the transition; `None` for the `init` pseudo-transition.
    pub from: Option<StateId>,
    /// State entered.
    pub to: StateId,
    /// When the transition fired (UTC).
    pub at: Timestamp,
}

impl TransitionRecord {
    fn of(event: &EnterStateEvent) -> Self {
        Self {
            transition: event.transition.clone(),
            from: event.from.clone(),
            to: event.to.clone(),
            at: Timestamp::now(),
        }
    }
}

// ─── Host Capability ────────────────────────────────────────────────

/// The one capability a host type provides to the engine: access to its
/// optional machine slot.
pub trait MachineHost: Sized {
    /// The attached handle, if any.
    fn machine(&self) -> Option<&Machine<Self>>;

    /// Mutable access to the slot the handle lives in.
    fn machine_slot(&mut self) -> &mut Option<Machine<Self>>;
}

// ─── The Handle ─────────────────────────────────────────────────────

/// A running state machine attached to one host.
pub struct Machine<H> {
    definition: Arc<MachineDefinition<H>>,
    current: StateId,
    history: Vec<TransitionRecord>,
}

impl<H> Machine<H> {
    /// The state the machine is currently in.
    pub fn current_state(&self) -> &StateId {
        &self.current
    }

    /// The shared definition this handle runs.
    pub fn definition(&self) -> &Arc<MachineDefinition<H>> {
        &self.definition
    }

    /// Every transition this handle has fired, oldest first. The `init`
    /// pseudo-transition is not recorded — attachment is not a transition.
    pub fn history(&self) -> &[TransitionRecord] {
        &self.history
    }
}

impl<H> std::fmt::Debug for Machine<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Machine")
            .field("current", &self.current)
            .field("transitions_fired", &self.history.len())
            .finish()
    }
}

impl<H: MachineHost> Machine<H> {
    /// Attach a fresh handle to `host`, starting in `initial_override` if
    /// given, else the definition's declared initial state.
    ///
    /// The handle is placed in the host's slot first; the enter-state hook
    /// then fires once with the `init` pseudo-event (`from: None`), so the
    /// hook observes a host whose machine is already attached. Re-attaching
    /// replaces any previous handle.
    pub fn attach(
        host: &mut H,
        definition: Arc<MachineDefinition<H>>,
        initial_override: Option<StateId>,
    ) -> Result<(), MachineError> {
        let initial = initial_override.unwrap_or_else(|| definition.initial_state().clone());
        let event = EnterStateEvent {
            transition: TransitionName::from(INIT_TRANSITION),
            from: None,
            to: initial.clone(),
        };
        let hook = definition.on_enter_state().cloned();
        *host.machine_slot() = Some(Machine {
            definition,
            current: initial,
            history: Vec::new(),
        });
        if let Some(hook) = hook {
            hook(host, &event).map_err(|source| MachineError::Hook {
                transition: event.transition.clone(),
                source,
            })?;
        }
        Ok(())
    }

    /// Fire transition `name` on `host`.
    ///
    /// Resolution failures (`UnknownTransition`, `IllegalTransition`) leave
    /// the state untouched. On success the current state advances and a
    /// history record is appended before the enter-state hook runs; a hook
    /// failure therefore reports a transition that has already happened.
    pub fn invoke(host: &mut H, name: &str) -> Result<(), MachineError> {
        let (definition, from) = match host.machine() {
            Some(machine) => (machine.definition.clone(), machine.current.clone()),
            None => return Err(MachineError::NotAttached),
        };

        let def = definition.table().resolve(&from, name)?;
        let event = EnterStateEvent {
            transition: def.name.clone(),
            from: Some(from),
            to: def.to.clone(),
        };

        if let Some(machine) = host.machine_slot().as_mut() {
            machine.current = event.to.clone();
            machine.history.push(TransitionRecord::of(&event));
        }

        if let Some(hook) = definition.on_enter_state() {
            hook(host, &event).map_err(|source| MachineError::Hook {
                transition: event.transition.clone(),
                source,
            })?;
        }
        Ok(())
    }
}

// ─── Invocation / Query Surface ─────────────────────────────────────

/// The surface a bound host exposes to its callers.
///
/// Blanket-implemented for every [`MachineHost`]; these names are what the
/// reserved-identifier set protects.
pub trait StateDriven {
    /// Fire a transition by name.
    fn invoke(&mut self, transition: &str) -> Result<(), MachineError>;

    /// The current state, if a machine is attached.
    fn state(&self) -> Option<&StateId>;

    /// Whether the machine is currently in `state`.
    fn is(&self, state: &str) -> bool;

    /// Whether `transition` may fire from the current state.
    fn can(&self, transition: &str) -> bool;

    /// Negation of [`StateDriven::can`].
    fn cannot(&self, transition: &str) -> bool;

    /// Transitions allowed from the current state.
    fn transitions(&self) -> Vec<TransitionName>;

    /// Every transition the machine declares.
    fn all_transitions(&self) -> Vec<TransitionName>;

    /// Every state the machine declares.
    fn all_states(&self) -> Vec<StateId>;

    /// Transitions fired so far, oldest first.
    fn history(&self) -> &[TransitionRecord];
}

impl<H: MachineHost> StateDriven for H {
    fn invoke(&mut self, transition: &str) -> Result<(), MachineError> {
        Machine::invoke(self, transition)
    }

    fn state(&self) -> Option<&StateId> {
        self.machine().map(Machine::current_state)
    }

    fn is(&self, state: &str) -> bool {
        self.state().is_some_and(|current| *current == *state)
    }

    fn can(&self, transition: &str) -> bool {
        self.machine()
            .is_some_and(|m| m.definition.table().can(&m.current, transition))
    }

    fn cannot(&self, transition: &str) -> bool {
        !self.can(transition)
    }

    fn transitions(&self) -> Vec<TransitionName> {
        self.machine()
            .map(|m| m.definition.table().transitions_from(&m.current))
            .unwrap_or_default()
    }

    fn all_transitions(&self) -> Vec<TransitionName> {
        self.machine()
            .map(|m| m.definition.table().transition_names())
            .unwrap_or_default()
    }

    fn all_states(&self) -> Vec<StateId> {
        self.machine()
            .map(|m| m.definition.states())
            .unwrap_or_default()
    }

    fn history(&self) -> &[TransitionRecord] {
        self.machine().map(Machine::history).unwrap_or(&[])
    }
}
