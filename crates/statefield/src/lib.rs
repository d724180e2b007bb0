//! # statefield — State Machines Bound to Document Fields
//!
//! Attach a finite-state machine to one field of a persisted document so
//! that transitions are the only way the field changes, while the field
//! always reflects the machine's current state — across construction,
//! mutation, persistence, and reload from storage.
//!
//! The binding composes three layers:
//!
//! - [`statefield_machine`] — the engine: data-driven transition tables,
//!   per-document handles, the [`StateDriven`] invocation/query surface.
//! - [`statefield_document`] — the document layer: schemas with setter
//!   interception and lifecycle hooks, documents, an in-memory store.
//! - [`bind`] (this crate) — the synchronization core: validates the
//!   schema/spec pair, guards the bound field's write path, bridges
//!   enter-state notifications into the one authorized field write, and
//!   attaches a machine on construction (declared initial state) or
//!   hydration (persisted value wins).
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use serde_json::json;
//! use statefield::{
//!     bind_state_machine, BindOptions, Document, DocumentStore, MachineSpec, Schema,
//!     StateDriven,
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut schema = Schema::builder("matter").real_field("matter_state").build();
//! let spec = MachineSpec::builder("solid")
//!     .transition("melt", ["solid"], "liquid")
//!     .transition("vaporize", ["liquid"], "gas")
//!     .build();
//! bind_state_machine(&mut schema, BindOptions::new(spec).field("matter_state"))?;
//!
//! let schema = Arc::new(schema);
//! let mut doc = Document::new(schema.clone())?;
//! assert_eq!(doc.get("matter_state"), Some(&json!("solid")));
//!
//! doc.invoke("melt")?;
//! assert_eq!(doc.get("matter_state"), Some(&json!("liquid")));
//!
//! // Direct assignment outside a transition is a no-op.
//! doc.set("matter_state", json!("plasma"))?;
//! assert_eq!(doc.get("matter_state"), Some(&json!("liquid")));
//!
//! // The persisted value survives a reload, overriding the declared
//! // initial state.
//! let mut store = DocumentStore::new(schema);
//! let id = store.save(&doc);
//! let mut reloaded = store.load(&id)?;
//! assert_eq!(reloaded.get("matter_state"), Some(&json!("liquid")));
//! reloaded.invoke("vaporize")?;
//! assert_eq!(reloaded.get("matter_state"), Some(&json!("gas")));
//! # Ok(())
//! # }
//! ```

pub mod bind;

pub use bind::{bind_state_machine, validate, BindError, BindOptions, GuardPolicy};

// ─── Core re-exports ────────────────────────────────────────────────

pub use statefield_core::{
    is_reserved, DocumentId, FieldName, StateId, Timestamp, TransitionName,
    RESERVED_IDENTIFIERS,
};

// ─── Machine re-exports ─────────────────────────────────────────────

pub use statefield_machine::{
    EnterStateEvent, EnterStateHook, HookError, Machine, MachineDefinition, MachineError,
    MachineHost, MachineSpec, MachineSpecBuilder, StateDriven, TransitionDef, TransitionRecord,
    TransitionTable, INIT_TRANSITION,
};

// ─── Document re-exports ────────────────────────────────────────────

pub use statefield_document::{
    Document, DocumentError, DocumentStore, FieldBinding, FieldDef, FieldKind, LifecycleHook,
    Schema, SchemaBuilder, SetterFn, WriteGate,
};
