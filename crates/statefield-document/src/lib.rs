//! # statefield-document — Document Layer
//!
//! Schemas, documents, and an in-memory store. A [`Schema`] declares fields
//! (real or virtual, with optional defaults) and carries the two extension
//! surfaces the binding layer consumes:
//!
//! - **Setter chains** — per-field interceptors run on every assignment
//!   through [`Document::set`], each receiving the document and the
//!   candidate value and returning the value to actually store.
//! - **Lifecycle hooks** — two-phase: registration records closures on the
//!   schema; instantiation invokes them in registration order, construct
//!   hooks for [`Document::new`], hydrate hooks for [`Document::hydrate`].
//!   Exactly one of the two phases runs per document instance.
//!
//! Every [`Document`] carries a machine slot ([`MachineHost`]) and a
//! [`WriteGate`], so a bound schema's documents expose the full
//! state-machine surface while keeping the bound field's write path
//! guarded.
//!
//! [`MachineHost`]: statefield_machine::MachineHost

pub mod document;
pub mod error;
pub mod schema;
pub mod store;

// ─── Re-exports ─────────────────────────────────────────────────────

pub use document::{Document, WriteGate};
pub use error::DocumentError;
pub use schema::{
    FieldBinding, FieldDef, FieldKind, LifecycleHook, Schema, SchemaBuilder, SetterFn,
};
pub use store::DocumentStore;
