//! # Schema Definition
//!
//! A schema declares the fields its documents carry and records the
//! extension surfaces consumed at instantiation time: per-field setter
//! chains and the construct/hydrate lifecycle hook lists. Registration and
//! instantiation are separate phases — a schema is mutated only during
//! setup, then shared read-only behind an `Arc` by every document and
//! store built from it.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use statefield_core::FieldName;

use crate::document::Document;
use crate::error::DocumentError;

/// Whether a field holds a stored value or is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldKind {
    /// Stored on the document and persisted.
    Real,
    /// Declared on the schema but never stored.
    Virtual,
}

/// One declared field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDef {
    /// The field's name.
    pub name: FieldName,
    /// Real or virtual.
    pub kind: FieldKind,
    /// Value a freshly constructed document starts with, if any.
    pub default: Option<Value>,
}

/// The single state-machine binding a schema may carry: which field is
/// bound, and whether its write path is guarded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldBinding {
    /// The bound field.
    pub field_name: FieldName,
    /// Whether assignments outside a transition are intercepted.
    pub guarded: bool,
}

/// Per-field write interceptor: receives the document and the candidate
/// value, returns the value to actually store.
pub type SetterFn = Arc<dyn Fn(&Document, Value) -> Result<Value, DocumentError> + Send + Sync>;

/// Lifecycle hook invoked with the document as receiver.
pub type LifecycleHook = Arc<dyn Fn(&mut Document) -> Result<(), DocumentError> + Send + Sync>;

/// A document schema.
pub struct Schema {
    name: String,
    fields: Vec<FieldDef>,
    setters: BTreeMap<FieldName, Vec<SetterFn>>,
    construct_hooks: Vec<LifecycleHook>,
    hydrate_hooks: Vec<LifecycleHook>,
    state_binding: Option<FieldBinding>,
}

impl Schema {
    /// Start declaring a schema.
    pub fn builder(name: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// The schema's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared fields, declaration order.
    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    /// Look up a declared field.
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|def| def.name == name)
    }

    /// Whether `name` is declared as a real (stored) field.
    pub fn has_real_field(&self, name: &str) -> bool {
        self.field(name)
            .is_some_and(|def| def.kind == FieldKind::Real)
    }

    /// Append an interceptor to `field`'s setter chain. Chains run in
    /// registration order on every assignment through [`Document::set`],
    /// each feeding the next.
    pub fn add_setter(&mut self, field: &FieldName, setter: SetterFn) -> Result<(), DocumentError> {
        if self.field(field.as_str()).is_none() {
            return Err(DocumentError::UnknownField {
                schema: self.name.clone(),
                field: field.clone(),
            });
        }
        self.setters.entry(field.clone()).or_default().push(setter);
        Ok(())
    }

    pub(crate) fn setters(&self, field: &FieldName) -> &[SetterFn] {
        self.setters.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Register a hook to run when a document is freshly constructed.
    pub fn on_construct(&mut self, hook: LifecycleHook) {
        self.construct_hooks.push(hook);
    }

    /// Register a hook to run when a document is hydrated from storage.
    pub fn on_hydrate(&mut self, hook: LifecycleHook) {
        self.hydrate_hooks.push(hook);
    }

    pub(crate) fn construct_hooks(&self) -> &[LifecycleHook] {
        &self.construct_hooks
    }

    pub(crate) fn hydrate_hooks(&self) -> &[LifecycleHook] {
        &self.hydrate_hooks
    }

    /// The state-machine binding, if one has been installed.
    pub fn state_binding(&self) -> Option<&FieldBinding> {
        self.state_binding.as_ref()
    }

    /// Record the state-machine binding. One per schema.
    pub fn set_state_binding(&mut self, binding: FieldBinding) {
        self.state_binding = Some(binding);
    }
}

impl std::fmt::Debug for Schema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Schema")
            .field("name", &self.name)
            .field("fields", &self.fields)
            .field("state_binding", &self.state_binding)
            .field("construct_hooks", &self.construct_hooks.len())
            .field("hydrate_hooks", &self.hydrate_hooks.len())
            .finish()
    }
}

/// Builder for [`Schema`].
pub struct SchemaBuilder {
    name: String,
    fields: Vec<FieldDef>,
}

impl SchemaBuilder {
    /// Declare a real (stored) field.
    pub fn real_field(mut self, name: impl Into<FieldName>) -> Self {
        self.fields.push(FieldDef {
            name: name.into(),
            kind: FieldKind::Real,
            default: None,
        });
        self
    }

    /// Declare a real field with a construction-time default.
    pub fn real_field_default(mut self, name: impl Into<FieldName>, default: Value) -> Self {
        self.fields.push(FieldDef {
            name: name.into(),
            kind: FieldKind::Real,
            default: Some(default),
        });
        self
    }

    /// Declare a virtual (computed, never stored) field.
    pub fn virtual_field(mut self, name: impl Into<FieldName>) -> Self {
        self.fields.push(FieldDef {
            name: name.into(),
            kind: FieldKind::Virtual,
            default: None,
        });
        self
    }

    /// Finish the schema.
    pub fn build(self) -> Schema {
        Schema {
            name: self.name,
            fields: self.fields,
            setters: BTreeMap::new(),
            construct_hooks: Vec::new(),
            hydrate_hooks: Vec::new(),
            state_binding: None,
        }
    }
}
