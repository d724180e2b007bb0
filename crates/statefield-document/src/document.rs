//! # Documents
//!
//! A document is one instance of a schema: a map of stored field values
//! plus the per-instance state the binding layer relies on — the machine
//! slot and the write gate. Two entry points exist and are mutually
//! exclusive per instance:
//!
//! - [`Document::new`] — fresh construction: field defaults are applied
//!   and the schema's construct hooks run.
//! - [`Document::hydrate`] — load from storage: persisted values are
//!   stored raw, bypassing setter chains (a guarded field must accept its
//!   persisted value without a transition), then the hydrate hooks run.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;

use statefield_core::{DocumentId, FieldName};
use statefield_machine::{Machine, MachineHost};

use crate::error::DocumentError;
use crate::schema::{FieldKind, Schema, SetterFn};

// ─── Write Gate ─────────────────────────────────────────────────────

/// Per-document write authorization for the bound field.
///
/// Starts unauthorized. The binding layer's transition synchronization
/// authorizes exactly one write and revokes immediately after; nothing
/// else is meant to flip the flag. This is a flag, not a lock — all
/// writes to one document happen on one logical call stack.
#[derive(Debug, Default)]
pub struct WriteGate {
    authorized: bool,
}

impl WriteGate {
    /// Permit the next write to the guarded field.
    pub fn authorize(&mut self) {
        self.authorized = true;
    }

    /// Withdraw write permission.
    pub fn revoke(&mut self) {
        self.authorized = false;
    }

    /// Whether a guarded write is currently permitted.
    pub fn is_authorized(&self) -> bool {
        self.authorized
    }
}

// ─── Document ───────────────────────────────────────────────────────

/// One instance of a schema.
pub struct Document {
    id: DocumentId,
    schema: Arc<Schema>,
    values: BTreeMap<FieldName, Value>,
    machine: Option<Machine<Document>>,
    gate: WriteGate,
    is_new: bool,
}

impl Document {
    /// Construct a fresh document: apply field defaults, then run the
    /// schema's construct hooks in registration order.
    pub fn new(schema: Arc<Schema>) -> Result<Self, DocumentError> {
        let mut values = BTreeMap::new();
        for def in schema.fields() {
            if def.kind == FieldKind::Real {
                if let Some(default) = &def.default {
                    values.insert(def.name.clone(), default.clone());
                }
            }
        }

        let mut doc = Self {
            id: DocumentId::new(),
            schema: schema.clone(),
            values,
            machine: None,
            gate: WriteGate::default(),
            is_new: true,
        };
        for hook in schema.construct_hooks() {
            hook(&mut doc)?;
        }
        Ok(doc)
    }

    /// Rebuild a document from persisted values.
    ///
    /// Values are stored raw — setter chains do not run — then the
    /// schema's hydrate hooks run in registration order.
    pub fn hydrate(
        schema: Arc<Schema>,
        id: DocumentId,
        values: BTreeMap<FieldName, Value>,
    ) -> Result<Self, DocumentError> {
        let mut doc = Self {
            id,
            schema: schema.clone(),
            values,
            machine: None,
            gate: WriteGate::default(),
            is_new: false,
        };
        for hook in schema.hydrate_hooks() {
            hook(&mut doc)?;
        }
        Ok(doc)
    }

    /// The document's identifier.
    pub fn id(&self) -> &DocumentId {
        &self.id
    }

    /// The schema this document was built from.
    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Whether this instance was freshly constructed (as opposed to
    /// hydrated from storage).
    pub fn is_new(&self) -> bool {
        self.is_new
    }

    /// Read a stored field value.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.values.get(&FieldName::from(field))
    }

    /// Assign a field through its setter chain.
    ///
    /// The candidate value is folded through the field's interceptors in
    /// registration order; the chain's output is what gets stored. An
    /// interceptor may replace the value (a guarded field yields its
    /// current value, making the assignment a no-op) or fail.
    pub fn set(&mut self, field: &str, value: Value) -> Result<(), DocumentError> {
        let name = FieldName::from(field);
        let def = self
            .schema
            .field(field)
            .ok_or_else(|| DocumentError::UnknownField {
                schema: self.schema.name().to_string(),
                field: name.clone(),
            })?;
        if def.kind == FieldKind::Virtual {
            return Err(DocumentError::VirtualFieldWrite { field: name });
        }

        let setters: Vec<SetterFn> = self.schema.setters(&name).to_vec();
        let mut candidate = value;
        for setter in &setters {
            candidate = setter(self, candidate)?;
        }
        self.values.insert(name, candidate);
        Ok(())
    }

    /// All stored values.
    pub fn values(&self) -> &BTreeMap<FieldName, Value> {
        &self.values
    }

    /// The write gate for the bound field.
    pub fn write_gate(&self) -> &WriteGate {
        &self.gate
    }

    /// Mutable access to the write gate. Intended for the binding layer's
    /// transition synchronization only.
    pub fn write_gate_mut(&mut self) -> &mut WriteGate {
        &mut self.gate
    }
}

impl MachineHost for Document {
    fn machine(&self) -> Option<&Machine<Document>> {
        self.machine.as_ref()
    }

    fn machine_slot(&mut self) -> &mut Option<Machine<Document>> {
        &mut self.machine
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("id", &self.id)
            .field("schema", &self.schema.name())
            .field("values", &self.values)
            .field("machine", &self.machine)
            .field("is_new", &self.is_new)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn sample_schema() -> Schema {
        Schema::builder("matter")
            .real_field("matter_state")
            .real_field_default("label", json!("unnamed"))
            .virtual_field("summary")
            .build()
    }

    #[test]
    fn test_new_applies_defaults() {
        let doc = Document::new(Arc::new(sample_schema())).unwrap();
        assert_eq!(doc.get("label"), Some(&json!("unnamed")));
        assert_eq!(doc.get("matter_state"), None);
        assert!(doc.is_new());
    }

    #[test]
    fn test_construct_hooks_run_in_registration_order() {
        let mut schema = sample_schema();
        schema.on_construct(Arc::new(|doc| doc.set("label", json!("first"))));
        schema.on_construct(Arc::new(|doc| doc.set("label", json!("second"))));
        let doc = Document::new(Arc::new(schema)).unwrap();
        assert_eq!(doc.get("label"), Some(&json!("second")));
    }

    #[test]
    fn test_hydrate_skips_construct_hooks_and_defaults() {
        static CONSTRUCTED: AtomicUsize = AtomicUsize::new(0);
        let mut schema = sample_schema();
        schema.on_construct(Arc::new(|_| {
            CONSTRUCTED.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }));
        let schema = Arc::new(schema);

        let mut values = BTreeMap::new();
        values.insert(FieldName::from("matter_state"), json!("liquid"));
        let doc = Document::hydrate(schema, DocumentId::new(), values).unwrap();

        assert_eq!(CONSTRUCTED.load(Ordering::SeqCst), 0);
        assert!(!doc.is_new());
        assert_eq!(doc.get("matter_state"), Some(&json!("liquid")));
        // Defaults belong to construction, not hydration.
        assert_eq!(doc.get("label"), None);
    }

    #[test]
    fn test_hydrate_runs_hydrate_hooks() {
        let mut schema = sample_schema();
        schema.on_hydrate(Arc::new(|doc| doc.set("label", json!("hydrated"))));
        let doc = Document::hydrate(Arc::new(schema), DocumentId::new(), BTreeMap::new()).unwrap();
        assert_eq!(doc.get("label"), Some(&json!("hydrated")));
    }

    #[test]
    fn test_set_unknown_field() {
        let mut doc = Document::new(Arc::new(sample_schema())).unwrap();
        let err = doc.set("missing", json!(1)).unwrap_err();
        assert!(matches!(err, DocumentError::UnknownField { .. }));
    }

    #[test]
    fn test_set_virtual_field_rejected() {
        let mut doc = Document::new(Arc::new(sample_schema())).unwrap();
        let err = doc.set("summary", json!("computed")).unwrap_err();
        assert!(matches!(err, DocumentError::VirtualFieldWrite { .. }));
    }

    #[test]
    fn test_setter_chain_folds_in_order() {
        let mut schema = sample_schema();
        let field = FieldName::from("label");
        schema
            .add_setter(
                &field,
                Arc::new(|_, value| {
                    let s = value.as_str().unwrap_or_default();
                    Ok(json!(format!("{s}-a")))
                }),
            )
            .unwrap();
        schema
            .add_setter(
                &field,
                Arc::new(|_, value| {
                    let s = value.as_str().unwrap_or_default();
                    Ok(json!(format!("{s}-b")))
                }),
            )
            .unwrap();

        let mut doc = Document::new(Arc::new(schema)).unwrap();
        doc.set("label", json!("x")).unwrap();
        assert_eq!(doc.get("label"), Some(&json!("x-a-b")));
    }

    #[test]
    fn test_setter_observes_previous_value() {
        let mut schema = sample_schema();
        let field = FieldName::from("label");
        schema
            .add_setter(
                &field,
                Arc::new(|doc, value| {
                    // Keep the stored value unless it is still the default.
                    if doc.get("label") == Some(&json!("unnamed")) {
                        Ok(value)
                    } else {
                        Ok(doc.get("label").cloned().unwrap_or(Value::Null))
                    }
                }),
            )
            .unwrap();

        let mut doc = Document::new(Arc::new(schema)).unwrap();
        doc.set("label", json!("once")).unwrap();
        doc.set("label", json!("twice")).unwrap();
        assert_eq!(doc.get("label"), Some(&json!("once")));
    }

    #[test]
    fn test_write_gate_defaults_unauthorized() {
        let mut doc = Document::new(Arc::new(sample_schema())).unwrap();
        assert!(!doc.write_gate().is_authorized());
        doc.write_gate_mut().authorize();
        assert!(doc.write_gate().is_authorized());
        doc.write_gate_mut().revoke();
        assert!(!doc.write_gate().is_authorized());
    }

    #[test]
    fn test_failing_construct_hook_aborts_construction() {
        let mut schema = sample_schema();
        schema.on_construct(Arc::new(|doc| doc.set("missing", json!(1))));
        let err = Document::new(Arc::new(schema)).unwrap_err();
        assert!(matches!(err, DocumentError::UnknownField { .. }));
    }
}
