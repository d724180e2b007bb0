//! # In-Memory Document Store
//!
//! Persistence for one schema's documents, keyed by [`DocumentId`].
//! Saving projects the document onto its real fields; loading rebuilds a
//! document through the hydration path, so a schema's hydrate hooks run
//! on every load.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;

use statefield_core::{DocumentId, FieldName};

use crate::document::Document;
use crate::error::DocumentError;
use crate::schema::{FieldKind, Schema};

/// An in-memory store of persisted documents for one schema.
#[derive(Debug)]
pub struct DocumentStore {
    schema: Arc<Schema>,
    records: BTreeMap<DocumentId, BTreeMap<FieldName, Value>>,
}

impl DocumentStore {
    /// Create an empty store for `schema`.
    pub fn new(schema: Arc<Schema>) -> Self {
        Self {
            schema,
            records: BTreeMap::new(),
        }
    }

    /// The schema this store persists.
    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Persist a document's real-field values, replacing any previous
    /// record under the same identifier.
    pub fn save(&mut self, doc: &Document) -> DocumentId {
        let mut record = BTreeMap::new();
        for def in self.schema.fields() {
            if def.kind != FieldKind::Real {
                continue;
            }
            if let Some(value) = doc.get(def.name.as_str()) {
                record.insert(def.name.clone(), value.clone());
            }
        }
        self.records.insert(doc.id().clone(), record);
        doc.id().clone()
    }

    /// Load a document by identifier, through the hydration path.
    pub fn load(&self, id: &DocumentId) -> Result<Document, DocumentError> {
        let record = self
            .records
            .get(id)
            .ok_or_else(|| DocumentError::NotFound { id: id.clone() })?;
        Document::hydrate(self.schema.clone(), id.clone(), record.clone())
    }

    /// Whether a record exists for `id`.
    pub fn contains(&self, id: &DocumentId) -> bool {
        self.records.contains_key(id)
    }

    /// Number of persisted documents.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_schema() -> Arc<Schema> {
        Arc::new(
            Schema::builder("matter")
                .real_field("matter_state")
                .real_field_default("label", json!("unnamed"))
                .virtual_field("summary")
                .build(),
        )
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let schema = sample_schema();
        let mut store = DocumentStore::new(schema.clone());

        let mut doc = Document::new(schema).unwrap();
        doc.set("matter_state", json!("liquid")).unwrap();
        let id = store.save(&doc);

        assert!(store.contains(&id));
        let loaded = store.load(&id).unwrap();
        assert_eq!(loaded.id(), &id);
        assert!(!loaded.is_new());
        assert_eq!(loaded.get("matter_state"), Some(&json!("liquid")));
        assert_eq!(loaded.get("label"), Some(&json!("unnamed")));
    }

    #[test]
    fn test_load_missing_document() {
        let store = DocumentStore::new(sample_schema());
        let err = store.load(&DocumentId::new()).unwrap_err();
        assert!(matches!(err, DocumentError::NotFound { .. }));
    }

    #[test]
    fn test_save_replaces_previous_record() {
        let schema = sample_schema();
        let mut store = DocumentStore::new(schema.clone());

        let mut doc = Document::new(schema).unwrap();
        doc.set("matter_state", json!("solid")).unwrap();
        store.save(&doc);
        doc.set("matter_state", json!("liquid")).unwrap();
        store.save(&doc);

        assert_eq!(store.len(), 1);
        let loaded = store.load(doc.id()).unwrap();
        assert_eq!(loaded.get("matter_state"), Some(&json!("liquid")));
    }
}
