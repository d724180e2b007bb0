//! # Document Errors

use thiserror::Error;

use statefield_core::{DocumentId, FieldName};

/// Errors raised by document construction, mutation, and persistence.
#[derive(Error, Debug)]
pub enum DocumentError {
    /// The schema declares no field with this name.
    #[error("schema '{schema}' declares no field '{field}'")]
    UnknownField {
        /// The schema consulted.
        schema: String,
        /// The undeclared field.
        field: FieldName,
    },

    /// The field is virtual; it holds no stored value to write.
    #[error("field '{field}' is virtual and cannot be written")]
    VirtualFieldWrite {
        /// The virtual field.
        field: FieldName,
    },

    /// A guarded field refused a write outside an authorized transition.
    #[error("write to guarded field '{field}' rejected outside a transition")]
    WriteRejected {
        /// The guarded field.
        field: FieldName,
    },

    /// No persisted record exists for the identifier.
    #[error("no document found for {id}")]
    NotFound {
        /// The missing identifier.
        id: DocumentId,
    },

    /// A lifecycle hook failed during construction or hydration.
    #[error("lifecycle hook failed: {source}")]
    Lifecycle {
        /// The underlying hook failure.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl DocumentError {
    /// Wrap a hook failure.
    pub fn lifecycle(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Lifecycle {
            source: Box::new(source),
        }
    }
}
