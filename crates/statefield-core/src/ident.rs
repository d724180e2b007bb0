//! # Identifier Newtypes
//!
//! Newtype wrappers for the name spaces of the statefield workspace.
//! These prevent accidental identifier confusion — you cannot pass a
//! `TransitionName` where a `StateId` is expected, even though both wrap
//! strings at runtime.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The name of a state in a machine's transition table (e.g. `"solid"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StateId(pub String);

/// The name of a transition in a machine's transition table (e.g. `"melt"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TransitionName(pub String);

/// The name of a declared field on a document schema (e.g. `"matter_state"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FieldName(pub String);

/// Unique identifier for a persisted document instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DocumentId(pub Uuid);

macro_rules! impl_name_newtype {
    ($ty:ty) => {
        impl $ty {
            /// Access the inner string.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $ty {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $ty {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl PartialEq<str> for $ty {
            fn eq(&self, other: &str) -> bool {
                self.0 == other
            }
        }

        impl PartialEq<&str> for $ty {
            fn eq(&self, other: &&str) -> bool {
                self.0 == *other
            }
        }
    };
}

impl_name_newtype!(StateId);
impl_name_newtype!(TransitionName);
impl_name_newtype!(FieldName);

impl DocumentId {
    /// Generate a new random document identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "document:{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_id_from_str() {
        let s = StateId::from("solid");
        assert_eq!(s.as_str(), "solid");
        assert_eq!(format!("{s}"), "solid");
    }

    #[test]
    fn test_name_newtypes_are_distinct_types() {
        // Equality against strings works per-type; cross-type comparison
        // does not compile, which is the point.
        let state = StateId::from("active");
        let transition = TransitionName::from("activate");
        assert_eq!(state, "active");
        assert_eq!(transition, "activate");
    }

    #[test]
    fn test_document_id_unique() {
        assert_ne!(DocumentId::new(), DocumentId::new());
    }

    #[test]
    fn test_document_id_display_prefixed() {
        let id = DocumentId::new();
        assert!(format!("{id}").starts_with("document:"));
    }

    #[test]
    fn test_serde_roundtrip() {
        let field = FieldName::from("matter_state");
        let json = serde_json::to_string(&field).unwrap();
        assert_eq!(json, "\"matter_state\"");
        let parsed: FieldName = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, field);
    }
}
