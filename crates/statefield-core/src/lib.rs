//! # statefield-core — Foundational Types
//!
//! The leaf crate of the statefield workspace. It defines the identifier
//! newtypes, the timestamp type, and the reserved-identifier set shared by
//! the machine, document, and binding crates. It depends on nothing
//! internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for domain names.** `StateId`, `TransitionName`,
//!    `FieldName`, `DocumentId` — you cannot pass a transition name where a
//!    state is expected. No bare strings for identifiers.
//!
//! 2. **UTC-only timestamps.** `Timestamp` enforces UTC with Z suffix and
//!    seconds precision; non-UTC inputs are rejected at construction.
//!
//! 3. **One reserved-identifier set.** The names a bound document already
//!    exposes are defined once, in `reserved`, and consulted by schema
//!    validation. Adding a query method to the binding surface means adding
//!    its name here.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `statefield-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod ident;
pub mod reserved;
pub mod temporal;

// Re-export primary types for ergonomic imports.
pub use ident::{DocumentId, FieldName, StateId, TransitionName};
pub use reserved::{is_reserved, RESERVED_IDENTIFIERS};
pub use temporal::{Timestamp, TimestampError};
