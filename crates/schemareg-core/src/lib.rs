//! # schemareg-core: Foundational Types
//!
//! Leaf crate of the workspace. Defines the two pure building blocks the
//! registry and the HTTP layer share:
//!
//! 1. **`SchemaId` newtype.** Every schema is addressed by a caller-chosen
//!    identifier restricted to ASCII letters, digits, `_` and `-`. The
//!    identifier doubles as the file name in the schema directory, so the
//!    restricted alphabet is what keeps path traversal out by construction.
//!
//! 2. **Document normalization.** Documents submitted for validation may
//!    carry explicit `null` for optional fields. [`strip_nulls`] removes
//!    those fields before the schema sees the document.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `schemareg-*` crates.
//! - No `unsafe` code, no `.unwrap()` outside tests.

pub mod error;
pub mod identity;
pub mod normalize;

pub use error::InvalidId;
pub use identity::{is_valid_id, SchemaId};
pub use normalize::strip_nulls;
