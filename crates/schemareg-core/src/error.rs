//! # Error Types
//!
//! Errors produced by the foundational types. Registry and transport errors
//! live in their own crates.

use thiserror::Error;

/// An identifier string was rejected by [`SchemaId::parse`](crate::SchemaId::parse).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidId {
    /// The identifier was the empty string.
    #[error("schema identifier must not be empty")]
    Empty,

    /// The identifier contained a character outside `[A-Za-z0-9_-]`.
    #[error("schema identifier {id:?} contains disallowed character {found:?}")]
    DisallowedCharacter {
        /// The rejected identifier.
        id: String,
        /// First offending character.
        found: char,
    },
}
