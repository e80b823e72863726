//! # Schema Identifiers
//!
//! A schema identifier is chosen by the uploading client and is used both
//! as the URL path segment (`/schema/{id}`, `/validate/{id}`) and as the
//! file name under the schema directory.
//!
//! ## Security Invariant
//!
//! Only ASCII letters, ASCII digits, `_` and `-` are accepted. No `/`, no
//! `.`, no percent escapes: an identifier can never name anything outside
//! the schema directory, nor a hidden file inside it.

use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::InvalidId;

/// Returns `true` if every character of `s` is in `[A-Za-z0-9_-]`.
///
/// The empty string passes: emptiness is a routing concern, handled before
/// the predicate is consulted. Use [`SchemaId::parse`] to get both checks.
pub fn is_valid_id(s: &str) -> bool {
    s.chars().all(is_id_char)
}

fn is_id_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

/// Validated, non-empty schema identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SchemaId(String);

impl SchemaId {
    /// Validate and wrap an identifier.
    ///
    /// # Errors
    ///
    /// [`InvalidId::Empty`] for `""`, [`InvalidId::DisallowedCharacter`]
    /// naming the first character outside the permitted alphabet.
    pub fn parse(s: impl Into<String>) -> Result<Self, InvalidId> {
        let s = s.into();
        if s.is_empty() {
            return Err(InvalidId::Empty);
        }
        if let Some(found) = s.chars().find(|c| !is_id_char(*c)) {
            return Err(InvalidId::DisallowedCharacter { id: s, found });
        }
        Ok(Self(s))
    }

    /// Borrow the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Synthetic resource URL the compiler registers this schema under.
    pub fn resource_url(&self) -> String {
        format!("schema:///{}", self.0)
    }
}

impl fmt::Display for SchemaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SchemaId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for SchemaId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl FromStr for SchemaId {
    type Err = InvalidId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for SchemaId {
    type Error = InvalidId;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

impl From<SchemaId> for String {
    fn from(id: SchemaId) -> Self {
        id.0
    }
}
