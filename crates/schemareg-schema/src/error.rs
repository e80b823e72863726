//! # Registry Errors
//!
//! [`OpenError`] covers store construction, which is fatal to the process.
//! [`RegistryError`] covers per-request operations, none of which leave the
//! store in a changed state when they fail.

use std::path::PathBuf;

use schemareg_core::{InvalidId, SchemaId};
use thiserror::Error;

use crate::compiler::{CompileError, RegisterError};

/// The schema directory could not be loaded.
#[derive(Error, Debug)]
pub enum OpenError {
    /// The directory did not exist and could not be created.
    #[error("error creating schema directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The directory listing failed.
    #[error("error reading schema directory {}: {source}", path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A file in the directory is not named by a valid identifier.
    #[error("invalid schema file name {}: {source}", path.display())]
    InvalidFileName {
        path: PathBuf,
        #[source]
        source: InvalidId,
    },

    /// A schema file could not be read.
    #[error("error reading schema file {}: {source}", path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A schema file is not a JSON document.
    #[error("error adding schema file {} as resource: {source}", path.display())]
    Register {
        path: PathBuf,
        #[source]
        source: RegisterError,
    },

    /// A schema file failed to compile.
    #[error("error compiling schema file {}: {source}", path.display())]
    Compile {
        path: PathBuf,
        #[source]
        source: CompileError,
    },
}

/// A registry operation failed. The store is unchanged.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// Upload to an identifier that already has a schema.
    #[error("schema {0} already exists")]
    IdExists(SchemaId),

    /// No schema is registered under the identifier.
    #[error("unknown schema {0}")]
    UnknownId(SchemaId),

    /// The uploaded schema or submitted document is not JSON.
    #[error("invalid JSON: {0}")]
    InvalidJson(String),

    /// The uploaded schema failed to compile.
    #[error(transparent)]
    Compile(#[from] CompileError),

    /// Writing the schema file failed; nothing was committed.
    #[error("error saving schema {id}: {source}")]
    Persist {
        id: SchemaId,
        #[source]
        source: std::io::Error,
    },

    /// Reading a committed schema file back failed.
    #[error("error reading schema {id}: {source}")]
    Read {
        id: SchemaId,
        #[source]
        source: std::io::Error,
    },
}

impl From<RegisterError> for RegistryError {
    fn from(err: RegisterError) -> Self {
        Self::InvalidJson(err.reason)
    }
}
