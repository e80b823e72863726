//! # schemareg-schema: Schema Compilation & Storage
//!
//! ## Compiler capability (`compiler`)
//!
//! [`SchemaCompiler`] and [`CompiledSchema`] abstract JSON Schema
//! compilation and validation. [`JsonSchemaCompiler`] is the production
//! implementation on top of the `jsonschema` crate; tests inject fakes.
//!
//! ## Store (`store`)
//!
//! [`SchemaStore`] is the process-wide registry: a map from
//! [`SchemaId`](schemareg_core::SchemaId) to compiled schema, backed by one
//! flat directory of raw schema files. Key operations:
//!
//! - [`SchemaStore::open`]: compile the whole directory, fail on any bad file.
//! - [`SchemaStore::upload`]: register, compile, persist, then commit.
//! - [`SchemaStore::get`]: serve stored bytes verbatim.
//! - [`SchemaStore::validate`]: decode, strip nulls, validate.
//!
//! ## Crate Policy
//!
//! - Depends only on `schemareg-core` internally.
//! - No network access: `$ref` resolution only sees committed schemas.
//! - Memory never records a schema whose bytes are not on disk.

pub mod compiler;
pub mod error;
pub mod store;

pub use compiler::{
    CompileError, CompiledSchema, DraftVersion, JsonSchemaCompiler, KnownResources,
    RegisterError, SchemaCompiler, SchemaResource, ValidationViolations, Violation,
};
pub use error::{OpenError, RegistryError};
pub use store::{SchemaStore, Validation};
