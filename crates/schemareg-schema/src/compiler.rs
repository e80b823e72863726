//! # Schema Compiler Capability
//!
//! The registry treats JSON Schema compilation and validation as an opaque
//! capability behind two traits:
//!
//! - [`SchemaCompiler`] turns raw bytes into a registered [`SchemaResource`]
//!   and compiles a resource into a [`CompiledSchema`].
//! - [`CompiledSchema`] validates a document and reports structured
//!   [`Violation`]s.
//!
//! [`JsonSchemaCompiler`] implements both on top of the `jsonschema` crate.
//!
//! ## Schema Resolution
//!
//! Every schema is registered under `schema:///<id>`. Cross-schema `$ref`s
//! are resolved against the resources already committed to the registry by
//! a local retriever; nothing is ever fetched over the network. A `$ref`
//! that names no known resource fails compilation.
//!
//! ## Draft Selection
//!
//! `$schema`, when present, must name one of the five supported drafts.
//! Anything else is a compile error (`invalid $schema in <url>`). Schemas
//! without `$schema` use the configured default draft.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use jsonschema::{Draft, Retrieve, Uri};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Committed resources by URL, visible to `$ref` resolution.
pub type KnownResources = HashMap<String, Arc<Value>>;

/// Raw bytes could not be registered as a resource (not a JSON document).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid JSON for {url}: {reason}")]
pub struct RegisterError {
    /// Resource URL the bytes were registered under.
    pub url: String,
    /// Parser message.
    pub reason: String,
}

/// A registered resource failed to compile into a validator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("jsonschema {url} compilation failed: {reason}")]
pub struct CompileError {
    /// Resource URL of the schema being compiled.
    pub url: String,
    /// Underlying compiler message.
    pub reason: String,
}

impl CompileError {
    fn new(url: &str, reason: impl Into<String>) -> Self {
        Self {
            url: url.to_string(),
            reason: reason.into(),
        }
    }
}

/// A schema document registered under a resource URL, ready to compile.
#[derive(Debug, Clone)]
pub struct SchemaResource {
    url: String,
    contents: Arc<Value>,
}

impl SchemaResource {
    /// Build a resource from an already-parsed document.
    pub fn new(url: impl Into<String>, contents: Value) -> Self {
        Self {
            url: url.into(),
            contents: Arc::new(contents),
        }
    }

    /// The URL this resource is registered under.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The parsed schema document.
    pub fn contents(&self) -> &Arc<Value> {
        &self.contents
    }
}

/// A compiled, immutable, thread-shareable validator.
pub trait CompiledSchema: Send + Sync + fmt::Debug {
    /// Validate `instance`, returning every violation on failure.
    fn validate(&self, instance: &Value) -> Result<(), ValidationViolations>;
}

/// Compiles registered schema resources.
pub trait SchemaCompiler: Send + Sync {
    /// Parse `bytes` and register them under `url`.
    fn register(&self, url: String, bytes: &[u8]) -> Result<SchemaResource, RegisterError>;

    /// Compile `resource`, resolving `$ref`s against `known` and itself.
    fn compile(
        &self,
        resource: &SchemaResource,
        known: &KnownResources,
    ) -> Result<Arc<dyn CompiledSchema>, CompileError>;
}

/// A single validation violation with structured context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// JSON Pointer path to the violating value in the instance.
    pub instance_path: String,
    /// JSON Pointer path within the schema that triggered the error.
    pub schema_path: String,
    /// Human-readable description of the violation.
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.instance_path.is_empty() {
            write!(f, "(root): {}", self.message)
        } else {
            write!(f, "{}: {}", self.instance_path, self.message)
        }
    }
}

/// Non-empty collection of validation violations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationViolations {
    violations: Vec<Violation>,
}

impl ValidationViolations {
    /// Wrap a list of violations.
    pub fn new(violations: Vec<Violation>) -> Self {
        Self { violations }
    }

    /// Returns the number of violations.
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    /// Returns true if there are no violations.
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Returns a slice of all violations.
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }
}

impl fmt::Display for ValidationViolations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.violations.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{v}")?;
        }
        Ok(())
    }
}

/// JSON Schema dialects the compiler understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DraftVersion {
    #[serde(rename = "draft4")]
    Draft4,
    #[serde(rename = "draft6")]
    Draft6,
    #[serde(rename = "draft7")]
    Draft7,
    #[serde(rename = "draft2019-09")]
    Draft201909,
    #[default]
    #[serde(rename = "draft2020-12")]
    Draft202012,
}

impl DraftVersion {
    fn to_draft(self) -> Draft {
        match self {
            Self::Draft4 => Draft::Draft4,
            Self::Draft6 => Draft::Draft6,
            Self::Draft7 => Draft::Draft7,
            Self::Draft201909 => Draft::Draft201909,
            Self::Draft202012 => Draft::Draft202012,
        }
    }

    /// Match a `$schema` URI against the known meta-schemas.
    ///
    /// Scheme may be `http` or `https`; a trailing empty fragment is ignored.
    pub fn from_meta_schema_uri(uri: &str) -> Option<Self> {
        let uri = uri.trim_end_matches('#');
        let path = uri
            .strip_prefix("https://")
            .or_else(|| uri.strip_prefix("http://"))?;
        match path {
            "json-schema.org/draft-04/schema" => Some(Self::Draft4),
            "json-schema.org/draft-06/schema" => Some(Self::Draft6),
            "json-schema.org/draft-07/schema" => Some(Self::Draft7),
            "json-schema.org/draft/2019-09/schema" => Some(Self::Draft201909),
            "json-schema.org/draft/2020-12/schema" => Some(Self::Draft202012),
            _ => None,
        }
    }
}

/// Base URI the library resolves relative references against when the
/// root schema carries no `$id`.
const RELATIVE_BASE: &str = "json-schema:///";

/// Local retriever over committed resources.
///
/// Looks up the full URI first. Relative references (`"other"`, resolved
/// against [`RELATIVE_BASE`]) fall back to `schema:///other`. Any other
/// absolute URI must match a committed resource exactly.
struct RegistryRetriever {
    resources: KnownResources,
}

impl Retrieve for RegistryRetriever {
    fn retrieve(
        &self,
        uri: &Uri<String>,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        let uri_str = uri.as_str();
        let uri_str = uri_str.split('#').next().unwrap_or(uri_str);

        if let Some(value) = self.resources.get(uri_str) {
            return Ok(value.as_ref().clone());
        }

        if let Some(name) = uri_str.strip_prefix(RELATIVE_BASE) {
            if let Some(value) = self.resources.get(&format!("schema:///{name}")) {
                return Ok(value.as_ref().clone());
            }
        }

        Err(format!("unresolvable reference {uri_str}").into())
    }
}

/// [`CompiledSchema`] backed by a `jsonschema::Validator`.
#[derive(Debug)]
pub struct JsonSchemaValidator {
    validator: jsonschema::Validator,
}

impl CompiledSchema for JsonSchemaValidator {
    fn validate(&self, instance: &Value) -> Result<(), ValidationViolations> {
        let violations: Vec<Violation> = self
            .validator
            .iter_errors(instance)
            .map(|e| Violation {
                instance_path: e.instance_path().to_string(),
                schema_path: e.schema_path().to_string(),
                message: e.to_string(),
            })
            .collect();

        if violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationViolations::new(violations))
        }
    }
}

/// [`SchemaCompiler`] backed by the `jsonschema` crate.
#[derive(Debug, Clone, Default)]
pub struct JsonSchemaCompiler {
    default_draft: DraftVersion,
}

impl JsonSchemaCompiler {
    /// Compiler that applies `default_draft` to schemas without `$schema`.
    pub fn new(default_draft: DraftVersion) -> Self {
        Self { default_draft }
    }

    fn draft_for(&self, resource: &SchemaResource) -> Result<DraftVersion, CompileError> {
        let declared = match resource.contents.as_object().and_then(|o| o.get("$schema")) {
            Some(declared) => declared,
            None => return Ok(self.default_draft),
        };
        declared
            .as_str()
            .and_then(DraftVersion::from_meta_schema_uri)
            .ok_or_else(|| {
                CompileError::new(&resource.url, format!("invalid $schema in {}", resource.url))
            })
    }
}

impl SchemaCompiler for JsonSchemaCompiler {
    fn register(&self, url: String, bytes: &[u8]) -> Result<SchemaResource, RegisterError> {
        match serde_json::from_slice::<Value>(bytes) {
            Ok(contents) => Ok(SchemaResource::new(url, contents)),
            Err(e) => Err(RegisterError {
                url,
                reason: e.to_string(),
            }),
        }
    }

    fn compile(
        &self,
        resource: &SchemaResource,
        known: &KnownResources,
    ) -> Result<Arc<dyn CompiledSchema>, CompileError> {
        let draft = self.draft_for(resource)?;

        let mut resources = known.clone();
        resources.insert(resource.url.clone(), Arc::clone(&resource.contents));

        let validator = jsonschema::options()
            .with_draft(draft.to_draft())
            .with_retriever(RegistryRetriever { resources })
            .build(&resource.contents)
            .map_err(|e| CompileError::new(&resource.url, e.to_string()))?;

        Ok(Arc::new(JsonSchemaValidator { validator }))
    }
}
