//! # Schema Store
//!
//! Directory-backed registry of compiled schemas.
//!
//! ## Invariant
//!
//! Every identifier in memory has a file of the same name in the schema
//! directory holding the exact bytes that were compiled for it, and every
//! file was compiled. [`SchemaStore::open`] establishes the invariant by
//! compiling the whole directory; [`SchemaStore::upload`] preserves it by
//! committing to memory only after the bytes are durably on disk.
//!
//! ## Concurrency
//!
//! One reader/writer lock guards the registry. Uploads hold the write lock
//! for their whole duration, compile and file write included, so at most one
//! upload is in flight. Lookups take the read lock. Compiled schemas are
//! immutable `Arc`s and are used outside the lock.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use schemareg_core::{strip_nulls, SchemaId};
use serde_json::Value;

use crate::compiler::{
    CompiledSchema, KnownResources, SchemaCompiler, SchemaResource, ValidationViolations,
};
use crate::error::{OpenError, RegistryError};

/// Outcome of validating a document against a stored schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    /// The document conforms.
    Valid,
    /// The document does not conform.
    Invalid(ValidationViolations),
}

impl Validation {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }
}

#[derive(Default)]
struct Registry {
    entries: HashMap<SchemaId, Arc<dyn CompiledSchema>>,
    resources: KnownResources,
}

/// Concurrent registry of compiled schemas persisted in one flat directory.
pub struct SchemaStore {
    directory: PathBuf,
    compiler: Arc<dyn SchemaCompiler>,
    registry: RwLock<Registry>,
}

impl std::fmt::Debug for SchemaStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaStore")
            .field("directory", &self.directory)
            .field("schemas", &self.len())
            .finish()
    }
}

impl SchemaStore {
    /// Open the store rooted at `directory`, creating the directory if needed.
    ///
    /// Every file is first registered as a resource, then each is compiled
    /// with all of them visible, so schemas may `$ref` each other regardless
    /// of directory order. Hidden entries (leading `.`) and subdirectories
    /// are skipped.
    ///
    /// # Errors
    ///
    /// Any I/O, naming, parse or compile failure aborts with an [`OpenError`]
    /// naming the offending path.
    pub fn open(
        directory: impl Into<PathBuf>,
        compiler: Arc<dyn SchemaCompiler>,
    ) -> Result<Self, OpenError> {
        let directory = directory.into();

        fs::create_dir_all(&directory).map_err(|source| OpenError::CreateDir {
            path: directory.clone(),
            source,
        })?;

        let mut files = scan_directory(&directory)?;
        files.sort();

        let mut resources = KnownResources::new();
        let mut staged: Vec<(SchemaId, PathBuf, SchemaResource)> = Vec::with_capacity(files.len());
        for (id, path) in files {
            let bytes = fs::read(&path).map_err(|source| OpenError::ReadFile {
                path: path.clone(),
                source,
            })?;
            let resource = compiler
                .register(id.resource_url(), &bytes)
                .map_err(|source| OpenError::Register {
                    path: path.clone(),
                    source,
                })?;
            resources.insert(resource.url().to_string(), Arc::clone(resource.contents()));
            staged.push((id, path, resource));
        }

        let mut entries = HashMap::with_capacity(staged.len());
        for (id, path, resource) in staged {
            let compiled = compiler
                .compile(&resource, &resources)
                .map_err(|source| OpenError::Compile { path, source })?;
            tracing::debug!(id = %id, "loaded schema");
            entries.insert(id, compiled);
        }

        tracing::info!(
            directory = %directory.display(),
            schemas = entries.len(),
            "schema store opened"
        );

        Ok(Self {
            directory,
            compiler,
            registry: RwLock::new(Registry { entries, resources }),
        })
    }

    /// The directory schemas are persisted in.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Number of registered schemas.
    pub fn len(&self) -> usize {
        self.registry.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All registered identifiers, sorted.
    pub fn ids(&self) -> Vec<SchemaId> {
        let mut ids: Vec<SchemaId> = self.registry.read().entries.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Whether a schema is registered under `id`.
    pub fn has(&self, id: &SchemaId) -> bool {
        self.registry.read().entries.contains_key(id)
    }

    /// The exact bytes stored for `id`, or `None` if unknown.
    ///
    /// Read from disk under the read lock: the file is served verbatim,
    /// never re-serialized.
    pub fn get(&self, id: &SchemaId) -> Result<Option<Vec<u8>>, RegistryError> {
        let registry = self.registry.read();
        if !registry.entries.contains_key(id) {
            return Ok(None);
        }
        fs::read(self.path_for(id))
            .map(Some)
            .map_err(|source| RegistryError::Read {
                id: id.clone(),
                source,
            })
    }

    /// Register, compile and persist a new schema under `id`.
    ///
    /// Holds the write lock throughout. Nothing is observable until the
    /// final insert: a failure at any step leaves memory and disk as they
    /// were.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::IdExists`] if `id` is already registered.
    /// - [`RegistryError::InvalidJson`] if `body` is not JSON.
    /// - [`RegistryError::Compile`] if the schema does not compile.
    /// - [`RegistryError::Persist`] if the file could not be written.
    pub fn upload(&self, id: &SchemaId, body: &[u8]) -> Result<(), RegistryError> {
        let mut registry = self.registry.write();

        if registry.entries.contains_key(id) {
            return Err(RegistryError::IdExists(id.clone()));
        }

        let resource = self.compiler.register(id.resource_url(), body)?;
        let compiled = self.compiler.compile(&resource, &registry.resources)?;

        self.persist(id, body)?;

        registry
            .resources
            .insert(resource.url().to_string(), Arc::clone(resource.contents()));
        registry.entries.insert(id.clone(), compiled);

        tracing::info!(id = %id, bytes = body.len(), "schema uploaded");
        Ok(())
    }

    /// Decode `body`, normalize it, and validate it against schema `id`.
    ///
    /// # Errors
    ///
    /// [`RegistryError::UnknownId`] is checked before the body is decoded;
    /// [`RegistryError::InvalidJson`] if the body is not a single JSON value.
    /// Non-conformance is not an error: see [`Validation::Invalid`].
    pub fn validate(&self, id: &SchemaId, body: &[u8]) -> Result<Validation, RegistryError> {
        let compiled = self.lookup(id)?;
        let document: Value = serde_json::from_slice(body)
            .map_err(|e| RegistryError::InvalidJson(e.to_string()))?;
        Ok(run(compiled.as_ref(), document))
    }

    /// Validate an already-decoded document against schema `id`.
    pub fn validate_value(&self, id: &SchemaId, document: Value) -> Result<Validation, RegistryError> {
        let compiled = self.lookup(id)?;
        Ok(run(compiled.as_ref(), document))
    }

    fn lookup(&self, id: &SchemaId) -> Result<Arc<dyn CompiledSchema>, RegistryError> {
        self.registry
            .read()
            .entries
            .get(id)
            .cloned()
            .ok_or_else(|| RegistryError::UnknownId(id.clone()))
    }

    fn path_for(&self, id: &SchemaId) -> PathBuf {
        self.directory.join(id.as_str())
    }

    /// Write `bytes` to a hidden staging file, fsync, then rename into place.
    fn persist(&self, id: &SchemaId, bytes: &[u8]) -> Result<(), RegistryError> {
        let staging = self.directory.join(format!(".{id}.tmp"));
        let result = write_synced(&staging, bytes).and_then(|()| fs::rename(&staging, self.path_for(id)));

        if let Err(source) = result {
            // The staging file may not exist; nothing else to clean up.
            let _ = fs::remove_file(&staging);
            tracing::error!(id = %id, error = %source, "error saving schema");
            return Err(RegistryError::Persist {
                id: id.clone(),
                source,
            });
        }
        Ok(())
    }
}

fn run(compiled: &dyn CompiledSchema, mut document: Value) -> Validation {
    strip_nulls(&mut document);
    match compiled.validate(&document) {
        Ok(()) => Validation::Valid,
        Err(violations) => Validation::Invalid(violations),
    }
}

fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}

/// List the schema files directly under `directory`.
fn scan_directory(directory: &Path) -> Result<Vec<(SchemaId, PathBuf)>, OpenError> {
    let read_dir_err = |source| OpenError::ReadDir {
        path: directory.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in fs::read_dir(directory).map_err(read_dir_err)? {
        let entry = entry.map_err(read_dir_err)?;
        let path = entry.path();
        let name = entry.file_name().to_string_lossy().into_owned();

        if name.starts_with('.') {
            tracing::debug!(path = %path.display(), "skipping hidden entry");
            continue;
        }
        if entry.file_type().map_err(read_dir_err)?.is_dir() {
            tracing::warn!(path = %path.display(), "skipping subdirectory in schema directory");
            continue;
        }

        let id = SchemaId::parse(name).map_err(|source| OpenError::InvalidFileName {
            path: path.clone(),
            source,
        })?;
        files.push((id, path));
    }
    Ok(files)
}
