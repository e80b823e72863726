//! # Application State
//!
//! Shared state passed to every handler through axum's `State`: the one
//! schema store of the process and the configuration it was opened with.

use std::sync::Arc;

use schemareg_schema::{JsonSchemaCompiler, OpenError, SchemaStore};

use crate::config::AppConfig;
use crate::error::AppError;

#[derive(Debug, Clone)]
pub struct AppState {
    pub store: Arc<SchemaStore>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// State around an already-open store, default configuration.
    pub fn new(store: Arc<SchemaStore>) -> Self {
        Self::with_config(store, AppConfig::default())
    }

    pub fn with_config(store: Arc<SchemaStore>, config: AppConfig) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }

    /// Open the store described by `config` with the `jsonschema` compiler.
    pub fn open(config: AppConfig) -> Result<Self, OpenError> {
        let compiler = Arc::new(JsonSchemaCompiler::new(config.default_draft));
        let store = SchemaStore::open(&config.schema_dir, compiler)?;
        Ok(Self::with_config(Arc::new(store), config))
    }

    /// Run a store operation on the blocking pool.
    ///
    /// Store calls take a lock that an upload holds across compilation and
    /// disk I/O, so they never run on a runtime worker. The spawned task
    /// runs to completion even if the request future is dropped.
    pub async fn with_store<F, T>(&self, f: F) -> Result<T, AppError>
    where
        F: FnOnce(&SchemaStore) -> T + Send + 'static,
        T: Send + 'static,
    {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || f(&store))
            .await
            .map_err(|e| AppError::Internal(format!("store task failed: {e}")))
    }
}
