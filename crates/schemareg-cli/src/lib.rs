//! # schemareg-cli: The `schemareg` Binary
//!
//! ## Subcommands
//!
//! - `schemareg serve`: run the HTTP registry.
//! - `schemareg check`: load a schema directory offline and list digests.
//! - `schemareg validate`: validate one JSON or YAML document.
//!
//! ```bash
//! schemareg serve -p 8080 -d ./schemas --metrics-addr 127.0.0.1:9100
//! schemareg check -d ./schemas
//! schemareg validate -d ./schemas FULL-SCHEMA transfer.yaml
//! ```
//!
//! Each handler returns the process exit code, or an `anyhow` error that
//! `main` logs with its full chain before exiting 1.

pub mod check;
pub mod serve;
pub mod validate;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::Args;
use schemareg_api::AppConfig;
use schemareg_schema::{DraftVersion, JsonSchemaCompiler, SchemaStore};

/// Open the store in `dir` with the production compiler.
pub fn open_store(dir: &Path, draft: DraftVersion) -> anyhow::Result<SchemaStore> {
    SchemaStore::open(dir, Arc::new(JsonSchemaCompiler::new(draft)))
        .with_context(|| format!("failed to load schemas from {}", dir.display()))
}

/// Store location and draft for the offline subcommands.
#[derive(Args, Debug, Default)]
pub struct StoreArgs {
    /// Directory holding the schema files.
    #[arg(short, long, env = "SCHEMAREG_DIR")]
    pub dir: Option<PathBuf>,

    /// YAML configuration file, shared with `serve`.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Draft for schemas without `$schema` (e.g. draft7, draft2020-12).
    #[arg(long, value_parser = parse_draft)]
    pub default_draft: Option<DraftVersion>,
}

impl StoreArgs {
    /// Defaults, then the config file, then env/flags.
    pub fn resolve_config(&self) -> anyhow::Result<AppConfig> {
        let mut config = match &self.config {
            Some(path) => AppConfig::from_yaml_file(path)?,
            None => AppConfig::default(),
        };
        if let Some(dir) = &self.dir {
            config.schema_dir = dir.clone();
        }
        if let Some(draft) = self.default_draft {
            config.default_draft = draft;
        }
        Ok(config)
    }

    /// Resolve the configuration and open the store it names.
    pub fn open(&self) -> anyhow::Result<(AppConfig, SchemaStore)> {
        let config = self.resolve_config()?;
        let store = open_store(&config.schema_dir, config.default_draft)?;
        Ok((config, store))
    }
}

/// Accept the same draft names as the config file.
fn parse_draft(s: &str) -> Result<DraftVersion, String> {
    serde_json::from_value(serde_json::Value::String(s.to_string()))
        .map_err(|_| format!("unknown draft `{s}`"))
}
