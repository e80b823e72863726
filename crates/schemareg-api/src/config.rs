//! # Server Configuration
//!
//! Defaults, overridable from a YAML file. Command-line flags and
//! environment variables are layered on top by the binary.
//!
//! ```yaml
//! bind: 127.0.0.1:9000
//! schema_dir: /var/lib/schemareg
//! max_body_bytes: 1048576
//! metrics_bind: 127.0.0.1:9100
//! default_draft: draft7
//! ```

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use schemareg_schema::DraftVersion;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default request body limit: 2 MiB.
pub const DEFAULT_MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Runtime configuration for the registry server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Address the HTTP API listens on.
    pub bind: SocketAddr,
    /// Directory holding one file per schema.
    pub schema_dir: PathBuf,
    /// Largest accepted request body.
    pub max_body_bytes: usize,
    /// Listener for the Prometheus exporter; disabled when absent.
    pub metrics_bind: Option<SocketAddr>,
    /// Draft applied to schemas that do not declare `$schema`.
    pub default_draft: DraftVersion,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 8080)),
            schema_dir: PathBuf::from("./schemas"),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            metrics_bind: None,
            default_draft: DraftVersion::default(),
        }
    }
}

impl AppConfig {
    /// Load from a YAML file; missing keys keep their defaults.
    pub fn from_yaml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = AppConfig::default();
        assert_eq!(config.bind.port(), 8080);
        assert_eq!(config.schema_dir, PathBuf::from("./schemas"));
        assert_eq!(config.max_body_bytes, DEFAULT_MAX_BODY_BYTES);
        assert!(config.metrics_bind.is_none());
        assert_eq!(config.default_draft, DraftVersion::Draft202012);
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let config: AppConfig = serde_yaml::from_str("schema_dir: /tmp/s\ndefault_draft: draft4\n").unwrap();
        assert_eq!(config.schema_dir, PathBuf::from("/tmp/s"));
        assert_eq!(config.default_draft, DraftVersion::Draft4);
        assert_eq!(config.bind.port(), 8080);
    }

    #[test]
    fn unknown_keys_rejected() {
        assert!(serde_yaml::from_str::<AppConfig>("port: 1\n").is_err());
    }

    #[test]
    fn file_errors_name_the_path() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("absent.yaml");
        let err = AppConfig::from_yaml_file(&missing).unwrap_err();
        assert!(err.to_string().contains("absent.yaml"));

        let bad = tmp.path().join("bad.yaml");
        std::fs::write(&bad, "bind: [not, an, address]\n").unwrap();
        assert!(matches!(
            AppConfig::from_yaml_file(&bad).unwrap_err(),
            ConfigError::Parse { .. }
        ));

        let good = tmp.path().join("good.yaml");
        std::fs::write(&good, "bind: 127.0.0.1:9000\nmetrics_bind: 127.0.0.1:9100\n").unwrap();
        let config = AppConfig::from_yaml_file(&good).unwrap();
        assert_eq!(config.bind, "127.0.0.1:9000".parse().unwrap());
        assert_eq!(config.metrics_bind, Some("127.0.0.1:9100".parse().unwrap()));
    }
}
