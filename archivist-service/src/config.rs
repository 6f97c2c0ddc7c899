//! Static configuration loaded once at startup.
//! Changing any of these settings requires a restart.

use serde::Deserialize;
use std::path::PathBuf;

/// Top-level configuration, loaded from `config.*` and the
/// `ARCHIVIST__`-prefixed environment.
#[derive(Debug, Clone, Deserialize)]
pub struct StaticConfig {
    #[serde(default = "default_server")]
    pub server: ServerConfig,

    #[serde(default = "default_storage")]
    pub storage: StorageConfig,

    #[serde(default = "default_ingest")]
    pub ingest: IngestConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

/// Storage configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl StorageConfig {
    /// Uploads land here before processing.
    pub fn staging_dir(&self) -> PathBuf {
        self.data_dir.join("staging")
    }

    /// Processed documents are filed here.
    pub fn documents_dir(&self) -> PathBuf {
        self.data_dir.join("documents")
    }
}

/// Ingestion pipeline configuration
#[derive(Debug, Clone, Deserialize)]
pub struct IngestConfig {
    /// Concurrent processing slots. Kept small so resource-heavy document
    /// processing cannot saturate the host.
    #[serde(default = "default_worker_slots")]
    pub worker_slots: usize,

    #[serde(default = "default_max_upload_size")]
    pub max_upload_size_bytes: u64,
}

// ==================== Default Value Functions ====================

pub(crate) fn default_server() -> ServerConfig {
    ServerConfig {
        host: default_host(),
        port: default_port(),
    }
}

pub(crate) fn default_host() -> String {
    "0.0.0.0".to_string()
}

pub(crate) fn default_port() -> u16 {
    8080
}

pub(crate) fn default_storage() -> StorageConfig {
    StorageConfig {
        data_dir: default_data_dir(),
    }
}

pub(crate) fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

pub(crate) fn default_ingest() -> IngestConfig {
    IngestConfig {
        worker_slots: default_worker_slots(),
        max_upload_size_bytes: default_max_upload_size(),
    }
}

pub(crate) fn default_worker_slots() -> usize {
    2
}

pub(crate) fn default_max_upload_size() -> u64 {
    100 * 1024 * 1024
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config: StaticConfig = serde_json::from_str("{}").unwrap();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.ingest.worker_slots, 2);
        assert_eq!(config.storage.staging_dir(), PathBuf::from("./data/staging"));
        assert_eq!(
            config.storage.documents_dir(),
            PathBuf::from("./data/documents")
        );
    }

    #[test]
    fn partial_config_keeps_remaining_defaults() {
        let config: StaticConfig =
            serde_json::from_str(r#"{"ingest": {"worker_slots": 4}}"#).unwrap();

        assert_eq!(config.ingest.worker_slots, 4);
        assert_eq!(config.ingest.max_upload_size_bytes, 100 * 1024 * 1024);
        assert_eq!(config.server.port, 8080);
    }
}
