use std::path::PathBuf;

use claimdesk_core::annotator::{AnnotatorRoster, DEFAULT_ROSTER_SIZE};
use claimdesk_core::storage::StorageMode;

/// Server configuration loaded from environment variables.
///
/// All fields have defaults matching the pilot layout on disk. Mirror
/// settings are loaded separately (see `claimdesk_cloud::MirrorConfig`) and
/// only when `storage_mode` mirrors.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Bound on each durable record write, in seconds (default: `10`).
    pub write_timeout_secs: u64,
    /// JSON array of items, loaded once at startup.
    pub dataset_path: PathBuf,
    /// Directory served at `/images`.
    pub images_dir: PathBuf,
    pub guidelines_path: PathBuf,
    /// Root of the per-annotator record files.
    pub data_dir: PathBuf,
    /// Annotator ids in assignment order. Empty admits any valid id.
    pub annotators: Vec<String>,
    pub storage_mode: StorageMode,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                              |
    /// |------------------------|--------------------------------------|
    /// | `HOST`                 | `0.0.0.0`                            |
    /// | `PORT`                 | `3000`                               |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`              |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                                 |
    /// | `WRITE_TIMEOUT_SECS`   | `10`                                 |
    /// | `DATASET_PATH`         | `pilot_data/filtered_posts.json`     |
    /// | `IMAGES_DIR`           | `pilot_data/images`                  |
    /// | `GUIDELINES_PATH`      | `annotation_interface/guidelines.md` |
    /// | `DATA_DIR`             | `annotation_interface`               |
    /// | `ANNOTATORS`           | `annotator_01,...,annotator_04`      |
    /// | `STORAGE_MODE`         | `local`                              |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins = split_list(
            &std::env::var("CORS_ORIGINS").unwrap_or_else(|_| "http://localhost:5173".into()),
        );

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let write_timeout_secs: u64 = std::env::var("WRITE_TIMEOUT_SECS")
            .unwrap_or_else(|_| "10".into())
            .parse()
            .expect("WRITE_TIMEOUT_SECS must be a valid u64");

        let path_var = |key: &str, default: &str| -> PathBuf {
            std::env::var(key).unwrap_or_else(|_| default.into()).into()
        };

        let annotators = match std::env::var("ANNOTATORS") {
            Ok(list) => split_list(&list),
            Err(_) => AnnotatorRoster::numbered(DEFAULT_ROSTER_SIZE).ids().to_vec(),
        };

        let storage_mode = StorageMode::from_name(
            &std::env::var("STORAGE_MODE").unwrap_or_else(|_| "local".into()),
        )
        .unwrap_or_else(|e| panic!("Invalid STORAGE_MODE: {e}"));

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            write_timeout_secs,
            dataset_path: path_var("DATASET_PATH", "pilot_data/filtered_posts.json"),
            images_dir: path_var("IMAGES_DIR", "pilot_data/images"),
            guidelines_path: path_var("GUIDELINES_PATH", "annotation_interface/guidelines.md"),
            data_dir: path_var("DATA_DIR", "annotation_interface"),
            annotators,
            storage_mode,
        }
    }

    /// Validated roster built from `annotators`.
    pub fn roster(&self) -> Result<AnnotatorRoster, claimdesk_core::error::CoreError> {
        AnnotatorRoster::new(self.annotators.clone())
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
