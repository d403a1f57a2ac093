//! Cloud mirrors for annotation records.
//!
//! Two providers implement [`RecordMirror`]:
//!
//! - [`HttpMirror`]: `PUT`s each annotator's JSONL file to an HTTP object
//!   endpoint with an optional bearer credential.
//! - [`S3Mirror`]: uploads the same file to an S3-compatible bucket.

pub mod config;
pub mod http;
pub mod s3;

use std::sync::Arc;

use claimdesk_core::mirror::RecordMirror;

pub use config::{MirrorConfig, MirrorProvider};
pub use http::HttpMirror;
pub use s3::S3Mirror;

/// Errors raised while configuring or constructing a mirror.
#[derive(Debug, thiserror::Error)]
pub enum CloudError {
    #[error("Invalid mirror configuration: {0}")]
    Config(String),

    #[error("Failed to build mirror client: {0}")]
    Client(String),
}

/// Construct the mirror selected by `config`.
pub async fn build_mirror(config: &MirrorConfig) -> Result<Arc<dyn RecordMirror>, CloudError> {
    let mirror: Arc<dyn RecordMirror> = match config.provider {
        MirrorProvider::Http => Arc::new(HttpMirror::new(config)?),
        MirrorProvider::S3 => Arc::new(S3Mirror::connect(config).await?),
    };
    tracing::info!(
        provider = config.provider.name(),
        endpoint = %config.endpoint,
        "Record mirror configured"
    );
    Ok(mirror)
}
