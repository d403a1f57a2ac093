//! Secondary, best-effort record mirrors.
//!
//! A mirror receives the full record set of one annotator after every
//! successful primary write. Implementations live in `claimdesk-cloud`.

use async_trait::async_trait;

use crate::record::AnnotationRecord;

/// A mirror write failed. Never fatal to a submission.
#[derive(Debug, Clone, thiserror::Error)]
#[error("Mirror '{mirror}' write failed: {message}")]
pub struct MirrorWriteError {
    pub mirror: String,
    pub message: String,
}

impl MirrorWriteError {
    pub fn new(mirror: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            mirror: mirror.into(),
            message: message.into(),
        }
    }
}

/// Destination that keeps a copy of each annotator's records.
#[async_trait]
pub trait RecordMirror: Send + Sync {
    /// Short name used in logs and receipts.
    fn name(&self) -> &str;

    /// Replace the mirrored copy of `annotator_id`'s records.
    async fn mirror(
        &self,
        annotator_id: &str,
        records: &[AnnotationRecord],
    ) -> Result<(), MirrorWriteError>;
}

/// Object name used for an annotator's record file, in the primary store
/// and in mirrors.
pub fn records_file_name(annotator_id: &str) -> String {
    format!("{annotator_id}_annotations.jsonl")
}

/// Object key for an annotator's records under `prefix`.
pub fn object_key(prefix: &str, annotator_id: &str) -> String {
    let prefix = prefix.trim_matches('/');
    let file = records_file_name(annotator_id);
    if prefix.is_empty() {
        format!("{annotator_id}/{file}")
    } else {
        format!("{prefix}/{annotator_id}/{file}")
    }
}
