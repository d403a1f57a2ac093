//! The record store used by the service: a durable primary writer plus an
//! optional best-effort mirror.
//!
//! The primary write must succeed (within `write_timeout`) for an upsert to
//! succeed. Afterwards the annotator's full record set is pushed to the
//! mirror, bounded by `mirror_timeout`; a mirror failure is logged and
//! reported in the [`UpsertReceipt`] but never undoes the primary write.

use std::sync::Arc;
use std::time::Duration;

use claimdesk_core::mirror::RecordMirror;
use claimdesk_core::record::AnnotationRecord;
use claimdesk_core::storage::StorageMode;
use serde::Serialize;

use crate::error::StorageError;
use crate::jsonl::JsonlRecordStore;

/// Default bound on the primary durable write.
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(10);

/// Default bound on a single mirror write.
pub const DEFAULT_MIRROR_TIMEOUT: Duration = Duration::from_secs(10);

/// What happened to the mirror copy during an upsert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MirrorStatus {
    Disabled,
    Synced { mirror: String },
    Failed { mirror: String, reason: String },
}

/// Result of a successful upsert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpsertReceipt {
    /// An existing record for the same item was replaced.
    pub replaced: bool,
    pub mirror: MirrorStatus,
}

impl UpsertReceipt {
    /// Human-readable warning when the mirror copy could not be updated.
    pub fn warning(&self) -> Option<String> {
        match &self.mirror {
            MirrorStatus::Failed { mirror, reason } => Some(format!(
                "Saved locally, but the copy on '{mirror}' could not be updated: {reason}"
            )),
            _ => None,
        }
    }
}

/// Primary JSONL store composed with an optional mirror.
pub struct AnnotationStore {
    primary: JsonlRecordStore,
    mirror: Option<Arc<dyn RecordMirror>>,
    write_timeout: Duration,
    mirror_timeout: Duration,
}

impl AnnotationStore {
    /// Local-only store.
    pub fn local(primary: JsonlRecordStore) -> Self {
        Self {
            primary,
            mirror: None,
            write_timeout: DEFAULT_WRITE_TIMEOUT,
            mirror_timeout: DEFAULT_MIRROR_TIMEOUT,
        }
    }

    /// Add a best-effort mirror, bounding each mirror write by `timeout`.
    pub fn with_mirror(mut self, mirror: Arc<dyn RecordMirror>, timeout: Duration) -> Self {
        self.mirror = Some(mirror);
        self.mirror_timeout = timeout;
        self
    }

    pub fn with_write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = timeout;
        self
    }

    pub fn mode(&self) -> StorageMode {
        if self.mirror.is_some() {
            StorageMode::LocalWithMirror
        } else {
            StorageMode::Local
        }
    }

    pub fn primary(&self) -> &JsonlRecordStore {
        &self.primary
    }

    /// Durably store `record`, then refresh the mirror copy.
    pub async fn upsert(&self, record: &AnnotationRecord) -> Result<UpsertReceipt, StorageError> {
        let replaced = tokio::time::timeout(self.write_timeout, self.primary.upsert(record))
            .await
            .map_err(|_| StorageError::WriteTimeout {
                path: self.primary.records_path(&record.annotator_id),
                after: self.write_timeout,
            })??;

        let mirror = match &self.mirror {
            Some(mirror) => self.sync_mirror(mirror.as_ref(), &record.annotator_id).await,
            None => MirrorStatus::Disabled,
        };

        Ok(UpsertReceipt { replaced, mirror })
    }

    pub async fn list_by_annotator(
        &self,
        annotator_id: &str,
    ) -> Result<Vec<AnnotationRecord>, StorageError> {
        self.primary.list_by_annotator(annotator_id).await
    }

    pub async fn exists(&self, annotator_id: &str, item_id: &str) -> Result<bool, StorageError> {
        self.primary.exists(annotator_id, item_id).await
    }

    pub async fn health_check(&self) -> Result<(), StorageError> {
        self.primary.health_check().await
    }

    async fn sync_mirror(&self, mirror: &dyn RecordMirror, annotator_id: &str) -> MirrorStatus {
        let name = mirror.name().to_string();

        let records = match self.primary.list_by_annotator(annotator_id).await {
            Ok(records) => records,
            Err(e) => return mirror_failed(name, annotator_id, e.to_string()),
        };

        match tokio::time::timeout(self.mirror_timeout, mirror.mirror(annotator_id, &records))
            .await
        {
            Ok(Ok(())) => {
                tracing::debug!(
                    annotator_id,
                    mirror = %name,
                    records = records.len(),
                    "Records mirrored"
                );
                MirrorStatus::Synced { mirror: name }
            }
            Ok(Err(e)) => mirror_failed(name, annotator_id, e.message),
            Err(_) => mirror_failed(
                name,
                annotator_id,
                format!("timed out after {:?}", self.mirror_timeout),
            ),
        }
    }
}

fn mirror_failed(mirror: String, annotator_id: &str, reason: String) -> MirrorStatus {
    tracing::warn!(
        annotator_id,
        mirror = %mirror,
        reason = %reason,
        "Mirror write failed; primary record is saved"
    );
    MirrorStatus::Failed { mirror, reason }
}
