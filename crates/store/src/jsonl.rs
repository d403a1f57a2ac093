//! Primary record store: one JSONL file per annotator.
//!
//! Layout: `<root>/<annotator_id>/annotations/<annotator_id>_annotations.jsonl`.
//!
//! Every upsert rewrites the annotator's file through a temp file, `fsync`
//! and an atomic rename, so readers always see a complete file and a
//! returned `Ok` means the record is on disk. Writers for the same
//! annotator are serialized; different annotators never share a file.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{NaiveDateTime, TimeZone, Utc};
use claimdesk_core::annotator::validate_annotator_id;
use claimdesk_core::mirror::records_file_name;
use claimdesk_core::record::{to_jsonl, AnnotationRecord};
use serde::Deserialize;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::error::StorageError;

/// Name of the per-annotator subdirectory holding record files.
const ANNOTATIONS_DIR: &str = "annotations";

/// Timestamp format used by legacy records (`20240501_120000`).
const LEGACY_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Hidden directory, next to the target file, holding in-progress writes.
const STAGING_DIR: &str = ".staging";

/// Process-wide sequence making every staged file name unique.
static STAGING_SEQ: AtomicU64 = AtomicU64::new(0);

/// JSONL-file record store rooted at a data directory.
pub struct JsonlRecordStore {
    root: PathBuf,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl JsonlRecordStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Path of the record file for `annotator_id`.
    pub fn records_path(&self, annotator_id: &str) -> PathBuf {
        self.root
            .join(annotator_id)
            .join(ANNOTATIONS_DIR)
            .join(records_file_name(annotator_id))
    }

    /// Ensure the data directory exists and is a directory.
    pub async fn health_check(&self) -> Result<(), StorageError> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|source| StorageError::Write {
                path: self.root.clone(),
                source,
            })?;
        let meta = tokio::fs::metadata(&self.root)
            .await
            .map_err(|source| StorageError::Read {
                path: self.root.clone(),
                source,
            })?;
        if meta.permissions().readonly() {
            return Err(StorageError::Write {
                path: self.root.clone(),
                source: std::io::Error::new(
                    std::io::ErrorKind::PermissionDenied,
                    "data directory is read-only",
                ),
            });
        }
        Ok(())
    }

    /// Insert or replace the record keyed by `(annotator_id, item_id)`.
    ///
    /// Returns `true` when an existing record was replaced. The record is
    /// flushed to disk before this returns `Ok`.
    ///
    /// The read-modify-write runs on its own task that owns the annotator's
    /// lock, so dropping this future (a timeout, a dropped request) never
    /// leaves a half-finished write behind an unlocked file. A caller that
    /// gives up early may find the record saved anyway; upserts are
    /// idempotent, so retrying is safe.
    pub async fn upsert(&self, record: &AnnotationRecord) -> Result<bool, StorageError> {
        validate_annotator_id(&record.annotator_id)?;
        record.validate()?;

        let guard = self.lock_for(&record.annotator_id).await.lock_owned().await;
        let path = self.records_path(&record.annotator_id);

        let task = tokio::spawn({
            let path = path.clone();
            let record = record.clone();
            async move {
                let _guard = guard;
                let mut records = read_records(&path).await?;

                let replaced = match records.iter_mut().find(|r| r.item_id == record.item_id) {
                    Some(existing) => {
                        *existing = record;
                        true
                    }
                    None => {
                        records.push(record);
                        false
                    }
                };

                let content = to_jsonl(&records)?;
                write_atomic(&path, content.as_bytes()).await?;
                Ok::<_, StorageError>(replaced)
            }
        });

        let replaced = task.await.map_err(|e| StorageError::Write {
            path: path.clone(),
            source: std::io::Error::other(e.to_string()),
        })??;

        tracing::debug!(
            annotator_id = %record.annotator_id,
            item_id = %record.item_id,
            path = %path.display(),
            replaced,
            "Annotation record written"
        );

        Ok(replaced)
    }

    /// All records for `annotator_id`, in first-submission order.
    pub async fn list_by_annotator(
        &self,
        annotator_id: &str,
    ) -> Result<Vec<AnnotationRecord>, StorageError> {
        validate_annotator_id(annotator_id)?;
        read_records(&self.records_path(annotator_id)).await
    }

    /// The record for `(annotator_id, item_id)`, if one exists.
    pub async fn find(
        &self,
        annotator_id: &str,
        item_id: &str,
    ) -> Result<Option<AnnotationRecord>, StorageError> {
        Ok(self
            .list_by_annotator(annotator_id)
            .await?
            .into_iter()
            .find(|r| r.item_id == item_id))
    }

    pub async fn exists(&self, annotator_id: &str, item_id: &str) -> Result<bool, StorageError> {
        Ok(self.find(annotator_id, item_id).await?.is_some())
    }

    async fn lock_for(&self, annotator_id: &str) -> Arc<Mutex<()>> {
        self.locks
            .lock()
            .await
            .entry(annotator_id.to_string())
            .or_default()
            .clone()
    }
}

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

/// A line in a record file: either the current schema or the format
/// written by the first version of the annotation form.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredLine {
    Current(AnnotationRecord),
    Legacy(LegacyRecord),
}

#[derive(Deserialize)]
struct LegacyRecord {
    annotator_id: String,
    item_id: String,
    timestamp: String,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    image_id: Option<String>,
    annotation: LegacyAnnotation,
}

#[derive(Deserialize)]
struct LegacyAnnotation {
    claim_status: String,
    #[serde(default)]
    checkworthiness: Option<String>,
}

impl LegacyRecord {
    fn into_record(self) -> Result<AnnotationRecord, String> {
        let is_claim = match self.annotation.claim_status.as_str() {
            "Claim" => true,
            "No Claim" => false,
            other => return Err(format!("unknown claim_status '{other}'")),
        };
        let is_checkworthy = match (is_claim, self.annotation.checkworthiness.as_deref()) {
            (false, _) => None,
            (true, Some("Checkworthy")) => Some(true),
            (true, Some("Not Checkworthy")) => Some(false),
            (true, other) => return Err(format!("unknown checkworthiness {other:?}")),
        };
        let naive = NaiveDateTime::parse_from_str(&self.timestamp, LEGACY_TIMESTAMP_FORMAT)
            .map_err(|e| format!("invalid legacy timestamp '{}': {e}", self.timestamp))?;

        Ok(AnnotationRecord {
            annotator_id: self.annotator_id,
            item_id: self.item_id,
            is_claim,
            is_checkworthy,
            timestamp: Utc.from_utc_datetime(&naive),
            text: self.text,
            image_reference: self.image_id,
        })
    }
}

/// Read and parse a record file. A missing file holds no records.
async fn read_records(path: &Path) -> Result<Vec<AnnotationRecord>, StorageError> {
    match tokio::fs::read_to_string(path).await {
        Ok(content) => parse_records(path, &content),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(source) => Err(StorageError::Read {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Parse JSONL content. Blank lines are skipped; when an item appears on
/// several lines (append-only files), the last line wins but the item keeps
/// its first position.
fn parse_records(path: &Path, content: &str) -> Result<Vec<AnnotationRecord>, StorageError> {
    let mut records: Vec<AnnotationRecord> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for (i, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let corrupt = |message: String| StorageError::Corrupt {
            path: path.to_path_buf(),
            line: i + 1,
            message,
        };

        let record = match serde_json::from_str::<StoredLine>(line)
            .map_err(|e| corrupt(e.to_string()))?
        {
            StoredLine::Current(record) => {
                record.validate().map_err(|e| corrupt(e.to_string()))?;
                record
            }
            StoredLine::Legacy(legacy) => legacy.into_record().map_err(corrupt)?,
        };

        match positions.get(&record.item_id) {
            Some(&pos) => records[pos] = record,
            None => {
                positions.insert(record.item_id.clone(), records.len());
                records.push(record);
            }
        }
    }

    Ok(records)
}

// ---------------------------------------------------------------------------
// Writing
// ---------------------------------------------------------------------------

/// Write `bytes` to `path` via a uniquely named staged file, `fsync` and
/// rename.
///
/// Staged files live in a `.staging` directory beside `path`, so a rename
/// stays on the same filesystem. The directory is removed once empty.
pub(crate) async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), StorageError> {
    let write_err = |source: std::io::Error| StorageError::Write {
        path: path.to_path_buf(),
        source,
    };
    let parent = path.parent().ok_or_else(|| {
        write_err(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "record path has no parent directory",
        ))
    })?;
    let staging = parent.join(STAGING_DIR);
    tokio::fs::create_dir_all(&staging).await.map_err(write_err)?;

    let tmp = staging.join(format!(
        "{}.{}.{}",
        path.file_name().and_then(|s| s.to_str()).unwrap_or("records"),
        std::process::id(),
        STAGING_SEQ.fetch_add(1, Ordering::Relaxed)
    ));

    let result = async {
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.sync_all().await?;
        drop(file);
        tokio::fs::rename(&tmp, path).await
    }
    .await;

    if let Err(source) = result {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(write_err(source));
    }
    // Only succeeds once no other write is staged.
    let _ = tokio::fs::remove_dir(&staging).await;

    let synced = match tokio::fs::File::open(parent).await {
        Ok(dir) => dir.sync_all().await,
        Err(e) => Err(e),
    };
    if let Err(e) = synced {
        tracing::warn!(
            path = %parent.display(),
            error = %e,
            "Could not sync directory after rename; the write may not survive a crash"
        );
    }
    Ok(())
}
