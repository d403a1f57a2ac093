//! File-backed persistence for claimdesk.
//!
//! - [`JsonlRecordStore`]: one JSONL file per annotator, rewritten
//!   atomically on every upsert.
//! - [`AnnotationStore`]: the primary store composed with an optional
//!   best-effort [`RecordMirror`](claimdesk_core::mirror::RecordMirror).
//! - [`dataset`] and [`pilot`]: loading the dataset and building pilot
//!   datasets from source corpora.

pub mod annotation_store;
pub mod dataset;
pub mod error;
pub mod jsonl;
pub mod pilot;

pub use annotation_store::{AnnotationStore, MirrorStatus, UpsertReceipt};
pub use error::StorageError;
pub use jsonl::JsonlRecordStore;
