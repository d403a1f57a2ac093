//! Pilot dataset sampling.
//!
//! A pilot dataset is a small random sample drawn from each of several
//! source corpora. This module holds the pure parts: parsing source
//! arguments and choosing samples. Reading and copying files is done by
//! `claimdesk-store`.

use std::path::PathBuf;

use rand::Rng;
use serde_json::Value;

use crate::error::CoreError;

/// Default number of samples drawn from each source.
pub const DEFAULT_SAMPLES_PER_SOURCE: usize = 25;

/// A source corpus: a JSONL file plus the directory holding its images.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PilotSource {
    pub name: String,
    pub jsonl_path: PathBuf,
    pub images_dir: PathBuf,
}

impl PilotSource {
    /// Parse `name=path/to/data.jsonl:path/to/images`.
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        let (name, paths) = raw.split_once('=').ok_or_else(|| {
            CoreError::Validation(format!(
                "Invalid source '{raw}'. Expected name=data.jsonl:images_dir"
            ))
        })?;
        let (jsonl, images) = paths.split_once(':').ok_or_else(|| {
            CoreError::Validation(format!(
                "Invalid source '{raw}'. Missing ':' between JSONL path and images dir"
            ))
        })?;
        if name.trim().is_empty() || jsonl.is_empty() || images.is_empty() {
            return Err(CoreError::Validation(format!(
                "Invalid source '{raw}'. Name and both paths must be non-empty"
            )));
        }
        Ok(Self {
            name: name.trim().to_string(),
            jsonl_path: PathBuf::from(jsonl),
            images_dir: PathBuf::from(images),
        })
    }
}

/// Randomly choose up to `per_source` rows without replacement.
pub fn sample<R: Rng + ?Sized>(rows: &[Value], per_source: usize, rng: &mut R) -> Vec<Value> {
    let amount = per_source.min(rows.len());
    rand::seq::index::sample(rng, rows.len(), amount)
        .into_iter()
        .map(|i| rows[i].clone())
        .collect()
}

/// The image file name referenced by a source row, if any.
pub fn image_id(row: &Value) -> Option<&str> {
    row.get("image_id")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}
