//! Building a pilot dataset from source corpora on disk.

use std::path::{Component, Path, PathBuf};

use claimdesk_core::pilot::{self, PilotSource};
use rand::Rng;
use serde_json::Value;

use crate::error::StorageError;
use crate::jsonl::write_atomic;

/// File name of the combined pilot dataset.
pub const PILOT_DATA_FILE: &str = "pilot_data.json";

/// Outcome of a pilot build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PilotSummary {
    pub total: usize,
    pub missing_images: usize,
    pub dataset_path: PathBuf,
    pub images_dir: PathBuf,
}

/// Sample `per_source` rows from each source, copy their images into
/// `<output>/images`, and write the samples to `<output>/pilot_data.json`.
pub async fn build_pilot_dataset<R: Rng + Send>(
    sources: &[PilotSource],
    per_source: usize,
    output_dir: &Path,
    rng: &mut R,
) -> Result<PilotSummary, StorageError> {
    let images_dir = output_dir.join("images");
    tokio::fs::create_dir_all(&images_dir)
        .await
        .map_err(|source| StorageError::Write {
            path: images_dir.clone(),
            source,
        })?;

    let mut samples = Vec::new();
    let mut missing_images = 0;

    for source in sources {
        tracing::info!(source = %source.name, path = %source.jsonl_path.display(), "Processing source");
        let rows = read_jsonl_rows(&source.jsonl_path).await?;
        let picked = pilot::sample(&rows, per_source, rng);

        for row in &picked {
            let Some(image_id) = pilot::image_id(row) else {
                continue;
            };
            if !is_plain_file_name(image_id) {
                tracing::warn!(image_id, source = %source.name, "Image id is not a plain file name; skipping copy");
                missing_images += 1;
                continue;
            }
            let from = source.images_dir.join(image_id);
            let to = images_dir.join(image_id);
            if tokio::fs::try_exists(&from).await.unwrap_or(false) {
                tokio::fs::copy(&from, &to)
                    .await
                    .map_err(|source| StorageError::Write {
                        path: to.clone(),
                        source,
                    })?;
            } else {
                tracing::warn!(image_id, source = %source.name, "Image not found");
                missing_images += 1;
            }
        }

        samples.extend(picked);
    }

    let dataset_path = output_dir.join(PILOT_DATA_FILE);
    let json = serde_json::to_string_pretty(&samples)?;
    write_atomic(&dataset_path, json.as_bytes()).await?;

    tracing::info!(
        total = samples.len(),
        missing_images,
        path = %dataset_path.display(),
        "Pilot dataset written"
    );

    Ok(PilotSummary {
        total: samples.len(),
        missing_images,
        dataset_path,
        images_dir,
    })
}

/// `true` when `name` is a single path component, so joining it onto a
/// directory cannot leave that directory.
fn is_plain_file_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

async fn read_jsonl_rows(path: &Path) -> Result<Vec<Value>, StorageError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| StorageError::Read {
            path: path.to_path_buf(),
            source,
        })?;

    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            serde_json::from_str(line).map_err(|e| StorageError::Corrupt {
                path: path.to_path_buf(),
                line: i + 1,
                message: e.to_string(),
            })
        })
        .collect()
}
