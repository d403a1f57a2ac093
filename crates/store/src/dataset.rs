//! Loading the dataset and guideline text from disk.

use std::path::Path;

use claimdesk_core::guidelines;
use claimdesk_core::item::Dataset;

use crate::error::StorageError;

/// Read and parse the dataset JSON file.
pub async fn load_dataset(path: &Path) -> Result<Dataset, StorageError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| StorageError::Read {
            path: path.to_path_buf(),
            source,
        })?;
    let dataset = Dataset::from_json_str(&content)?;
    tracing::info!(path = %path.display(), items = dataset.len(), "Dataset loaded");
    Ok(dataset)
}

/// Read the guideline markdown, falling back to a placeholder when the file
/// is missing.
pub async fn load_guidelines(path: &Path) -> String {
    match tokio::fs::read_to_string(path).await {
        Ok(raw) => guidelines::normalize(&raw),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Guidelines not readable");
            guidelines::MISSING_GUIDELINES.to_string()
        }
    }
}
