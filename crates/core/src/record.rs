//! Annotation records and their JSONL encoding.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::item::Item;
use crate::labeling::LabelOutcome;
use crate::types::Timestamp;

/// One annotator's finalized labels for one item.
///
/// At most one authoritative record exists per `(annotator_id, item_id)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationRecord {
    pub annotator_id: String,
    pub item_id: String,
    pub is_claim: bool,
    #[serde(default)]
    pub is_checkworthy: Option<bool>,
    pub timestamp: Timestamp,
    /// Item text at submission time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Item image reference at submission time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_reference: Option<String>,
}

impl AnnotationRecord {
    /// Build a record from a submitted label outcome.
    pub fn from_outcome(
        annotator_id: &str,
        item: &Item,
        outcome: LabelOutcome,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            annotator_id: annotator_id.to_string(),
            item_id: item.id.clone(),
            is_claim: outcome.is_claim(),
            is_checkworthy: outcome.is_checkworthy(),
            timestamp,
            text: Some(item.text.clone()),
            image_reference: Some(item.image_reference.clone()),
        }
    }

    /// Check that checkworthiness is present exactly for claims.
    pub fn validate(&self) -> Result<(), CoreError> {
        match (self.is_claim, self.is_checkworthy) {
            (true, None) => Err(CoreError::Validation(format!(
                "record for item '{}' is a claim but has no checkworthiness decision",
                self.item_id
            ))),
            (false, Some(_)) => Err(CoreError::Validation(format!(
                "record for item '{}' is not a claim but has a checkworthiness decision",
                self.item_id
            ))),
            _ => Ok(()),
        }
    }
}

/// Encode records as newline-delimited JSON, one object per line.
pub fn to_jsonl(records: &[AnnotationRecord]) -> Result<String, serde_json::Error> {
    let mut out = String::new();
    for record in records {
        out.push_str(&serde_json::to_string(record)?);
        out.push('\n');
    }
    Ok(out)
}
