//! Dataset items and the in-memory dataset they are loaded into.
//!
//! The dataset is an ordered, immutable sequence of image/text pairs. It is
//! parsed once at startup from a JSON array; order in the source file is the
//! annotation order.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Prefix used for ids synthesized for items that carry none.
pub const GENERATED_ID_PREFIX: &str = "item_";

/// A single image/text pair to annotate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub image_reference: String,
    pub text: String,
}

/// Raw item as found in the source file. Older exports name the image
/// field `image_id`, newer ones `image_path`.
#[derive(Debug, Deserialize)]
struct RawItem {
    #[serde(default)]
    id: Option<String>,
    #[serde(alias = "image_id", alias = "image_path")]
    image_reference: String,
    text: String,
}

/// Ordered collection of items with unique ids.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    items: Vec<Item>,
}

impl Dataset {
    /// Build a dataset from already-constructed items, rejecting duplicate ids.
    pub fn new(items: Vec<Item>) -> Result<Self, CoreError> {
        let mut seen = HashSet::with_capacity(items.len());
        for item in &items {
            if item.id.trim().is_empty() {
                return Err(CoreError::Validation(
                    "dataset item id must not be empty".to_string(),
                ));
            }
            if !seen.insert(item.id.as_str()) {
                return Err(CoreError::Validation(format!(
                    "duplicate dataset item id '{}'",
                    item.id
                )));
            }
        }
        Ok(Self { items })
    }

    /// Parse a dataset from a JSON array of item objects.
    ///
    /// Items without an `id` are assigned `item_{index}` where `index` is the
    /// 0-based position in the array.
    pub fn from_json_str(json: &str) -> Result<Self, CoreError> {
        let raw: Vec<RawItem> = serde_json::from_str(json)
            .map_err(|e| CoreError::Validation(format!("invalid dataset JSON: {e}")))?;

        let items = raw
            .into_iter()
            .enumerate()
            .map(|(index, r)| Item {
                id: r
                    .id
                    .unwrap_or_else(|| format!("{GENERATED_ID_PREFIX}{index}")),
                image_reference: r.image_reference,
                text: r.text,
            })
            .collect();

        Self::new(items)
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Look up an item by id.
    pub fn get(&self, id: &str) -> Option<&Item> {
        self.items.iter().find(|item| item.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_items_and_generates_missing_ids() {
        let json = r#"[
            {"image_id": "a.jpg", "text": "first"},
            {"id": "custom", "image_path": "b.jpg", "text": "second", "source": "x"}
        ]"#;
        let dataset = Dataset::from_json_str(json).unwrap();

        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.items()[0].id, "item_0");
        assert_eq!(dataset.items()[0].image_reference, "a.jpg");
        assert_eq!(dataset.items()[1].id, "custom");
        assert_eq!(dataset.items()[1].image_reference, "b.jpg");
    }

    #[test]
    fn rejects_duplicate_ids() {
        let json = r#"[
            {"id": "x", "image_id": "a.jpg", "text": "one"},
            {"id": "x", "image_id": "b.jpg", "text": "two"}
        ]"#;
        let err = Dataset::from_json_str(json).unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn rejects_non_array_json() {
        assert!(Dataset::from_json_str(r#"{"id": "x"}"#).is_err());
    }

    #[test]
    fn get_finds_by_id() {
        let json = r#"[{"image_id": "a.jpg", "text": "t"}]"#;
        let dataset = Dataset::from_json_str(json).unwrap();
        assert_eq!(dataset.get("item_0").map(|i| i.text.as_str()), Some("t"));
        assert!(dataset.get("item_1").is_none());
    }
}
