//! Dataset cursor: which item an annotator should label next.
//!
//! Position is always derived from persisted records rather than held in
//! memory, so restarting a session resumes at the first unannotated item.

use std::collections::HashSet;

use crate::annotator::AnnotatorRoster;
use crate::error::CoreError;
use crate::item::{Dataset, Item};
use crate::record::AnnotationRecord;

/// Result of advancing the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorPosition<'a> {
    /// The next item to label and its 0-based index within the assignment.
    Item { index: usize, item: &'a Item },
    /// Every assigned item has a record.
    EndOfDataset { index: usize },
}

impl<'a> CursorPosition<'a> {
    pub fn index(&self) -> usize {
        match self {
            Self::Item { index, .. } | Self::EndOfDataset { index } => *index,
        }
    }

    pub fn item(&self) -> Option<&'a Item> {
        match self {
            Self::Item { item, .. } => Some(item),
            Self::EndOfDataset { .. } => None,
        }
    }
}

/// Walks each annotator's assignment of the dataset in order.
#[derive(Debug, Clone, Copy)]
pub struct DatasetCursor<'a> {
    dataset: &'a Dataset,
    roster: &'a AnnotatorRoster,
}

impl<'a> DatasetCursor<'a> {
    pub fn new(dataset: &'a Dataset, roster: &'a AnnotatorRoster) -> Self {
        Self { dataset, roster }
    }

    /// Items assigned to `annotator_id`, in annotation order.
    pub fn assigned(&self, annotator_id: &str) -> Result<&'a [Item], CoreError> {
        let range = self.roster.assignment(annotator_id, self.dataset.len())?;
        Ok(&self.dataset.items()[range])
    }

    /// First assigned item lacking a record for `annotator_id`.
    ///
    /// Records belonging to other annotators are ignored.
    pub fn next(
        &self,
        annotator_id: &str,
        records: &[AnnotationRecord],
    ) -> Result<CursorPosition<'a>, CoreError> {
        let assigned = self.assigned(annotator_id)?;
        let annotated: HashSet<&str> = records
            .iter()
            .filter(|r| r.annotator_id == annotator_id)
            .map(|r| r.item_id.as_str())
            .collect();

        Ok(assigned
            .iter()
            .enumerate()
            .find(|(_, item)| !annotated.contains(item.id.as_str()))
            .map(|(index, item)| CursorPosition::Item { index, item })
            .unwrap_or(CursorPosition::EndOfDataset {
                index: assigned.len(),
            }))
    }

    /// Locate an assigned item by id.
    pub fn find_assigned(
        &self,
        annotator_id: &str,
        item_id: &str,
    ) -> Result<(usize, &'a Item), CoreError> {
        self.assigned(annotator_id)?
            .iter()
            .enumerate()
            .find(|(_, item)| item.id == item_id)
            .ok_or_else(|| CoreError::NotFound {
                entity: "Item",
                id: item_id.to_string(),
            })
    }
}
