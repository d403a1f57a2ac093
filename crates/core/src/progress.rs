//! Per-annotator progress, recomputed from records on every call.

use std::collections::HashSet;

use serde::Serialize;

use crate::item::Item;
use crate::record::AnnotationRecord;

/// Number of submitted records for `annotator_id`.
///
/// Records failing [`AnnotationRecord::validate`] are not counted, and each
/// item counts at most once.
pub fn count(annotator_id: &str, records: &[AnnotationRecord]) -> usize {
    submitted_items(annotator_id, records).len()
}

fn submitted_items<'a>(annotator_id: &str, records: &'a [AnnotationRecord]) -> HashSet<&'a str> {
    records
        .iter()
        .filter(|r| r.annotator_id == annotator_id && r.validate().is_ok())
        .map(|r| r.item_id.as_str())
        .collect()
}

/// Progress summary shown to an annotator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub annotator_id: String,
    pub completed: usize,
    pub assigned: usize,
    pub remaining: usize,
}

impl Progress {
    pub fn compute(annotator_id: &str, assigned: &[Item], records: &[AnnotationRecord]) -> Self {
        let done = submitted_items(annotator_id, records);
        let assigned_done = assigned
            .iter()
            .filter(|item| done.contains(item.id.as_str()))
            .count();

        Self {
            annotator_id: annotator_id.to_string(),
            completed: done.len(),
            assigned: assigned.len(),
            remaining: assigned.len() - assigned_done,
        }
    }
}
