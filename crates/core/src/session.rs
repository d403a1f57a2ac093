//! Per-request session state for one annotator.
//!
//! A [`SessionState`] is never stored. It is rebuilt on each request from
//! the persisted records (which fix the cursor position) and the in-flight
//! [`LabelSession`], if the annotator has one.

use std::collections::HashSet;

use serde::Serialize;

use crate::cursor::{CursorPosition, DatasetCursor};
use crate::error::CoreError;
use crate::labeling::{LabelSession, LabelState};
use crate::record::AnnotationRecord;

/// Session status as reported to the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    AwaitingClaimDecision,
    AwaitingCheckworthyDecision,
    EndOfDataset,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub annotator_id: String,
    /// 0-based index of the active item within the annotator's assignment.
    pub current_index: usize,
    pub pending_claim_decision: Option<bool>,
    label: Option<LabelSession>,
    revising: bool,
}

impl SessionState {
    /// Rebuild the session from persisted records and an optional in-flight
    /// label session.
    ///
    /// The in-flight session is kept when it targets the cursor's item, or
    /// an already-annotated assigned item (a revision). Anything else is
    /// stale and discarded.
    pub fn reconstruct(
        cursor: &DatasetCursor<'_>,
        annotator_id: &str,
        records: &[AnnotationRecord],
        in_flight: Option<&LabelSession>,
    ) -> Result<Self, CoreError> {
        let position = cursor.next(annotator_id, records)?;

        if let Some(label) = in_flight {
            let annotated: HashSet<&str> = records
                .iter()
                .filter(|r| r.annotator_id == annotator_id)
                .map(|r| r.item_id.as_str())
                .collect();

            let is_cursor_item = position
                .item()
                .is_some_and(|item| item.id == label.item_id());

            if is_cursor_item {
                return Ok(Self::active(annotator_id, position.index(), label.clone(), false));
            }
            if annotated.contains(label.item_id()) {
                if let Ok((index, _)) = cursor.find_assigned(annotator_id, label.item_id()) {
                    return Ok(Self::active(annotator_id, index, label.clone(), true));
                }
            }
        }

        Ok(match position {
            CursorPosition::Item { index, item } => {
                Self::active(annotator_id, index, LabelSession::new(item.id.clone()), false)
            }
            CursorPosition::EndOfDataset { index } => Self {
                annotator_id: annotator_id.to_string(),
                current_index: index,
                pending_claim_decision: None,
                label: None,
                revising: false,
            },
        })
    }

    fn active(annotator_id: &str, index: usize, label: LabelSession, revising: bool) -> Self {
        Self {
            annotator_id: annotator_id.to_string(),
            current_index: index,
            pending_claim_decision: label.pending_claim_decision(),
            label: Some(label),
            revising,
        }
    }

    /// Label session for the active item, `None` at end of dataset.
    pub fn label(&self) -> Option<&LabelSession> {
        self.label.as_ref()
    }

    pub fn active_item_id(&self) -> Option<&str> {
        self.label.as_ref().map(LabelSession::item_id)
    }

    /// Whether the active item already has a record being replaced.
    pub fn is_revision(&self) -> bool {
        self.revising
    }

    pub fn status(&self) -> SessionStatus {
        match self.label.as_ref().map(LabelSession::state) {
            Some(LabelState::AwaitingCheckworthyDecision) => {
                SessionStatus::AwaitingCheckworthyDecision
            }
            Some(_) => SessionStatus::AwaitingClaimDecision,
            None => SessionStatus::EndOfDataset,
        }
    }
}
