//! Annotator identity validation, roster, and dataset assignment.
//!
//! Annotator ids become path components in the record store, so they are
//! restricted to a conservative character set. When a roster is configured,
//! the dataset is split into contiguous slices, one per annotator, with the
//! last annotator also taking the remainder.

use std::ops::Range;

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Maximum length of an annotator id.
pub const MAX_ANNOTATOR_ID_LEN: usize = 64;

/// Size of the default roster (`annotator_01` .. `annotator_04`).
pub const DEFAULT_ROSTER_SIZE: usize = 4;

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate that an annotator id is non-empty, bounded, and contains only
/// ASCII alphanumerics, `_` or `-`.
pub fn validate_annotator_id(id: &str) -> Result<(), CoreError> {
    if id.is_empty() {
        return Err(CoreError::Validation(
            "annotator id must not be empty".to_string(),
        ));
    }
    if id.len() > MAX_ANNOTATOR_ID_LEN {
        return Err(CoreError::Validation(format!(
            "annotator id must be at most {MAX_ANNOTATOR_ID_LEN} characters, got {}",
            id.len()
        )));
    }
    if !id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(CoreError::Validation(format!(
            "Invalid annotator id '{id}'. Only letters, digits, '_' and '-' are allowed"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Roster
// ---------------------------------------------------------------------------

/// The set of annotators allowed to label, in assignment order.
///
/// An empty roster admits any valid id and assigns every annotator the
/// whole dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnotatorRoster {
    ids: Vec<String>,
}

impl AnnotatorRoster {
    /// Build a roster, validating every id and rejecting duplicates.
    pub fn new(ids: Vec<String>) -> Result<Self, CoreError> {
        for (i, id) in ids.iter().enumerate() {
            validate_annotator_id(id)?;
            if ids[..i].contains(id) {
                return Err(CoreError::Validation(format!(
                    "duplicate annotator id '{id}' in roster"
                )));
            }
        }
        Ok(Self { ids })
    }

    /// `annotator_01` through `annotator_{count:02}`.
    pub fn numbered(count: usize) -> Self {
        Self {
            ids: (1..=count).map(|i| format!("annotator_{i:02}")).collect(),
        }
    }

    /// Roster admitting any valid annotator id.
    pub fn open() -> Self {
        Self::default()
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn is_open(&self) -> bool {
        self.ids.is_empty()
    }

    /// Validate `id` and check it belongs to the roster.
    ///
    /// Returns the annotator's 0-based slot, or `None` for an open roster.
    pub fn resolve(&self, id: &str) -> Result<Option<usize>, CoreError> {
        validate_annotator_id(id)?;
        if self.is_open() {
            return Ok(None);
        }
        self.ids
            .iter()
            .position(|known| known == id)
            .map(Some)
            .ok_or_else(|| CoreError::NotFound {
                entity: "Annotator",
                id: id.to_string(),
            })
    }

    /// Range of dataset indices assigned to `id`.
    pub fn assignment(&self, id: &str, total_items: usize) -> Result<Range<usize>, CoreError> {
        Ok(match self.resolve(id)? {
            Some(slot) => assigned_range(total_items, slot, self.ids.len()),
            None => 0..total_items,
        })
    }
}

/// Contiguous slice of `total_items` for annotator `slot` out of `annotators`.
///
/// Each annotator receives `total_items / annotators` items; the last one
/// also receives the remainder.
pub fn assigned_range(total_items: usize, slot: usize, annotators: usize) -> Range<usize> {
    if annotators == 0 || slot >= annotators {
        return 0..0;
    }
    let per_annotator = total_items / annotators;
    let start = slot * per_annotator;
    let end = if slot + 1 == annotators {
        total_items
    } else {
        start + per_annotator
    };
    start..end
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn valid_ids_pass() {
        assert!(validate_annotator_id("annotator_01").is_ok());
        assert!(validate_annotator_id("u1").is_ok());
        assert!(validate_annotator_id("team-a").is_ok());
    }

    #[test]
    fn path_like_ids_are_rejected() {
        assert!(validate_annotator_id("").is_err());
        assert!(validate_annotator_id("../etc").is_err());
        assert!(validate_annotator_id("a/b").is_err());
        assert!(validate_annotator_id("a b").is_err());
        assert!(validate_annotator_id(&"x".repeat(65)).is_err());
    }

    #[test]
    fn numbered_roster_matches_expected_ids() {
        let roster = AnnotatorRoster::numbered(4);
        assert_eq!(
            roster.ids(),
            &["annotator_01", "annotator_02", "annotator_03", "annotator_04"]
        );
    }

    #[test]
    fn unknown_annotator_is_not_found() {
        let roster = AnnotatorRoster::numbered(2);
        assert_matches!(
            roster.resolve("annotator_09"),
            Err(CoreError::NotFound { entity: "Annotator", .. })
        );
    }

    #[test]
    fn open_roster_assigns_everything() {
        let roster = AnnotatorRoster::open();
        assert_eq!(roster.assignment("anyone", 7).unwrap(), 0..7);
    }

    #[test]
    fn roster_rejects_duplicates() {
        let ids = vec!["a".to_string(), "b".to_string(), "a".to_string()];
        assert!(AnnotatorRoster::new(ids).is_err());
    }

    #[test]
    fn last_annotator_takes_remainder() {
        assert_eq!(assigned_range(10, 0, 4), 0..2);
        assert_eq!(assigned_range(10, 1, 4), 2..4);
        assert_eq!(assigned_range(10, 2, 4), 4..6);
        assert_eq!(assigned_range(10, 3, 4), 6..10);
    }

    #[test]
    fn fewer_items_than_annotators() {
        assert_eq!(assigned_range(3, 0, 4), 0..0);
        assert_eq!(assigned_range(3, 3, 4), 0..3);
    }

    #[test]
    fn out_of_range_slot_gets_nothing() {
        assert_eq!(assigned_range(10, 4, 4), 0..0);
        assert_eq!(assigned_range(10, 0, 0), 0..0);
    }
}
