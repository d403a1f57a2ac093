//! Two-step label state machine for a single item.
//!
//! ```text
//! AwaitingClaimDecision --claim(false)--------------------------> Submitted
//! AwaitingClaimDecision --claim(true)--> AwaitingCheckworthyDecision
//! AwaitingCheckworthyDecision --checkworthy(_)------------------> Submitted
//! AwaitingCheckworthyDecision --back---> AwaitingClaimDecision
//! ```
//!
//! Transitions are pure: [`LabelSession::apply`] returns the next session
//! and leaves `self` untouched, so a caller can defer committing the new
//! state until the resulting record is durably stored.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// States and inputs
// ---------------------------------------------------------------------------

/// Where an item is in the labeling sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelState {
    AwaitingClaimDecision,
    AwaitingCheckworthyDecision,
    Submitted,
}

impl LabelState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AwaitingClaimDecision => "awaiting_claim_decision",
            Self::AwaitingCheckworthyDecision => "awaiting_checkworthy_decision",
            Self::Submitted => "submitted",
        }
    }

    /// Prompt shown to the annotator for this state.
    pub fn prompt(&self) -> &'static str {
        match self {
            Self::AwaitingClaimDecision => {
                "Does this content make a factual claim that can be verified?"
            }
            Self::AwaitingCheckworthyDecision => "Is this claim worth fact-checking?",
            Self::Submitted => "This item has been submitted.",
        }
    }
}

impl std::fmt::Display for LabelState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An input to the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Claim(bool),
    Checkworthy(bool),
    Back,
}

impl Decision {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Claim(_) => "claim",
            Self::Checkworthy(_) => "checkworthy",
            Self::Back => "back",
        }
    }
}

/// A decision arrived out of order.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Cannot apply a {attempted} decision to item '{item_id}' while {state}")]
pub struct SequenceError {
    pub item_id: String,
    pub state: LabelState,
    pub attempted: &'static str,
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// The finalized labels for an item.
///
/// Only obtainable from a [`LabelSession`] in the `Submitted` state, which
/// guarantees `is_checkworthy` is `Some` exactly when `is_claim` is true.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelOutcome {
    is_claim: bool,
    is_checkworthy: Option<bool>,
}

impl LabelOutcome {
    pub fn is_claim(&self) -> bool {
        self.is_claim
    }

    pub fn is_checkworthy(&self) -> Option<bool> {
        self.is_checkworthy
    }

    /// Display label for the claim decision.
    pub fn claim_label(&self) -> &'static str {
        if self.is_claim {
            "Claim"
        } else {
            "No Claim"
        }
    }

    /// Display label for the checkworthiness decision, if any.
    pub fn checkworthy_label(&self) -> Option<&'static str> {
        self.is_checkworthy
            .map(|c| if c { "Checkworthy" } else { "Not Checkworthy" })
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// Label progress for one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelSession {
    item_id: String,
    state: LabelState,
    is_claim: Option<bool>,
    is_checkworthy: Option<bool>,
}

impl LabelSession {
    /// Fresh session for an item, awaiting the claim decision.
    pub fn new(item_id: impl Into<String>) -> Self {
        Self {
            item_id: item_id.into(),
            state: LabelState::AwaitingClaimDecision,
            is_claim: None,
            is_checkworthy: None,
        }
    }

    pub fn item_id(&self) -> &str {
        &self.item_id
    }

    pub fn state(&self) -> LabelState {
        self.state
    }

    /// The claim decision recorded so far, if any.
    pub fn pending_claim_decision(&self) -> Option<bool> {
        self.is_claim
    }

    /// Compute the session that results from `decision`.
    pub fn apply(&self, decision: Decision) -> Result<Self, SequenceError> {
        match (self.state, decision) {
            (LabelState::AwaitingClaimDecision, Decision::Claim(false)) => Ok(Self {
                item_id: self.item_id.clone(),
                state: LabelState::Submitted,
                is_claim: Some(false),
                is_checkworthy: None,
            }),
            (LabelState::AwaitingClaimDecision, Decision::Claim(true)) => Ok(Self {
                item_id: self.item_id.clone(),
                state: LabelState::AwaitingCheckworthyDecision,
                is_claim: Some(true),
                is_checkworthy: None,
            }),
            (LabelState::AwaitingCheckworthyDecision, Decision::Checkworthy(value)) => {
                Ok(Self {
                    item_id: self.item_id.clone(),
                    state: LabelState::Submitted,
                    is_claim: Some(true),
                    is_checkworthy: Some(value),
                })
            }
            (LabelState::AwaitingCheckworthyDecision, Decision::Back) => {
                Ok(Self::new(self.item_id.clone()))
            }
            (state, decision) => Err(SequenceError {
                item_id: self.item_id.clone(),
                state,
                attempted: decision.kind(),
            }),
        }
    }

    /// Final labels, available once the session is `Submitted`.
    pub fn outcome(&self) -> Option<LabelOutcome> {
        match (self.state, self.is_claim) {
            (LabelState::Submitted, Some(is_claim)) => Some(LabelOutcome {
                is_claim,
                is_checkworthy: self.is_checkworthy,
            }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn new_session_awaits_claim() {
        let session = LabelSession::new("a1");
        assert_eq!(session.state(), LabelState::AwaitingClaimDecision);
        assert_eq!(session.pending_claim_decision(), None);
        assert!(session.outcome().is_none());
    }

    #[test]
    fn no_claim_submits_without_checkworthiness() {
        let session = LabelSession::new("a1").apply(Decision::Claim(false)).unwrap();
        assert_eq!(session.state(), LabelState::Submitted);

        let outcome = session.outcome().unwrap();
        assert!(!outcome.is_claim());
        assert_eq!(outcome.is_checkworthy(), None);
        assert_eq!(outcome.claim_label(), "No Claim");
        assert_eq!(outcome.checkworthy_label(), None);
    }

    #[test]
    fn claim_then_checkworthy_submits() {
        let session = LabelSession::new("a1").apply(Decision::Claim(true)).unwrap();
        assert_eq!(session.state(), LabelState::AwaitingCheckworthyDecision);
        assert_eq!(session.pending_claim_decision(), Some(true));
        assert!(session.outcome().is_none());

        let session = session.apply(Decision::Checkworthy(false)).unwrap();
        let outcome = session.outcome().unwrap();
        assert!(outcome.is_claim());
        assert_eq!(outcome.is_checkworthy(), Some(false));
        assert_eq!(outcome.checkworthy_label(), Some("Not Checkworthy"));
    }

    #[test]
    fn checkworthy_before_claim_is_sequence_error() {
        let session = LabelSession::new("a1");
        let err = session.apply(Decision::Checkworthy(true)).unwrap_err();

        assert_eq!(err.state, LabelState::AwaitingClaimDecision);
        assert_eq!(err.attempted, "checkworthy");
        assert_eq!(session, LabelSession::new("a1"));
    }

    #[test]
    fn second_claim_decision_is_sequence_error() {
        let session = LabelSession::new("a1").apply(Decision::Claim(true)).unwrap();
        assert_matches!(
            session.apply(Decision::Claim(false)),
            Err(SequenceError { state: LabelState::AwaitingCheckworthyDecision, .. })
        );
    }

    #[test]
    fn submitted_is_terminal() {
        let session = LabelSession::new("a1").apply(Decision::Claim(false)).unwrap();
        assert!(session.apply(Decision::Claim(true)).is_err());
        assert!(session.apply(Decision::Checkworthy(true)).is_err());
        assert!(session.apply(Decision::Back).is_err());
    }

    #[test]
    fn back_clears_pending_claim() {
        let session = LabelSession::new("a1")
            .apply(Decision::Claim(true))
            .unwrap()
            .apply(Decision::Back)
            .unwrap();
        assert_eq!(session, LabelSession::new("a1"));
    }

    #[test]
    fn back_from_claim_prompt_is_rejected() {
        assert!(LabelSession::new("a1").apply(Decision::Back).is_err());
    }
}
