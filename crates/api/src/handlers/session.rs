//! Handlers for an annotator's labeling session.
//!
//! Every request rebuilds the [`SessionState`] from the records on disk and
//! the annotator's in-flight [`LabelSession`]. Decisions are applied to a
//! copy of the label session; the registry slot is only updated once any
//! resulting record has been durably stored.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use claimdesk_core::error::CoreError;
use claimdesk_core::item::Item;
use claimdesk_core::labeling::{Decision, LabelSession};
use claimdesk_core::progress::Progress;
use claimdesk_core::record::AnnotationRecord;
use claimdesk_core::session::{SessionState, SessionStatus};
use claimdesk_store::MirrorStatus;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/* --------------------------------------------------------------------------
   Request bodies
   -------------------------------------------------------------------------- */

#[derive(Debug, Deserialize)]
pub struct ClaimDecisionRequest {
    pub item_id: String,
    pub is_claim: bool,
}

#[derive(Debug, Deserialize)]
pub struct CheckworthyDecisionRequest {
    pub item_id: String,
    pub is_checkworthy: bool,
}

#[derive(Debug, Deserialize)]
pub struct BackRequest {
    pub item_id: String,
}

/* --------------------------------------------------------------------------
   Response payloads
   -------------------------------------------------------------------------- */

/// What the annotator should see next.
#[derive(Debug, Serialize)]
pub struct SessionView {
    pub annotator_id: String,
    pub status: SessionStatus,
    /// 0-based position of the active item within the assignment.
    pub current_index: usize,
    pub pending_claim_decision: Option<bool>,
    /// The active item already has a record that will be replaced.
    pub revising: bool,
    pub prompt: Option<&'static str>,
    pub item: Option<Item>,
    pub progress: Progress,
}

#[derive(Debug, Serialize)]
pub struct DecisionResponse {
    pub session: SessionView,
    /// The record written by this decision, if it completed the item.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submitted: Option<AnnotationRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mirror: Option<MirrorStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/* --------------------------------------------------------------------------
   Handlers
   -------------------------------------------------------------------------- */

/// GET /annotators/{annotator_id}/session
pub async fn get_session(
    State(state): State<AppState>,
    Path(annotator_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    state.roster.resolve(&annotator_id)?;
    let slot = state.sessions.acquire(&annotator_id).await;

    let records = state.store.list_by_annotator(&annotator_id).await?;
    let session = SessionState::reconstruct(&state.cursor(), &annotator_id, &records, slot.as_ref())?;

    Ok(Json(DataResponse {
        data: session_view(&state, &session, &records)?,
    }))
}

/// POST /annotators/{annotator_id}/decisions/claim
pub async fn decide_claim(
    State(state): State<AppState>,
    Path(annotator_id): Path<String>,
    Json(input): Json<ClaimDecisionRequest>,
) -> AppResult<impl IntoResponse> {
    let response = apply_decision(
        &state,
        &annotator_id,
        &input.item_id,
        Decision::Claim(input.is_claim),
    )
    .await?;
    Ok(Json(DataResponse { data: response }))
}

/// POST /annotators/{annotator_id}/decisions/checkworthy
pub async fn decide_checkworthy(
    State(state): State<AppState>,
    Path(annotator_id): Path<String>,
    Json(input): Json<CheckworthyDecisionRequest>,
) -> AppResult<impl IntoResponse> {
    let response = apply_decision(
        &state,
        &annotator_id,
        &input.item_id,
        Decision::Checkworthy(input.is_checkworthy),
    )
    .await?;
    Ok(Json(DataResponse { data: response }))
}

/// POST /annotators/{annotator_id}/decisions/back
///
/// Return from the checkworthiness question to the claim question.
pub async fn go_back(
    State(state): State<AppState>,
    Path(annotator_id): Path<String>,
    Json(input): Json<BackRequest>,
) -> AppResult<impl IntoResponse> {
    let response = apply_decision(&state, &annotator_id, &input.item_id, Decision::Back).await?;
    Ok(Json(DataResponse { data: response }))
}

/// POST /annotators/{annotator_id}/items/{item_id}/revise
///
/// Re-open an already annotated item. Its next submission replaces the
/// existing record. Revising the item that is already open is a no-op.
pub async fn revise_item(
    State(state): State<AppState>,
    Path((annotator_id, item_id)): Path<(String, String)>,
) -> AppResult<impl IntoResponse> {
    state.roster.resolve(&annotator_id)?;
    let mut slot = state.sessions.acquire(&annotator_id).await;
    let cursor = state.cursor();

    cursor.find_assigned(&annotator_id, &item_id)?;
    if !state.store.exists(&annotator_id, &item_id).await? {
        return Err(CoreError::Conflict(format!(
            "Item '{item_id}' has no submitted annotation to revise"
        ))
        .into());
    }

    let already_open = slot.as_ref().is_some_and(|label| label.item_id() == item_id);
    if !already_open {
        *slot = Some(LabelSession::new(item_id.clone()));
        tracing::info!(annotator_id = %annotator_id, item_id = %item_id, "Item reopened for revision");
    }

    let records = state.store.list_by_annotator(&annotator_id).await?;
    let session = SessionState::reconstruct(&cursor, &annotator_id, &records, slot.as_ref())?;

    Ok(Json(DataResponse {
        data: session_view(&state, &session, &records)?,
    }))
}

/// GET /annotators/{annotator_id}/records
pub async fn list_records(
    State(state): State<AppState>,
    Path(annotator_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    state.roster.resolve(&annotator_id)?;
    let records = state.store.list_by_annotator(&annotator_id).await?;
    Ok(Json(DataResponse { data: records }))
}

/// GET /annotators/{annotator_id}/progress
pub async fn get_progress(
    State(state): State<AppState>,
    Path(annotator_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let assigned = state.cursor().assigned(&annotator_id)?;
    let records = state.store.list_by_annotator(&annotator_id).await?;
    Ok(Json(DataResponse {
        data: Progress::compute(&annotator_id, assigned, &records),
    }))
}

/* --------------------------------------------------------------------------
   Helpers
   -------------------------------------------------------------------------- */

async fn apply_decision(
    state: &AppState,
    annotator_id: &str,
    item_id: &str,
    decision: Decision,
) -> AppResult<DecisionResponse> {
    state.roster.resolve(annotator_id)?;
    let mut slot = state.sessions.acquire(annotator_id).await;
    let cursor = state.cursor();

    let records = state.store.list_by_annotator(annotator_id).await?;
    let session = SessionState::reconstruct(&cursor, annotator_id, &records, slot.as_ref())?;

    let label = session.label().ok_or_else(|| {
        CoreError::Conflict(format!(
            "Annotator {annotator_id} has reached the end of the dataset"
        ))
    })?;
    if label.item_id() != item_id {
        return Err(CoreError::Conflict(format!(
            "Item '{item_id}' is not the active item; expected '{}'",
            label.item_id()
        ))
        .into());
    }

    let next = label.apply(decision).map_err(CoreError::from)?;

    let Some(outcome) = next.outcome() else {
        tracing::info!(
            annotator_id,
            item_id,
            decision = decision.kind(),
            state = %next.state(),
            "Label decision applied"
        );
        *slot = Some(next);
        let session = SessionState::reconstruct(&cursor, annotator_id, &records, slot.as_ref())?;
        return Ok(DecisionResponse {
            session: session_view(state, &session, &records)?,
            submitted: None,
            mirror: None,
            warning: None,
        });
    };

    let (_, item) = cursor.find_assigned(annotator_id, item_id)?;
    let record = AnnotationRecord::from_outcome(annotator_id, item, outcome, Utc::now());
    let receipt = state.store.upsert(&record).await?;
    *slot = None;

    tracing::info!(
        annotator_id,
        item_id,
        claim = outcome.claim_label(),
        checkworthiness = outcome.checkworthy_label(),
        replaced = receipt.replaced,
        "Annotation submitted"
    );

    let records = state.store.list_by_annotator(annotator_id).await?;
    let session = SessionState::reconstruct(&cursor, annotator_id, &records, None)?;
    let warning = receipt.warning();

    Ok(DecisionResponse {
        session: session_view(state, &session, &records)?,
        submitted: Some(record),
        mirror: Some(receipt.mirror),
        warning,
    })
}

fn session_view(
    state: &AppState,
    session: &SessionState,
    records: &[AnnotationRecord],
) -> AppResult<SessionView> {
    let assigned = state.cursor().assigned(&session.annotator_id)?;
    let item = session
        .active_item_id()
        .and_then(|id| state.dataset.get(id))
        .cloned();

    Ok(SessionView {
        annotator_id: session.annotator_id.clone(),
        status: session.status(),
        current_index: session.current_index,
        pending_claim_decision: session.pending_claim_decision,
        revising: session.is_revision(),
        prompt: session.label().map(|label| label.state().prompt()),
        item,
        progress: Progress::compute(&session.annotator_id, assigned, records),
    })
}
