use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use claimdesk_store::dataset::load_guidelines;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct GuidelinesResponse {
    pub markdown: String,
}

/// GET /guidelines
///
/// Read on every request so edits show up without a restart.
pub async fn get_guidelines(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let markdown = load_guidelines(&state.config.guidelines_path).await;
    Ok(Json(DataResponse {
        data: GuidelinesResponse { markdown },
    }))
}
