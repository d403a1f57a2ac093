pub mod annotator;
pub mod health;

use axum::routing::get;
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /guidelines                                        guideline markdown (GET)
///
/// /annotators/{annotator_id}/session                 session view (GET)
/// /annotators/{annotator_id}/decisions/claim         claim decision (POST)
/// /annotators/{annotator_id}/decisions/checkworthy   checkworthiness decision (POST)
/// /annotators/{annotator_id}/decisions/back          back to claim question (POST)
/// /annotators/{annotator_id}/items/{item_id}/revise  reopen annotated item (POST)
/// /annotators/{annotator_id}/records                 submitted records (GET)
/// /annotators/{annotator_id}/progress                progress summary (GET)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/guidelines", get(handlers::guidelines::get_guidelines))
        .nest("/annotators", annotator::router())
}
