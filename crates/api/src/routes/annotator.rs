//! Route definitions for annotator sessions.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::session;
use crate::state::AppState;

/// Annotator-scoped routes, nested under `/annotators`.
///
/// ```text
/// GET    /{annotator_id}/session                    get_session
/// POST   /{annotator_id}/decisions/claim            decide_claim
/// POST   /{annotator_id}/decisions/checkworthy      decide_checkworthy
/// POST   /{annotator_id}/decisions/back             go_back
/// POST   /{annotator_id}/items/{item_id}/revise     revise_item
/// GET    /{annotator_id}/records                    list_records
/// GET    /{annotator_id}/progress                   get_progress
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{annotator_id}/session", get(session::get_session))
        .route("/{annotator_id}/decisions/claim", post(session::decide_claim))
        .route(
            "/{annotator_id}/decisions/checkworthy",
            post(session::decide_checkworthy),
        )
        .route("/{annotator_id}/decisions/back", post(session::go_back))
        .route(
            "/{annotator_id}/items/{item_id}/revise",
            post(session::revise_item),
        )
        .route("/{annotator_id}/records", get(session::list_records))
        .route("/{annotator_id}/progress", get(session::get_progress))
}
