use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use claimdesk_core::error::CoreError;
use claimdesk_store::StorageError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and [`StorageError`] for the record
/// store. Implements [`IntoResponse`] to produce consistent JSON error
/// responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `claimdesk_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A record store error from `claimdesk_store`.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Core(core) => classify_core_error(core),
            AppError::Storage(err) => classify_storage_error(err),
        };

        let mut body = json!({
            "error": message,
            "code": code,
        });

        match &self {
            AppError::Core(CoreError::Sequence(seq))
            | AppError::Storage(StorageError::Core(CoreError::Sequence(seq))) => {
                body["expected_state"] = json!(seq.state);
                body["item_id"] = json!(seq.item_id);
            }
            AppError::Storage(err) if err.is_write_failure() => {
                body["retryable"] = json!(true);
            }
            _ => {}
        }

        (status, axum::Json(body)).into_response()
    }
}

fn classify_core_error(core: &CoreError) -> (StatusCode, &'static str, String) {
    match core {
        CoreError::NotFound { entity, id } => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("{entity} with id {id} not found"),
        ),
        CoreError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
        CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
        CoreError::Sequence(seq) => (StatusCode::CONFLICT, "SEQUENCE_ERROR", seq.to_string()),
    }
}

/// Write failures are retryable 503s; read and decode failures are 500s.
fn classify_storage_error(err: &StorageError) -> (StatusCode, &'static str, String) {
    match err {
        StorageError::Core(core) => classify_core_error(core),
        StorageError::Write { .. } | StorageError::WriteTimeout { .. } => {
            tracing::error!(error = %err, "Record write failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                "STORAGE_WRITE_ERROR",
                "The annotation could not be saved. Please try again.".to_string(),
            )
        }
        other => internal(&other.to_string()),
    }
}

fn internal(msg: &str) -> (StatusCode, &'static str, String) {
    tracing::error!(error = %msg, "Internal error");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}
