use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde_json::Value;

use super::AppState;
use crate::{
    core::dispatcher::JobDispatcher,
    error::{ErrorKind, WorkerError},
    types::ResultEnvelope,
};

/// HTTP status for a failed job.
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::InvalidRequest | ErrorKind::InvalidRange => StatusCode::BAD_REQUEST,
        ErrorKind::SeparationUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorKind::DecodeError | ErrorKind::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// POST /process
///
/// Bodies that are not JSON, or not a job description, still get an
/// envelope rather than the extractor's plain-text rejection.
pub async fn process_job(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> (StatusCode, Json<ResultEnvelope>) {
    let envelope = match payload {
        Ok(Json(body)) => state.dispatcher.submit_value(body).await,
        Err(rejection) => JobDispatcher::reject_request(WorkerError::InvalidRequest(
            rejection.body_text(),
        )),
    };
    let status = envelope
        .error_kind()
        .map(status_for)
        .unwrap_or(StatusCode::OK);
    (status, Json(envelope))
}

pub fn process_routes() -> Router<AppState> {
    Router::new().route("/process", post(process_job))
}
