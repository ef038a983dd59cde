use axum::{extract::State, http::StatusCode};

use crate::common::AppState;

/// Health check endpoint
///
/// Returns 200 OK when the database answers a ping, 503 otherwise.
/// This endpoint is neither authenticated nor rate-limited.
#[utoipa::path(
    get,
    path = "/healthz",
    responses(
        (status = 200, description = "Service is healthy"),
        (status = 503, description = "Database unreachable"),
    ),
    tag = "health"
)]
pub async fn healthz(State(state): State<AppState>) -> StatusCode {
    match state.db.ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "health_check_failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
