use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;

use pantry_service::MetricsSnapshot;

use super::AppState;
use super::schemas::HealthResponse;

/// `GET /api/health` -- returns service status together with a metrics snapshot.
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "Health",
    summary = "Health check",
    description = "Returns service status and a snapshot of item operation counters.",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    )
)]
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let body = HealthResponse {
        status: "ok".into(),
        metrics: state.service.metrics().snapshot(),
    };

    (StatusCode::OK, Json(body))
}

/// `GET /api/metrics` -- returns service counters as JSON.
#[utoipa::path(
    get,
    path = "/api/metrics",
    tag = "Health",
    summary = "Service metrics",
    description = "Returns current operation counters for monitoring.",
    responses(
        (status = 200, description = "Current metric counters", body = MetricsSnapshot)
    )
)]
pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    (StatusCode::OK, Json(state.service.metrics().snapshot()))
}
