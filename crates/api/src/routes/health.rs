//! Health check endpoints.

use axum::{extract::State, http::StatusCode, Json};
use delivery::{Notifier, SubmissionRepository};
use telemetry::{health, metrics};
use throttle::KeyValueStore;

use crate::response::HealthResponse;
use crate::state::AppState;

/// Check each collaborator and record the result in the health registry.
async fn refresh(state: &AppState) {
    let registry = health();

    if state.store.is_healthy().await {
        registry.store.set_healthy();
    } else {
        registry.store.set_unhealthy("throttle store unavailable");
    }

    if state.handler.repository().is_healthy().await {
        registry.repository.set_healthy();
    } else {
        registry.repository.set_unhealthy("submission storage unavailable");
    }

    if state.handler.notifier().is_healthy() {
        registry.notifier.set_healthy();
    } else {
        registry.notifier.set_unhealthy("notifications unavailable");
    }
}

/// GET /health - Full health check.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    refresh(&state).await;
    let report = health().report();
    let snapshot = metrics().snapshot();

    Json(HealthResponse {
        status: format!("{:?}", report.status).to_lowercase(),
        store_healthy: health().store.is_healthy(),
        repository_healthy: health().repository.is_healthy(),
        notifier_healthy: health().notifier.is_healthy(),
        submissions_received: snapshot.submissions_received,
        submissions_accepted: snapshot.submissions_accepted,
    })
}

/// GET /health/ready - Readiness check (can accept submissions).
pub async fn ready_handler(State(state): State<AppState>) -> StatusCode {
    refresh(&state).await;
    if health().is_ready() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

/// GET /health/live - Liveness check (service is running).
pub async fn live_handler() -> StatusCode {
    if health().is_alive() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}
