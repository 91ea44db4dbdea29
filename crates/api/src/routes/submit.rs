//! Form submission endpoint.

use axum::{body::Bytes, extract::State, Json};
use std::time::Instant;
use telemetry::metrics;
use tracing::{info_span, warn, Instrument};
use uuid::Uuid;

use crate::extractors::{ClientIp, RequestMeta, VerifiedNonce};
use crate::handler::{ClientInfo, SubmitRequest};
use crate::response::{ApiError, SubmitResponse};
use crate::state::AppState;

/// POST /submit - Validate and accept a form submission.
///
/// The form token is checked before anything else; the body is parsed only
/// after its size is known to be within limits.
pub async fn submit_handler(
    _nonce: VerifiedNonce,
    State(state): State<AppState>,
    ClientIp(client_ip): ClientIp,
    meta: RequestMeta,
    body: Bytes,
) -> Result<Json<SubmitResponse>, ApiError> {
    let start = Instant::now();
    let messages = state.handler.messages();

    if body.len() > state.config.max_body_bytes {
        warn!(
            client_ip = %client_ip,
            payload_size = body.len(),
            "Submission body too large"
        );
        return Err(ApiError::payload_too_large(messages.request_too_large.clone()));
    }

    let request: SubmitRequest = serde_json::from_slice(&body).map_err(|e| {
        warn!(client_ip = %client_ip, error = %e, "Failed to parse submission body");
        ApiError::bad_request(messages.invalid_request.clone())
    })?;

    let client = ClientInfo {
        ip: client_ip,
        user_agent: meta.user_agent,
        referer: meta.referer,
    };

    let span = info_span!(
        "submission",
        request_id = %Uuid::new_v4(),
        form_id = request.form_id.as_deref().unwrap_or_default()
    );
    let result = state.handler.handle(request, &client).instrument(span).await;

    metrics()
        .submit_latency_ms
        .observe(start.elapsed().as_millis() as u64);

    result.map(Json)
}
