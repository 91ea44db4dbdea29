//! Front-end configuration endpoint.

use axum::{extract::State, Json};
use std::collections::BTreeMap;

use crate::nonce::SUBMIT_ACTION;
use crate::response::FormConfigResponse;
use crate::state::AppState;

/// GET /form-config - Submission URL, a fresh form token and client-side messages.
pub async fn form_config_handler(State(state): State<AppState>) -> Json<FormConfigResponse> {
    let m = state.handler.messages();

    let messages = BTreeMap::from([
        ("required", m.required.clone()),
        ("minLength", m.min_length.clone()),
        ("maxLength", m.max_length.clone()),
        ("pattern", m.invalid_value.clone()),
        ("email", m.client_email.clone()),
        ("url", m.client_url.clone()),
        ("tel", m.client_tel.clone()),
        ("default", m.invalid_value.clone()),
    ]);

    Json(FormConfigResponse {
        api_url: state.config.public_url.clone(),
        nonce: state.nonce.create(SUBMIT_ACTION),
        messages,
    })
}
