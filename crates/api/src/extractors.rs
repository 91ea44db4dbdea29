//! Request extractors.

use axum::{
    async_trait,
    extract::{ConnectInfo, FromRequestParts},
    http::{header, request::Parts, HeaderMap},
};
use std::net::SocketAddr;
use telemetry::metrics;
use tracing::debug;

use crate::client_ip::resolve_client_ip;
use crate::nonce::{NONCE_HEADER, SUBMIT_ACTION};
use crate::response::ApiError;
use crate::state::AppState;

/// Resolved client address.
///
/// Forwarded headers are honoured only when the connecting peer is a
/// configured trusted proxy.
#[derive(Debug, Clone)]
pub struct ClientIp(pub String);

#[async_trait]
impl FromRequestParts<AppState> for ClientIp {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let remote = ConnectInfo::<SocketAddr>::from_request_parts(parts, state)
            .await
            .ok()
            .map(|ConnectInfo(addr)| addr.ip());

        Ok(ClientIp(resolve_client_ip(
            remote,
            &parts.headers,
            &state.config.security.trusted_proxies,
        )))
    }
}

/// Browser details used for shared-address detection and stored with submissions.
#[derive(Debug, Clone, Default)]
pub struct RequestMeta {
    pub user_agent: Option<String>,
    pub referer: Option<String>,
}

#[async_trait]
impl<S> FromRequestParts<S> for RequestMeta
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(RequestMeta {
            user_agent: header_string(&parts.headers, header::USER_AGENT.as_str()),
            referer: header_string(&parts.headers, header::REFERER.as_str()),
        })
    }
}

/// Proof that the request carried a valid form token.
#[derive(Debug, Clone, Copy)]
pub struct VerifiedNonce;

#[async_trait]
impl FromRequestParts<AppState> for VerifiedNonce {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if !state.config.security.nonce_required {
            return Ok(VerifiedNonce);
        }

        let valid = header_string(&parts.headers, NONCE_HEADER)
            .is_some_and(|token| state.nonce.verify(&token, SUBMIT_ACTION));

        if valid {
            Ok(VerifiedNonce)
        } else {
            metrics().nonce_rejections.inc();
            debug!("Rejected request with missing or invalid form token");
            Err(ApiError::forbidden(
                state.handler.messages().invalid_nonce.clone(),
            ))
        }
    }
}

fn header_string(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}
