//! Client address resolution.

use axum::http::HeaderMap;
use intake_core::ip::{is_public_ip, parse_ip};
use std::net::IpAddr;

/// Address reported when nothing valid is available.
pub const FALLBACK_IP: &str = "0.0.0.0";

/// Forwarded headers, most preferred first.
pub const FORWARDED_HEADERS: [&str; 4] = [
    "CF-Connecting-IP",
    "X-Forwarded-For",
    "X-Real-IP",
    "Client-IP",
];

/// Resolve the submitting client's address.
///
/// The connecting address is used unless it is a trusted proxy, in which
/// case the first forwarded header carrying a public address wins.
pub fn resolve_client_ip(
    remote: Option<IpAddr>,
    headers: &HeaderMap,
    trusted_proxies: &[String],
) -> String {
    let mut ip = remote
        .map(|addr| addr.to_canonical().to_string())
        .unwrap_or_else(|| FALLBACK_IP.to_string());

    if trusted_proxies.iter().any(|proxy| proxy == &ip) {
        if let Some(forwarded) = forwarded_ip(headers) {
            ip = forwarded;
        }
    }

    if ip == "::1" {
        ip = "127.0.0.1".to_string();
    }

    if parse_ip(&ip).is_none() {
        return FALLBACK_IP.to_string();
    }

    ip
}

fn forwarded_ip(headers: &HeaderMap) -> Option<String> {
    FORWARDED_HEADERS.iter().find_map(|name| {
        let value = headers.get(*name)?.to_str().ok()?;
        let candidate = value.split(',').next()?.trim();
        is_public_ip(candidate).then(|| candidate.to_string())
    })
}
