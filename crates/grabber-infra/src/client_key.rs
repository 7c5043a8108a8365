//! Client key derivation for admission control.

use std::net::SocketAddr;

use axum::http::HeaderMap;
use grabber_core::constants::UNKNOWN_CLIENT_KEY;

/// Derive the admission key for a request.
///
/// Uses the first element of `X-Forwarded-For`, then the direct connection
/// address, then `"unknown"`. An empty first element counts as absent; later
/// elements are never consulted. The result is always sanitized.
pub fn derive_client_key(headers: &HeaderMap, socket_addr: Option<&SocketAddr>) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    let raw = forwarded
        .or_else(|| socket_addr.map(|addr| addr.ip().to_string()))
        .unwrap_or_else(|| UNKNOWN_CLIENT_KEY.to_string());

    sanitize_client_key(&raw)
}

/// Replace every character outside `[A-Za-z0-9.:]` with `_`.
pub fn sanitize_client_key(raw: &str) -> String {
    raw.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == ':' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
