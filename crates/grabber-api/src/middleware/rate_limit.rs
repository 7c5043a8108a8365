//! HTTP admission control
//!
//! Consults the [`AdmissionGate`](grabber_infra::AdmissionGate) before the
//! request reaches a handler.
//!
//! # Headers
//! - `X-RateLimit-Limit`: requests allowed per window
//! - `X-RateLimit-Remaining`: requests left in the current window
//! - `Retry-After`: seconds until the window resets (429 responses only)

use crate::constants::{RATE_LIMIT_LIMIT_HEADER, RATE_LIMIT_REMAINING_HEADER};
use crate::error::{is_production_env, render_error};
use crate::state::AppState;
use axum::{
    extract::{ConnectInfo, Request, State},
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use grabber_infra::{derive_client_key, RequestId};
use std::net::SocketAddr;
use std::sync::Arc;

fn set_header(response: &mut Response, name: &'static str, value: u32) {
    if let Ok(header_value) = HeaderValue::from_str(&value.to_string()) {
        response.headers_mut().insert(name, header_value);
    }
}

pub async fn rate_limit_middleware(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let socket_addr = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let client_key = derive_client_key(request.headers(), socket_addr.as_ref());
    let limit = state.admission.limit();

    match state.admission.check(&client_key).await {
        Ok(status) => {
            let mut response = next.run(request).await;
            set_header(&mut response, RATE_LIMIT_LIMIT_HEADER, status.limit);
            set_header(&mut response, RATE_LIMIT_REMAINING_HEADER, status.remaining);
            response
        }
        Err(error) => {
            let request_id = request
                .extensions()
                .get::<RequestId>()
                .map(|id| id.as_str().to_string());

            tracing::info!(
                client_key = %client_key,
                path = %request.uri().path(),
                limit,
                "Request rejected by rate limiter"
            );

            let mut response = render_error(&error, request_id, is_production_env());
            set_header(&mut response, RATE_LIMIT_LIMIT_HEADER, limit);
            set_header(&mut response, RATE_LIMIT_REMAINING_HEADER, 0);
            response
        }
    }
}
