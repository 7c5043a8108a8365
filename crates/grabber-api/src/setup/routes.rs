//! Route configuration and setup

use crate::constants::{API_PREFIX, DEFAULT_HTTP_CONCURRENCY_LIMIT, MAX_REQUEST_BODY_BYTES};
use crate::handlers;
use crate::middleware::rate_limit_middleware;
use crate::state::AppState;
use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Json, Router,
};
use grabber_core::Config;
use grabber_infra::request_id_middleware;
use std::sync::Arc;
use std::time::Duration;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

const CORS_MAX_AGE: Duration = Duration::from_secs(86_400);

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;

    // Only the pipeline endpoints are subject to admission control.
    let api_routes = Router::new()
        .route(
            &format!("{}/video-info", API_PREFIX),
            post(handlers::video_info::get_video_info),
        )
        .route(
            &format!("{}/download", API_PREFIX),
            post(handlers::download::download_video),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ));

    let public_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/files/{token}", get(handlers::files::serve_file))
        .route(
            "/api/openapi.json",
            get(|| async { Json(crate::api_doc::get_openapi_spec()) }),
        );

    let concurrency_limit = config
        .server
        .concurrency_limit
        .unwrap_or(DEFAULT_HTTP_CONCURRENCY_LIMIT)
        .max(1);
    tracing::info!(
        http_concurrency_limit = concurrency_limit,
        "HTTP concurrency limit layer enabled"
    );

    let app = api_routes
        .merge(public_routes)
        .with_state(state)
        .merge(utoipa_rapidoc::RapiDoc::new("/api/openapi.json").path("/docs"))
        .layer(ConcurrencyLimitLayer::new(concurrency_limit))
        .layer(RequestBodyLimitLayer::new(MAX_REQUEST_BODY_BYTES))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(request_id_middleware));

    Ok(app)
}

/// Setup CORS configuration
fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .max_age(CORS_MAX_AGE);

    if config.server.cors_origins.iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        return Ok(base.allow_origin(Any));
    }

    let origins = config
        .server
        .cors_origins
        .iter()
        .map(|o| {
            o.parse::<HeaderValue>()
                .map_err(|e| anyhow::anyhow!("Invalid CORS origin '{}': {}", o, e))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(base.allow_origin(origins))
}
