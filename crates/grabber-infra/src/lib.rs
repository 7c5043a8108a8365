//! Media Grabber Infrastructure Library
//!
//! Shared infrastructure used by the HTTP service:
//! - Middleware (request ID)
//! - Admission control (fixed-window rate limiting) and client key derivation
//! - Telemetry initialization

pub mod client_key;

#[cfg(feature = "middleware")]
pub mod middleware;

#[cfg(feature = "observability-basic")]
pub mod telemetry;

#[cfg(feature = "rate-limit")]
pub mod rate_limit;

// Re-export commonly used types
pub use client_key::{derive_client_key, sanitize_client_key};

#[cfg(feature = "middleware")]
pub use middleware::{get_request_id, request_id_middleware, RequestId, REQUEST_ID_HEADER};

#[cfg(feature = "observability-basic")]
pub use telemetry::init_telemetry;

#[cfg(feature = "rate-limit")]
pub use rate_limit::{AdmissionGate, RateLimitStatus};
