//! Media Grabber API Library
//!
//! This crate provides the HTTP handlers, middleware, and application setup.

mod api_doc;
pub mod constants;
mod handlers;
mod middleware;
pub mod setup;
mod validation;

pub mod error;
pub mod state;

pub use error::{ErrorResponse, HttpAppError};
pub use handlers::health::HealthResponse;
pub use validation::{DownloadRequest, VideoInfoRequest};
