//! HTTP error response conversion
//!
//! Every failure is rendered as
//! `{ "error": { "code", "message", "recoverable", "suggestedAction"? }, "requestId" }`
//! with the status carried by the error's [`ErrorMetadata`].
//!
//! Handlers return `Result<_, HttpAppError>` and attach the request id with
//! [`HttpAppError::with_request_id`].

use axum::{
    extract::rejection::JsonRejection,
    extract::{FromRequest, Request},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use grabber_core::{AppError, ErrorMetadata, LogLevel};
use grabber_infra::RequestId;
use serde::{de::DeserializeOwned, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    /// Machine-readable error code for programmatic handling
    pub code: String,
    pub message: String,
    /// Whether this error is recoverable (can be retried)
    pub recoverable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_action: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error: ErrorBody,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

/// Wrapper type for AppError to implement IntoResponse
/// This is necessary because of Rust's orphan rules - we can't implement
/// IntoResponse (external trait) for AppError (external type from grabber-core)
#[derive(Debug)]
pub struct HttpAppError {
    pub error: AppError,
    pub request_id: Option<String>,
}

impl HttpAppError {
    pub fn with_request_id(mut self, request_id: &RequestId) -> Self {
        self.request_id = Some(request_id.as_str().to_string());
        self
    }
}

impl From<AppError> for HttpAppError {
    fn from(error: AppError) -> Self {
        HttpAppError {
            error,
            request_id: None,
        }
    }
}

/// Convert JSON body deserialization failures into a 400 with our envelope.
impl From<JsonRejection> for HttpAppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(format!("Invalid request body: {}", rejection.body_text())).into()
    }
}

/// JSON body extractor that answers with the error envelope on deserialization failure.
#[derive(Debug, Clone, Copy)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = HttpAppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let request_id = req.extensions().get::<RequestId>().cloned();

        match Json::<T>::from_request(req, state).await {
            Ok(Json(inner)) => Ok(ValidatedJson(inner)),
            Err(rejection) => {
                let err = HttpAppError::from(rejection);
                Err(match request_id {
                    Some(id) => err.with_request_id(&id),
                    None => err,
                })
            }
        }
    }
}

fn log_error(error: &AppError, request_id: Option<&str>) {
    let error_type = error.error_type();
    let request_id = request_id.unwrap_or("-");
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type, request_id, "Request failed");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_type, request_id, "Request failed");
        }
        LogLevel::Error => {
            tracing::error!(error = %error, error_type, request_id, "Request failed");
        }
    }
}

pub(crate) fn is_production_env() -> bool {
    std::env::var("ENVIRONMENT")
        .or_else(|_| std::env::var("APP_ENV"))
        .map(|env| env.to_lowercase() == "production" || env.to_lowercase() == "prod")
        .unwrap_or(false)
}

/// Message shown to clients. Sensitive variants get a generic message in production.
fn public_message(error: &AppError, is_production: bool) -> String {
    if !(is_production && error.is_sensitive()) {
        return error.client_message();
    }
    match error {
        AppError::Download(_) => AppError::DEFAULT_DOWNLOAD.to_string(),
        AppError::VideoNotFound(_) => AppError::DEFAULT_VIDEO_NOT_FOUND.to_string(),
        other => other.client_message(),
    }
}

pub(crate) fn render_error(
    error: &AppError,
    request_id: Option<String>,
    is_production: bool,
) -> Response {
    let status =
        StatusCode::from_u16(error.http_status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    log_error(error, request_id.as_deref());

    let body = ErrorResponse {
        error: ErrorBody {
            code: error.error_code().to_string(),
            message: public_message(error, is_production),
            recoverable: error.is_recoverable(),
            suggested_action: error.suggested_action().map(String::from),
        },
        request_id,
    };

    let mut response = (status, Json(body)).into_response();

    if let Some(retry_after) = error.retry_after_secs() {
        if let Ok(value) = HeaderValue::from_str(&retry_after.to_string()) {
            response.headers_mut().insert(header::RETRY_AFTER, value);
        }
    }

    response
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        render_error(&self.error, self.request_id, is_production_env())
    }
}
