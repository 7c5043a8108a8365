//! Serves objects of the local storage backend behind signed tokens.

use crate::error::{ErrorBody, ErrorResponse};
use crate::state::AppState;
use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use grabber_downloader::mime_for_file_name;
use grabber_storage::StorageError;
use std::sync::Arc;
use tokio_util::io::ReaderStream;

fn plain_error(status: StatusCode, code: &str, message: &str) -> Response {
    let body = ErrorResponse {
        error: ErrorBody {
            code: code.to_string(),
            message: message.to_string(),
            recoverable: false,
            suggested_action: None,
        },
        request_id: None,
    };
    (status, Json(body)).into_response()
}

/// `Content-Disposition` value restricted to printable ASCII.
fn attachment_disposition(file_name: &str) -> String {
    let safe: String = file_name
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_ascii_graphic() || c == ' ' => c,
            _ => '_',
        })
        .collect();
    format!("attachment; filename=\"{}\"", safe)
}

#[utoipa::path(
    get,
    path = "/files/{token}",
    tag = "files",
    params(
        ("token" = String, Path, description = "Signed link token")
    ),
    responses(
        (status = 200, description = "File contents", content_type = "application/octet-stream"),
        (status = 400, description = "Malformed or forged token", body = ErrorResponse),
        (status = 404, description = "Link expired or file removed", body = ErrorResponse)
    )
)]
pub async fn serve_file(State(state): State<Arc<AppState>>, Path(token): Path<String>) -> Response {
    let Some(files) = state.local_files.as_ref() else {
        return plain_error(StatusCode::NOT_FOUND, "NOT_FOUND", "File not found");
    };

    let (storage_key, path) = match files.resolve_token(&token).await {
        Ok(resolved) => resolved,
        Err(StorageError::InvalidToken(reason)) => {
            tracing::debug!(reason = %reason, "Rejected file token");
            return plain_error(
                StatusCode::BAD_REQUEST,
                "INVALID_TOKEN",
                "Invalid download link",
            );
        }
        Err(StorageError::NotFound(key)) => {
            tracing::debug!(storage_key = %key, "Requested file expired or missing");
            return plain_error(
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                "Download link expired or file not found",
            );
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to resolve file token");
            return plain_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "STORAGE_ERROR",
                "Failed to read file",
            );
        }
    };

    let file = match tokio::fs::File::open(&path).await {
        Ok(file) => file,
        Err(e) => {
            tracing::warn!(
                error = %e,
                storage_key = %storage_key,
                "File vanished before it could be served"
            );
            return plain_error(StatusCode::NOT_FOUND, "NOT_FOUND", "File not found");
        }
    };

    let file_name = storage_key.rsplit('/').next().unwrap_or("download");
    let content_type = mime_for_file_name(file_name);

    tracing::debug!(storage_key = %storage_key, "Serving local file");

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_DISPOSITION, attachment_disposition(file_name))
        .header(header::CACHE_CONTROL, "private, no-store")
        .body(Body::from_stream(ReaderStream::new(file)))
        .unwrap_or_else(|e| {
            tracing::error!(error = %e, "Failed to build file response");
            plain_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "STORAGE_ERROR",
                "Failed to read file",
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disposition_is_header_safe() {
        assert_eq!(
            attachment_disposition("Clip \"final\".mp4"),
            "attachment; filename=\"Clip _final_.mp4\""
        );
        assert_eq!(
            attachment_disposition("Vidéo.mp4"),
            "attachment; filename=\"Vid_o.mp4\""
        );
    }
}
