use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::handlers::DataResponse;
use crate::state::AppState;
use crate::validation::DownloadRequest;
use axum::{extract::State, Extension, Json};
use grabber_core::DownloadGrant;
use grabber_infra::RequestId;
use std::sync::Arc;

#[utoipa::path(
    post,
    path = "/api/v1/download",
    tag = "videos",
    request_body = DownloadRequest,
    responses(
        (status = 200, description = "Signed, time-limited download link", body = DataResponse<DownloadGrant>),
        (status = 400, description = "Invalid request or unsupported platform", body = ErrorResponse),
        (status = 429, description = "Rate limit exceeded", body = ErrorResponse),
        (status = 500, description = "Download or storage failure", body = ErrorResponse)
    )
)]
pub async fn download_video(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    ValidatedJson(body): ValidatedJson<DownloadRequest>,
) -> Result<Json<DataResponse<DownloadGrant>>, HttpAppError> {
    body.validate()
        .map_err(|e| HttpAppError::from(e).with_request_id(&request_id))?;

    let grant = state
        .downloads
        .download(&body.url, &body.format_id, request_id.as_str())
        .await
        .map_err(|e| HttpAppError::from(e).with_request_id(&request_id))?;

    tracing::info!(
        request_id = %request_id.as_str(),
        file_name = %grant.file_name,
        "Download response sent"
    );

    Ok(Json(DataResponse {
        data: grant,
        request_id: request_id.0,
    }))
}
