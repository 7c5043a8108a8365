use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::handlers::DataResponse;
use crate::state::AppState;
use crate::validation::VideoInfoRequest;
use axum::{extract::State, Extension, Json};
use grabber_core::VideoMetadata;
use grabber_infra::RequestId;
use std::sync::Arc;

#[utoipa::path(
    post,
    path = "/api/v1/video-info",
    tag = "videos",
    request_body = VideoInfoRequest,
    responses(
        (status = 200, description = "Video metadata and downloadable formats", body = DataResponse<VideoMetadata>),
        (status = 400, description = "Invalid request or unsupported platform", body = ErrorResponse),
        (status = 404, description = "Video not found", body = ErrorResponse),
        (status = 429, description = "Rate limit exceeded", body = ErrorResponse)
    )
)]
pub async fn get_video_info(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    ValidatedJson(body): ValidatedJson<VideoInfoRequest>,
) -> Result<Json<DataResponse<VideoMetadata>>, HttpAppError> {
    body.validate()
        .map_err(|e| HttpAppError::from(e).with_request_id(&request_id))?;

    let metadata = state
        .video_info
        .get_info(&body.url, request_id.as_str())
        .await
        .map_err(|e| HttpAppError::from(e).with_request_id(&request_id))?;

    tracing::info!(
        request_id = %request_id.as_str(),
        video_id = %metadata.id,
        "Video info response sent"
    );

    Ok(Json(DataResponse {
        data: metadata,
        request_id: request_id.0,
    }))
}
