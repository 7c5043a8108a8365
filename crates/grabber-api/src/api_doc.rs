//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use crate::validation;
use grabber_core::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Media Grabber API",
        version = "0.1.0",
        description = "Video metadata lookup and time-limited download links for YouTube and Instagram. Pipeline endpoints are versioned under /api/v1/."
    ),
    paths(
        handlers::video_info::get_video_info,
        handlers::download::download_video,
        handlers::files::serve_file,
        handlers::health::health_check,
    ),
    components(
        schemas(
            models::VideoMetadata,
            models::VideoFormatDescriptor,
            models::Platform,
            models::DownloadGrant,
            validation::VideoInfoRequest,
            validation::DownloadRequest,
            handlers::health::HealthResponse,
            error::ErrorResponse,
            error::ErrorBody,
        )
    ),
    tags(
        (name = "videos", description = "Video metadata and download link issuance"),
        (name = "files", description = "Signed links served by the local storage backend"),
        (name = "health", description = "Service health")
    )
)]
pub struct ApiDoc;

pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_lists_pipeline_routes() {
        let spec = get_openapi_spec();
        assert!(spec.paths.paths.contains_key("/api/v1/video-info"));
        assert!(spec.paths.paths.contains_key("/api/v1/download"));
        assert!(spec.paths.paths.contains_key("/health"));
    }
}
