pub mod download;
pub mod files;
pub mod health;
pub mod video_info;

use serde::Serialize;
use utoipa::ToSchema;

/// Success envelope shared by the pipeline endpoints.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DataResponse<T> {
    pub data: T,
    pub request_id: String,
}
