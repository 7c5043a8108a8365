use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A time-limited link to an uploaded artifact.
///
/// `expires_at_epoch_ms` is the instant at which both the signed link and the
/// remote object stop being valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DownloadGrant {
    pub signed_url: String,
    pub file_name: String,
    pub mime_type: String,
    pub size_bytes: u64,
    pub expires_at_epoch_ms: i64,
}

impl DownloadGrant {
    pub fn is_valid_at(&self, now_ms: i64) -> bool {
        self.expires_at_epoch_ms > now_ms
    }
}

/// A file fetched to local disk for a single download.
///
/// The download pipeline owns its deletion. When `scratch_dir` is set the whole
/// directory is removed, otherwise just the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedArtifact {
    pub local_file_path: PathBuf,
    pub file_name: String,
    pub mime_type: String,
    pub size_bytes: u64,
    pub scratch_dir: Option<PathBuf>,
}
