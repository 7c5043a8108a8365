//! Application state shared by handlers and middleware.

use std::sync::Arc;

use grabber_cache::CacheStore;
use grabber_infra::AdmissionGate;
use grabber_storage::LocalStorage;
use grabber_services::{CleanupScheduler, DownloadService, VideoInfoService};

#[derive(Clone)]
pub struct AppState {
    pub video_info: VideoInfoService,
    pub downloads: DownloadService,
    pub admission: AdmissionGate,
    pub cache: Arc<dyn CacheStore>,
    pub scheduler: Arc<dyn CleanupScheduler>,
    /// Set when the local storage backend is active; serves `/files/{token}`.
    pub local_files: Option<Arc<LocalStorage>>,
}
