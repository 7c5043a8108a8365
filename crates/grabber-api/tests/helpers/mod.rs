//! Test helpers: build AppState and router for integration tests.
//!
//! Run from workspace root: `cargo test -p grabber-api`. Every port is backed by
//! an in-process fake, so no yt-dlp binary, database or bucket is needed.

#![allow(dead_code)]

use axum_test::TestServer;
use grabber_api::constants;
use grabber_api::setup::routes;
use grabber_api::state::AppState;
use grabber_cache::{CacheClient, CacheStore, MemoryCache};
use grabber_core::{Config, ManualClock};
use grabber_infra::AdmissionGate;
use grabber_services::test_helpers::{MockDownloader, MockStorage, RecordingScheduler};
use grabber_services::{CleanupScheduler, DownloadService, VideoInfoService};
use grabber_storage::{LocalStorage, Storage};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

pub const START_MS: i64 = 1_700_000_000_000;
pub const LINK_LIFETIME: Duration = Duration::from_secs(30 * 60);
pub const LOCAL_BASE_URL: &str = "http://localhost:8080/files";

/// API path prefix for tests (e.g. `/api/v1`).
pub fn api_path(path: &str) -> String {
    format!("{}{}", constants::API_PREFIX, path)
}

pub struct TestOptions {
    pub rate_limit: u32,
    pub downloader: MockDownloader,
    /// Upload to a real `LocalStorage` instead of `MockStorage`.
    pub local_storage: bool,
}

impl Default for TestOptions {
    fn default() -> Self {
        Self {
            rate_limit: 100,
            downloader: MockDownloader::new(),
            local_storage: false,
        }
    }
}

/// Test application: server plus handles on the fakes behind it.
pub struct TestApp {
    pub server: TestServer,
    pub clock: Arc<ManualClock>,
    pub downloader: MockDownloader,
    pub storage: MockStorage,
    pub scheduler: RecordingScheduler,
    pub local_files: Arc<LocalStorage>,
    pub _temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }
}

pub async fn setup_test_app() -> TestApp {
    setup_test_app_with(TestOptions::default()).await
}

pub async fn setup_test_app_with(options: TestOptions) -> TestApp {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let clock = Arc::new(ManualClock::from_millis(START_MS));
    let cache: Arc<dyn CacheStore> = Arc::new(MemoryCache::new(clock.clone()));

    let local_files = Arc::new(
        LocalStorage::new(
            temp_dir.path().join("storage"),
            LOCAL_BASE_URL.to_string(),
            b"integration-test-signing-secret".to_vec(),
            clock.clone(),
        )
        .await
        .expect("Failed to create local storage"),
    );

    let mock_storage = MockStorage::new();
    let storage: Arc<dyn Storage> = if options.local_storage {
        local_files.clone()
    } else {
        Arc::new(mock_storage.clone())
    };

    let scheduler = RecordingScheduler::new();
    let scheduler_port: Arc<dyn CleanupScheduler> = Arc::new(scheduler.clone());

    let video_info = VideoInfoService::new(
        Arc::new(options.downloader.clone()),
        CacheClient::new(cache.clone()),
        clock.clone(),
        Duration::from_secs(3600),
    );
    let downloads = DownloadService::new(
        Arc::new(options.downloader.clone()),
        storage,
        CacheClient::new(cache.clone()),
        scheduler_port.clone(),
        clock.clone(),
        LINK_LIFETIME,
    );
    let admission = AdmissionGate::new(
        cache.clone(),
        clock.clone(),
        options.rate_limit,
        Duration::from_secs(60),
    );

    let state = Arc::new(AppState {
        video_info,
        downloads,
        admission,
        cache,
        scheduler: scheduler_port,
        local_files: Some(local_files.clone()),
    });

    let app = routes::setup_routes(&Config::default(), state).expect("Failed to build routes");
    let server = TestServer::new(app.into_make_service()).expect("Failed to create test server");

    TestApp {
        server,
        clock,
        downloader: options.downloader,
        storage: mock_storage,
        scheduler,
        local_files,
        _temp_dir: temp_dir,
    }
}

/// Path component of a link issued by the local backend.
pub fn local_link_path(signed_url: &str) -> String {
    signed_url
        .strip_prefix("http://localhost:8080")
        .expect("link issued by local storage")
        .to_string()
}
