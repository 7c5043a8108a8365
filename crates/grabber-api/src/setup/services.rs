//! Collaborator and pipeline construction

use crate::state::AppState;
use anyhow::{Context, Result};
use grabber_cache::{create_cache, start_sweeper, CacheClient};
use grabber_core::{Clock, Config, SystemClock};
use grabber_downloader::YtDlpDownloader;
use grabber_infra::AdmissionGate;
use grabber_services::{DownloadService, TokioCleanupScheduler, VideoInfoService};
use grabber_storage::create_storage;
use std::sync::Arc;

pub async fn initialize_services(config: &Config) -> Result<Arc<AppState>> {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let cache = create_cache(&config.cache, clock.clone())
        .await
        .context("Failed to initialize cache")?;
    start_sweeper(cache.clone(), config.cache.sweep_interval, config.rate_limit.window);

    let storage = create_storage(&config.storage, clock.clone())
        .await
        .context("Failed to initialize storage")?;

    let downloader = Arc::new(YtDlpDownloader::from_config(&config.downloader));
    tracing::info!(
        ytdlp_path = %config.downloader.ytdlp_path,
        temp_dir = %config.downloader.temp_dir.display(),
        timeout_secs = config.downloader.timeout.as_secs(),
        "Downloader configured"
    );

    let scheduler = Arc::new(TokioCleanupScheduler::new(
        storage.storage.clone(),
        clock.clone(),
    ));

    let video_info = VideoInfoService::new(
        downloader.clone(),
        CacheClient::new(cache.clone()),
        clock.clone(),
        config.cache.video_info_ttl,
    );

    let downloads = DownloadService::new(
        downloader,
        storage.storage.clone(),
        CacheClient::new(cache.clone()),
        scheduler.clone(),
        clock.clone(),
        config.download.link_lifetime,
    );

    let admission = AdmissionGate::from_config(cache.clone(), clock, &config.rate_limit);
    tracing::info!(
        max_requests = config.rate_limit.max_requests,
        window_secs = config.rate_limit.window.as_secs(),
        "Rate limiting enabled"
    );

    Ok(Arc::new(AppState {
        video_info,
        downloads,
        admission,
        cache,
        scheduler,
        local_files: storage.local_files,
    }))
}
