//! yt-dlp backed downloader.

use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use std::time::Duration;

use async_trait::async_trait;
use grabber_core::{DownloaderConfig, FetchedArtifact, SupportedUrl};
use tokio::fs;
use tokio::process::Command;
use uuid::Uuid;

use crate::error::{DownloaderError, DownloaderResult};
use crate::mime::mime_for_file_name;
use crate::provider::ProviderMetadata;
use crate::traits::VideoDownloader;

const OUTPUT_TEMPLATE: &str = "%(title)s.%(ext)s";
const STDERR_TAIL_LINES: usize = 3;

pub struct YtDlpDownloader {
    program: String,
    prefix_args: Vec<String>,
    temp_dir: PathBuf,
    timeout: Duration,
}

impl YtDlpDownloader {
    /// `command` is the yt-dlp executable, optionally followed by leading
    /// arguments (e.g. `python3 -m yt_dlp`).
    pub fn new(command: &str, temp_dir: impl Into<PathBuf>, timeout: Duration) -> Self {
        let mut parts = command.split_whitespace().map(str::to_string);
        let program = parts.next().unwrap_or_else(|| "yt-dlp".to_string());
        Self {
            program,
            prefix_args: parts.collect(),
            temp_dir: temp_dir.into(),
            timeout,
        }
    }

    pub fn from_config(config: &DownloaderConfig) -> Self {
        Self::new(&config.ytdlp_path, config.temp_dir.clone(), config.timeout)
    }

    /// Run yt-dlp with `args`, bounded by the configured timeout.
    /// The child is killed if the timeout elapses.
    async fn run(&self, args: &[&str]) -> DownloaderResult<Output> {
        let start = std::time::Instant::now();

        let child = Command::new(&self.program)
            .args(&self.prefix_args)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| DownloaderError::Spawn(format!("{}: {}", self.program, e)))?;

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| {
                tracing::warn!(
                    timeout_secs = self.timeout.as_secs(),
                    "yt-dlp timed out, process killed"
                );
                DownloaderError::Timeout(self.timeout)
            })??;

        tracing::debug!(
            status = %output.status,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "yt-dlp finished"
        );

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let tail: Vec<&str> = stderr
                .lines()
                .filter(|l| !l.trim().is_empty())
                .rev()
                .take(STDERR_TAIL_LINES)
                .collect();
            let tail: Vec<&str> = tail.into_iter().rev().collect();
            return Err(DownloaderError::CommandFailed {
                status: output.status.to_string(),
                stderr: if tail.is_empty() {
                    "Unknown error".to_string()
                } else {
                    tail.join(" | ")
                },
            });
        }

        Ok(output)
    }

    async fn first_file(dir: &Path) -> DownloaderResult<(PathBuf, String, u64)> {
        let mut entries = fs::read_dir(dir).await?;
        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let meta = entry.metadata().await?;
            if meta.is_file() {
                files.push((entry.path(), entry.file_name(), meta.len()));
            }
        }
        // Deterministic pick when yt-dlp leaves more than one file.
        files.sort_by(|a, b| a.1.cmp(&b.1));

        let (path, name, size) = files
            .into_iter()
            .next()
            .ok_or(DownloaderError::NoOutputFile)?;
        Ok((path, name.to_string_lossy().into_owned(), size))
    }

    async fn download_into(
        &self,
        url: &SupportedUrl,
        format_id: &str,
        scratch_dir: &Path,
    ) -> DownloaderResult<FetchedArtifact> {
        let template = scratch_dir.join(OUTPUT_TEMPLATE);
        let template = template.to_string_lossy();

        self.run(&[
            "--format",
            format_id,
            "--output",
            &template,
            "--no-check-certificates",
            "--no-warnings",
            "--no-playlist",
            "--",
            url.as_str(),
        ])
        .await?;

        let (local_file_path, file_name, size_bytes) = Self::first_file(scratch_dir).await?;
        let mime_type = mime_for_file_name(&file_name);

        Ok(FetchedArtifact {
            local_file_path,
            file_name,
            mime_type,
            size_bytes,
            scratch_dir: Some(scratch_dir.to_path_buf()),
        })
    }
}

#[async_trait]
impl VideoDownloader for YtDlpDownloader {
    #[tracing::instrument(skip(self), fields(
        process.executable.name = "yt-dlp",
        url = %url,
        platform = %url.platform()
    ))]
    async fn fetch_metadata(&self, url: &SupportedUrl) -> DownloaderResult<ProviderMetadata> {
        let output = self
            .run(&[
                "--dump-single-json",
                "--no-check-certificates",
                "--no-warnings",
                "--prefer-free-formats",
                "--",
                url.as_str(),
            ])
            .await?;

        let metadata: ProviderMetadata = serde_json::from_slice(&output.stdout)
            .map_err(|e| DownloaderError::InvalidOutput(e.to_string()))?;

        tracing::info!(
            video_id = %metadata.id,
            formats = metadata.formats.len(),
            "Fetched video metadata"
        );

        Ok(metadata)
    }

    #[tracing::instrument(skip(self), fields(
        process.executable.name = "yt-dlp",
        url = %url,
        format_id = %format_id
    ))]
    async fn fetch_file(
        &self,
        url: &SupportedUrl,
        format_id: &str,
    ) -> DownloaderResult<FetchedArtifact> {
        let scratch_dir = self
            .temp_dir
            .join(format!("media-grabber-{}", Uuid::new_v4()));
        fs::create_dir_all(&scratch_dir).await?;

        tracing::info!(scratch_dir = %scratch_dir.display(), "Starting yt-dlp download");

        match self.download_into(url, format_id, &scratch_dir).await {
            Ok(artifact) => {
                tracing::info!(
                    file_name = %artifact.file_name,
                    size_bytes = artifact.size_bytes,
                    mime_type = %artifact.mime_type,
                    "yt-dlp download complete"
                );
                Ok(artifact)
            }
            Err(e) => {
                if let Err(cleanup_err) = fs::remove_dir_all(&scratch_dir).await {
                    tracing::warn!(
                        error = %cleanup_err,
                        scratch_dir = %scratch_dir.display(),
                        "Failed to remove scratch directory after failed download"
                    );
                }
                Err(e)
            }
        }
    }
}
