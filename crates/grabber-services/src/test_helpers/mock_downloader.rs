//! Mock video downloader

use async_trait::async_trait;
use grabber_core::{FetchedArtifact, SupportedUrl};
use grabber_downloader::{
    mime_for_file_name, DownloaderError, DownloaderResult, ProviderMetadata, VideoDownloader,
};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uuid::Uuid;

#[derive(Clone, Debug)]
enum Outcome<T> {
    Succeed(T),
    Fail(String),
}

/// Mock downloader returning configured metadata and writing a real scratch
/// file for each `fetch_file` call.
#[derive(Clone)]
pub struct MockDownloader {
    metadata: Arc<Mutex<Outcome<ProviderMetadata>>>,
    file: Arc<Mutex<Outcome<(String, Vec<u8>)>>>,
    delay: Arc<Mutex<Duration>>,
    metadata_calls: Arc<Mutex<usize>>,
    file_calls: Arc<Mutex<usize>>,
    artifacts: Arc<Mutex<Vec<FetchedArtifact>>>,
    scratch_root: PathBuf,
}

impl MockDownloader {
    pub fn new() -> Self {
        Self {
            metadata: Arc::new(Mutex::new(Outcome::Succeed(
                super::fixtures::sample_provider_metadata(),
            ))),
            file: Arc::new(Mutex::new(Outcome::Succeed((
                "Sample clip.mp4".to_string(),
                b"mock-video-bytes".to_vec(),
            )))),
            delay: Arc::new(Mutex::new(Duration::ZERO)),
            metadata_calls: Arc::new(Mutex::new(0)),
            file_calls: Arc::new(Mutex::new(0)),
            artifacts: Arc::new(Mutex::new(Vec::new())),
            scratch_root: std::env::temp_dir(),
        }
    }

    pub fn with_metadata(self, metadata: ProviderMetadata) -> Self {
        *self.metadata.lock().unwrap() = Outcome::Succeed(metadata);
        self
    }

    pub fn failing_metadata(self, message: &str) -> Self {
        *self.metadata.lock().unwrap() = Outcome::Fail(message.to_string());
        self
    }

    pub fn with_file(self, file_name: &str, contents: &[u8]) -> Self {
        *self.file.lock().unwrap() = Outcome::Succeed((file_name.to_string(), contents.to_vec()));
        self
    }

    pub fn failing_file(self, message: &str) -> Self {
        *self.file.lock().unwrap() = Outcome::Fail(message.to_string());
        self
    }

    /// Delay every call, to widen race windows in concurrency tests.
    pub fn with_delay(self, delay: Duration) -> Self {
        *self.delay.lock().unwrap() = delay;
        self
    }

    pub fn metadata_calls(&self) -> usize {
        *self.metadata_calls.lock().unwrap()
    }

    pub fn file_calls(&self) -> usize {
        *self.file_calls.lock().unwrap()
    }

    /// Every artifact handed out so far.
    pub fn artifacts(&self) -> Vec<FetchedArtifact> {
        self.artifacts.lock().unwrap().clone()
    }

    async fn wait(&self) {
        let delay = *self.delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

impl Default for MockDownloader {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VideoDownloader for MockDownloader {
    async fn fetch_metadata(&self, _url: &SupportedUrl) -> DownloaderResult<ProviderMetadata> {
        *self.metadata_calls.lock().unwrap() += 1;
        self.wait().await;

        let outcome = self.metadata.lock().unwrap().clone();
        match outcome {
            Outcome::Succeed(metadata) => Ok(metadata),
            Outcome::Fail(message) => Err(DownloaderError::CommandFailed {
                status: "exit status: 1".to_string(),
                stderr: message,
            }),
        }
    }

    async fn fetch_file(
        &self,
        _url: &SupportedUrl,
        _format_id: &str,
    ) -> DownloaderResult<FetchedArtifact> {
        *self.file_calls.lock().unwrap() += 1;
        self.wait().await;

        let outcome = self.file.lock().unwrap().clone();
        let (file_name, contents) = match outcome {
            Outcome::Succeed(file) => file,
            Outcome::Fail(message) => {
                return Err(DownloaderError::CommandFailed {
                    status: "exit status: 1".to_string(),
                    stderr: message,
                })
            }
        };

        let scratch_dir = self
            .scratch_root
            .join(format!("media-grabber-mock-{}", Uuid::new_v4()));
        tokio::fs::create_dir_all(&scratch_dir).await?;
        let local_file_path = scratch_dir.join(&file_name);
        tokio::fs::write(&local_file_path, &contents).await?;

        let artifact = FetchedArtifact {
            local_file_path,
            mime_type: mime_for_file_name(&file_name),
            file_name,
            size_bytes: contents.len() as u64,
            scratch_dir: Some(scratch_dir),
        };
        self.artifacts.lock().unwrap().push(artifact.clone());
        Ok(artifact)
    }
}
