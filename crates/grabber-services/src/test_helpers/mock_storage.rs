//! Mock storage implementation for testing

use async_trait::async_trait;
use grabber_core::ManualClock;
use grabber_storage::{Storage, StorageBackend, StorageError, StorageResult};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// In-memory storage that records every operation.
#[derive(Clone, Default)]
pub struct MockStorage {
    files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    fail_uploads: Arc<Mutex<bool>>,
    fail_signing: Arc<Mutex<bool>>,
    fail_deletes: Arc<Mutex<bool>>,
    uploads: Arc<Mutex<Vec<String>>>,
    deletes: Arc<Mutex<Vec<String>>>,
    signed: Arc<Mutex<Vec<(String, i64)>>>,
    upload_delay: Arc<Mutex<Option<(Arc<ManualClock>, Duration)>>>,
}

impl MockStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, key: &str, data: &[u8]) {
        self.files
            .lock()
            .unwrap()
            .insert(key.to_string(), data.to_vec());
    }

    pub fn contains(&self, key: &str) -> bool {
        self.files.lock().unwrap().contains_key(key)
    }

    pub fn keys(&self) -> Vec<String> {
        self.files.lock().unwrap().keys().cloned().collect()
    }

    pub fn fail_uploads(&self, fail: bool) {
        *self.fail_uploads.lock().unwrap() = fail;
    }

    pub fn fail_signing(&self, fail: bool) {
        *self.fail_signing.lock().unwrap() = fail;
    }

    pub fn fail_deletes(&self, fail: bool) {
        *self.fail_deletes.lock().unwrap() = fail;
    }

    pub fn uploaded_keys(&self) -> Vec<String> {
        self.uploads.lock().unwrap().clone()
    }

    pub fn delete_attempts(&self) -> usize {
        self.deletes.lock().unwrap().len()
    }

    pub fn deleted_keys(&self) -> Vec<String> {
        self.deletes.lock().unwrap().clone()
    }

    /// (key, expiry in epoch ms) of every signed link issued.
    pub fn signed_links(&self) -> Vec<(String, i64)> {
        self.signed.lock().unwrap().clone()
    }

    /// Make every upload take `by` of simulated time on `clock`.
    pub fn advance_clock_during_upload(&self, clock: Arc<ManualClock>, by: Duration) {
        *self.upload_delay.lock().unwrap() = Some((clock, by));
    }
}

#[async_trait]
impl Storage for MockStorage {
    async fn upload_file(
        &self,
        local_path: &Path,
        storage_key: &str,
        _content_type: &str,
    ) -> StorageResult<()> {
        self.uploads.lock().unwrap().push(storage_key.to_string());
        if *self.fail_uploads.lock().unwrap() {
            return Err(StorageError::UploadFailed("mock upload failure".to_string()));
        }

        let data = tokio::fs::read(local_path).await?;
        self.insert(storage_key, &data);

        if let Some((clock, by)) = self.upload_delay.lock().unwrap().clone() {
            clock.advance(by);
        }
        Ok(())
    }

    async fn signed_url(&self, storage_key: &str, expires_at_ms: i64) -> StorageResult<String> {
        if *self.fail_signing.lock().unwrap() {
            return Err(StorageError::SigningFailed("mock signing failure".to_string()));
        }
        if !self.contains(storage_key) {
            return Err(StorageError::NotFound(storage_key.to_string()));
        }

        self.signed
            .lock()
            .unwrap()
            .push((storage_key.to_string(), expires_at_ms));
        Ok(format!(
            "https://storage.example.com/{}?expires={}",
            storage_key, expires_at_ms
        ))
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        self.deletes.lock().unwrap().push(storage_key.to_string());
        if *self.fail_deletes.lock().unwrap() {
            return Err(StorageError::DeleteFailed("mock delete failure".to_string()));
        }
        self.files.lock().unwrap().remove(storage_key);
        Ok(())
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        Ok(self.contains(storage_key))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}
