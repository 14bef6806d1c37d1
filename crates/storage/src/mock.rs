//! Mock Storage Implementation
//!
//! Keeps objects in memory so tests can assert on uploads and deletes
//! without external dependencies.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::{PresignedUrl, StorageError, StorageService};

/// Object held by the mock service
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub bytes: Vec<u8>,
    pub content_type: String,
    pub stored_at: DateTime<Utc>,
}

/// Mock storage service for testing
#[derive(Debug, Clone)]
pub struct MockStorageService {
    bucket: String,
    objects: Arc<Mutex<HashMap<String, StoredObject>>>,
    fail_uploads: Arc<Mutex<bool>>,
}

impl MockStorageService {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            objects: Arc::new(Mutex::new(HashMap::new())),
            fail_uploads: Arc::new(Mutex::new(false)),
        }
    }

    /// Make subsequent uploads fail (simulates an S3 outage)
    pub fn set_fail_uploads(&self, fail: bool) {
        if let Ok(mut flag) = self.fail_uploads.lock() {
            *flag = fail;
        }
    }

    pub fn get_object(&self, key: &str) -> Option<StoredObject> {
        self.objects.lock().ok()?.get(key).cloned()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get_object(key).is_some()
    }

    pub fn object_count(&self) -> usize {
        self.objects.lock().map(|o| o.len()).unwrap_or(0)
    }

    /// Keys currently stored, sorted
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .objects
            .lock()
            .map(|o| o.keys().cloned().collect())
            .unwrap_or_default();
        keys.sort();
        keys
    }

    fn lock_error() -> StorageError {
        StorageError::AwsS3("mock storage lock poisoned".to_string())
    }
}

impl Default for MockStorageService {
    fn default() -> Self {
        Self::new("mock-bucket")
    }
}

#[async_trait::async_trait]
impl StorageService for MockStorageService {
    async fn put_object(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError> {
        if self.fail_uploads.lock().map(|f| *f).unwrap_or(false) {
            return Err(StorageError::AwsS3(format!(
                "Simulated upload failure for {}",
                key
            )));
        }

        tracing::debug!(key = %key, size = bytes.len(), "Mock object stored");
        self.objects.lock().map_err(|_| Self::lock_error())?.insert(
            key.to_string(),
            StoredObject {
                bytes,
                content_type: content_type.to_string(),
                stored_at: Utc::now(),
            },
        );
        Ok(())
    }

    async fn delete_object(&self, key: &str) -> Result<(), StorageError> {
        self.objects
            .lock()
            .map_err(|_| Self::lock_error())?
            .remove(key);
        Ok(())
    }

    async fn presigned_get_url(
        &self,
        key: &str,
        expires_in: Duration,
    ) -> Result<PresignedUrl, StorageError> {
        if !self.contains(key) {
            return Err(StorageError::NotFound(key.to_string()));
        }
        let expires_at = Utc::now()
            + chrono::Duration::from_std(expires_in)
                .map_err(|e| StorageError::Configuration(format!("Invalid expiry: {}", e)))?;

        Ok(PresignedUrl {
            url: format!(
                "https://{}.mock-storage.local/{}?expires={}",
                self.bucket,
                key,
                expires_at.timestamp()
            ),
            expires_at,
        })
    }

    fn bucket(&self) -> &str {
        &self.bucket
    }
}
