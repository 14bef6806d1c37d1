//! Relocation CRM Object Storage
//!
//! Stores uploaded applicant documents and property photos with support for:
//! - AWS S3 for production
//! - In-memory mock storage for tests and local development
//! - LocalStack endpoints for local E2E testing

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

pub mod mock;
pub mod s3;

/// Maximum length of a sanitized file name
pub const MAX_FILE_NAME_LENGTH: usize = 100;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage configuration error: {0}")]
    Configuration(String),

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("AWS S3 error: {0}")]
    AwsS3(String),
}

impl From<StorageError> for relocrm_common::Error {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(key) => {
                relocrm_common::Error::NotFound(format!("Stored file '{}' was not found", key))
            }
            other => relocrm_common::Error::Storage(other.to_string()),
        }
    }
}

/// Presigned download link
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PresignedUrl {
    pub url: String,
    pub expires_at: DateTime<Utc>,
}

/// Storage service configuration
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Storage provider (s3, mock)
    pub provider: String,
    pub bucket: String,
    pub aws_region: String,
    /// AWS endpoint URL (for LocalStack)
    pub aws_endpoint_url: Option<String>,
}

impl StorageConfig {
    pub fn from_config(config: &relocrm_common::config::Config) -> Self {
        Self {
            provider: config.storage_provider.clone(),
            bucket: config.s3_bucket_documents.clone(),
            aws_region: config.aws_region.clone(),
            aws_endpoint_url: config.aws_endpoint_url.clone(),
        }
    }
}

/// Object storage trait for different implementations
#[async_trait::async_trait]
pub trait StorageService: Send + Sync {
    /// Upload an object, replacing any existing object under `key`
    async fn put_object(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError>;

    /// Delete an object; deleting a missing key succeeds
    async fn delete_object(&self, key: &str) -> Result<(), StorageError>;

    /// Time-limited GET link for an object
    async fn presigned_get_url(
        &self,
        key: &str,
        expires_in: Duration,
    ) -> Result<PresignedUrl, StorageError>;

    fn bucket(&self) -> &str;
}

/// Storage service factory
pub struct StorageServiceFactory;

impl StorageServiceFactory {
    /// Create storage service based on configuration
    pub async fn create(config: StorageConfig) -> Result<Box<dyn StorageService>, StorageError> {
        match config.provider.as_str() {
            "s3" | "aws-s3" => {
                tracing::info!(bucket = %config.bucket, "Creating S3 storage service");
                Ok(Box::new(s3::S3StorageService::new(config).await?))
            }
            "mock" => {
                tracing::info!("Creating mock storage service");
                Ok(Box::new(mock::MockStorageService::new(config.bucket)))
            }
            provider => Err(StorageError::Configuration(format!(
                "Unknown storage provider: {}. Supported providers: s3, mock",
                provider
            ))),
        }
    }
}

/// Make an uploaded file name safe for use in an object key.
///
/// Keeps ASCII letters, digits, `.`, `_` and `-`; everything else becomes `_`.
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name).trim();

    let sanitized: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .take(MAX_FILE_NAME_LENGTH)
        .collect();

    if sanitized.is_empty() || sanitized.chars().all(|c| c == '.') {
        "file".to_string()
    } else {
        sanitized
    }
}
