//! AWS S3 Storage Implementation
//!
//! Stores objects in a single bucket, with support for the LocalStack
//! testing environment.

use std::time::Duration;

use aws_config::{BehaviorVersion, Region};
use aws_credential_types::Credentials;
use aws_sdk_s3::config::SharedCredentialsProvider;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use chrono::Utc;

use crate::{PresignedUrl, StorageConfig, StorageError, StorageService};

/// AWS S3 storage service implementation
pub struct S3StorageService {
    client: S3Client,
    bucket: String,
}

impl S3StorageService {
    /// Create a new S3 storage service
    pub async fn new(config: StorageConfig) -> Result<Self, StorageError> {
        if config.bucket.trim().is_empty() {
            return Err(StorageError::Configuration(
                "S3 bucket name is required".to_string(),
            ));
        }

        let client = match config.aws_endpoint_url.as_ref() {
            Some(endpoint_url) => {
                tracing::info!("Using custom AWS endpoint: {}", endpoint_url);

                // For LocalStack, use dummy credentials
                let credentials = Credentials::new(
                    "test-access-key",
                    "test-secret-key",
                    None,
                    None,
                    "localstack-storage-provider",
                );

                let aws_config = aws_config::defaults(BehaviorVersion::latest())
                    .region(Region::new(config.aws_region.clone()))
                    .endpoint_url(endpoint_url)
                    .credentials_provider(SharedCredentialsProvider::new(credentials))
                    .load()
                    .await;

                // LocalStack serves buckets on the path, not a subdomain
                let s3_config = aws_sdk_s3::config::Builder::from(&aws_config)
                    .force_path_style(true)
                    .build();
                S3Client::from_conf(s3_config)
            }
            None => {
                let aws_config = aws_config::defaults(BehaviorVersion::latest())
                    .region(Region::new(config.aws_region.clone()))
                    .load()
                    .await;
                S3Client::new(&aws_config)
            }
        };

        Ok(Self {
            client,
            bucket: config.bucket,
        })
    }
}

#[async_trait::async_trait]
impl StorageService for S3StorageService {
    async fn put_object(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError> {
        let size = bytes.len();
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| StorageError::AwsS3(format!("Failed to upload {}: {}", key, e)))?;

        tracing::debug!(bucket = %self.bucket, key = %key, size, "Object uploaded");
        Ok(())
    }

    async fn delete_object(&self, key: &str) -> Result<(), StorageError> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| StorageError::AwsS3(format!("Failed to delete {}: {}", key, e)))?;

        tracing::debug!(bucket = %self.bucket, key = %key, "Object deleted");
        Ok(())
    }

    async fn presigned_get_url(
        &self,
        key: &str,
        expires_in: Duration,
    ) -> Result<PresignedUrl, StorageError> {
        let presigning = PresigningConfig::expires_in(expires_in)
            .map_err(|e| StorageError::Configuration(format!("Invalid expiry: {}", e)))?;

        let request = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(presigning)
            .await
            .map_err(|e| StorageError::AwsS3(format!("Failed to presign {}: {}", key, e)))?;

        let expires_at = Utc::now()
            + chrono::Duration::from_std(expires_in)
                .map_err(|e| StorageError::Configuration(format!("Invalid expiry: {}", e)))?;

        Ok(PresignedUrl {
            url: request.uri().to_string(),
            expires_at,
        })
    }

    fn bucket(&self) -> &str {
        &self.bucket
    }
}
