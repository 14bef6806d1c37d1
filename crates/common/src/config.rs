//! Configuration management following 12-factor app principles
//!
//! All configuration is loaded from environment variables to ensure
//! clean separation between code and config.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Database connection URL (PostgreSQL)
    pub database_url: String,
    pub database_max_connections: u32,

    /// Cognito user pool; used to derive the expected token issuer
    pub cognito_user_pool_id: Option<String>,
    pub cognito_client_id: Option<String>,

    /// HS256 secret for local development tokens
    pub jwt_secret: Option<String>,
    /// RS256 public key (PEM) for Cognito-issued tokens
    pub jwt_public_key_pem: Option<String>,

    /// Object storage
    pub storage_provider: String,
    pub s3_bucket_documents: String,
    pub aws_region: String,
    pub aws_endpoint_url: Option<String>,

    /// Runtime configuration
    pub cors_allowed_origins: Option<String>,
    pub rust_log: String,
    pub port: u16,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if it exists

        let config = Self {
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL is required"))?,
            database_max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),

            cognito_user_pool_id: non_empty_var("COGNITO_USER_POOL_ID"),
            cognito_client_id: non_empty_var("COGNITO_CLIENT_ID"),

            jwt_secret: non_empty_var("JWT_SECRET"),
            jwt_public_key_pem: non_empty_var("JWT_PUBLIC_KEY_PEM"),

            storage_provider: env::var("STORAGE_PROVIDER").unwrap_or_else(|_| "mock".to_string()),
            s3_bucket_documents: env::var("S3_BUCKET_DOCUMENTS")
                .unwrap_or_else(|_| "relocrm-documents".to_string()),
            aws_region: env::var("AWS_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
            aws_endpoint_url: non_empty_var("AWS_ENDPOINT_URL"),

            cors_allowed_origins: non_empty_var("CORS_ALLOWED_ORIGINS"),
            rust_log: env::var("RUST_LOG").unwrap_or_else(|_| "relocrm=debug".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .unwrap_or(3000),
        };

        if config.jwt_secret.is_none() && config.jwt_public_key_pem.is_none() {
            return Err(anyhow::anyhow!(
                "Either JWT_PUBLIC_KEY_PEM or JWT_SECRET is required"
            ));
        }

        Ok(config)
    }

    /// Expected `iss` claim for Cognito tokens
    pub fn cognito_issuer(&self) -> Option<String> {
        self.cognito_user_pool_id.as_ref().map(|pool| {
            format!(
                "https://cognito-idp.{}.amazonaws.com/{}",
                self.aws_region, pool
            )
        })
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}
