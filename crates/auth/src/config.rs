//! Authentication configuration

use relocrm_common::config::Config;

/// Authentication configuration
#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
    /// HS256 secret (local development and tests)
    pub jwt_secret: Option<String>,
    /// RS256 public key PEM (Cognito); preferred when set
    pub jwt_public_key_pem: Option<String>,
    pub issuer: Option<String>,
    pub audience: Option<String>,
}

impl AuthConfig {
    /// HS256-only configuration
    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: Some(secret.into()),
            ..Self::default()
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            jwt_secret: config.jwt_secret.clone(),
            jwt_public_key_pem: config.jwt_public_key_pem.clone(),
            issuer: config.cognito_issuer(),
            audience: config.cognito_client_id.clone(),
        }
    }
}
