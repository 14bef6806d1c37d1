//! JWT validation and token extraction helpers

use axum::http::HeaderValue;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

use crate::claims::CognitoClaims;
use crate::config::AuthConfig;
use crate::error::AuthError;

/// Validate a bearer token and return its claims.
///
/// Uses RS256 when a public key is configured, HS256 otherwise. Cognito
/// access tokens carry `client_id` instead of `aud`, so the audience is
/// checked against whichever of the two is present.
pub(crate) fn validate_jwt_token(
    token: &str,
    config: &AuthConfig,
) -> Result<CognitoClaims, AuthError> {
    let (mut validation, decoding_key) = match (&config.jwt_public_key_pem, &config.jwt_secret) {
        (Some(pem), _) => {
            let key = DecodingKey::from_rsa_pem(pem.as_bytes()).map_err(|e| {
                tracing::error!(error = %e, "Configured JWT public key is not a valid RSA PEM");
                AuthError::AuthenticationFailed
            })?;
            (Validation::new(Algorithm::RS256), key)
        }
        (None, Some(secret)) => (
            Validation::new(Algorithm::HS256),
            DecodingKey::from_secret(secret.as_bytes()),
        ),
        (None, None) => {
            tracing::error!("No JWT verification key configured");
            return Err(AuthError::AuthenticationFailed);
        }
    };

    validation.validate_aud = false;
    if let Some(iss) = &config.issuer {
        validation.set_issuer(&[iss]);
    }

    let token_data = decode::<CognitoClaims>(token, &decoding_key, &validation).map_err(|e| {
        tracing::debug!(error = %e, "JWT validation failed");
        AuthError::InvalidToken
    })?;

    if let Some(expected) = &config.audience {
        if token_data.claims.effective_audience() != Some(expected.as_str()) {
            tracing::debug!("JWT audience mismatch");
            return Err(AuthError::InvalidToken);
        }
    }

    Ok(token_data.claims)
}

/// Extract bearer token from Authorization header
pub(crate) fn extract_bearer_token(header: &HeaderValue) -> Result<String, AuthError> {
    let header_str = header
        .to_str()
        .map_err(|_| AuthError::InvalidAuthorizationFormat)?;

    match header_str.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim().to_string()),
        _ => Err(AuthError::InvalidAuthorizationFormat),
    }
}
