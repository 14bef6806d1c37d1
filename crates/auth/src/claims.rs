//! JWT claims types

use serde::{Deserialize, Serialize};

/// Claims carried by Cognito ID and access tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CognitoClaims {
    /// Subject (Cognito user sub)
    pub sub: String,
    /// Email (ID tokens only)
    #[serde(default)]
    pub email: Option<String>,
    /// Display name (ID tokens only)
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "cognito:username", default)]
    pub username: Option<String>,
    #[serde(rename = "cognito:groups", default)]
    pub groups: Vec<String>,
    /// Issued at
    #[serde(default)]
    pub iat: Option<u64>,
    /// Expires at
    pub exp: u64,
    /// Audience (ID tokens)
    #[serde(default)]
    pub aud: Option<String>,
    /// App client (access tokens carry this instead of `aud`)
    #[serde(default)]
    pub client_id: Option<String>,
    /// "id" or "access"
    #[serde(default)]
    pub token_use: Option<String>,
}

impl CognitoClaims {
    /// Whether the token belongs to the Cognito admins group
    pub fn is_admin(&self) -> bool {
        self.groups.iter().any(|g| g.eq_ignore_ascii_case("admins"))
    }

    /// Audience regardless of token kind
    pub fn effective_audience(&self) -> Option<&str> {
        self.aud.as_deref().or(self.client_id.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_cognito_id_token_claims() {
        let json = serde_json::json!({
            "sub": "7c1f3b9e-0000-4000-8000-000000000001",
            "email": "coordinator@example.org",
            "cognito:username": "coordinator",
            "cognito:groups": ["Admins"],
            "iat": 1_700_000_000u64,
            "exp": 1_700_003_600u64,
            "aud": "client-123",
            "token_use": "id"
        });
        let claims: CognitoClaims = serde_json::from_value(json).unwrap();
        assert_eq!(claims.username.as_deref(), Some("coordinator"));
        assert!(claims.is_admin());
        assert_eq!(claims.effective_audience(), Some("client-123"));
    }

    #[test]
    fn test_access_token_uses_client_id_as_audience() {
        let json = serde_json::json!({
            "sub": "abc",
            "exp": 1u64,
            "client_id": "client-456",
            "token_use": "access"
        });
        let claims: CognitoClaims = serde_json::from_value(json).unwrap();
        assert!(!claims.is_admin());
        assert!(claims.groups.is_empty());
        assert_eq!(claims.effective_audience(), Some("client-456"));
    }
}
