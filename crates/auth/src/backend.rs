//! Concrete authentication backend
//!
//! Wraps `PgPool` + `AuthConfig` and owns the staff-user SQL queries.

use sqlx::PgPool;
use uuid::Uuid;

use crate::claims::CognitoClaims;
use crate::config::AuthConfig;
use crate::context::AuthContext;
use crate::error::AuthError;
use crate::types::{StaffIdentity, StaffRole};

const STAFF_COLUMNS: &str = "id, cognito_sub, email, name, role, created_at, updated_at";

/// Concrete authentication backend.
///
/// Domain states expose this via `FromRef`:
/// ```ignore
/// impl FromRef<MyDomainState> for AuthBackend {
///     fn from_ref(state: &MyDomainState) -> Self {
///         state.auth.clone()
///     }
/// }
/// ```
#[derive(Clone)]
pub struct AuthBackend {
    pool: PgPool,
    config: AuthConfig,
}

impl AuthBackend {
    pub fn new(pool: PgPool, config: AuthConfig) -> Self {
        Self { pool, config }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Find staff user by Cognito subject
    pub(crate) async fn find_user_by_sub(
        &self,
        sub: &str,
    ) -> Result<Option<StaffIdentity>, AuthError> {
        let query = format!("SELECT {STAFF_COLUMNS} FROM users WHERE cognito_sub = $1");
        let user = sqlx::query_as::<_, StaffIdentity>(&query)
            .bind(sub)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, cognito_sub = %sub, "Failed to load user");
                AuthError::UserLoadError
            })?;

        Ok(user)
    }

    /// Provision a staff user from JWT claims on first request.
    ///
    /// `ON CONFLICT DO NOTHING` handles concurrent first requests.
    async fn provision_user(&self, claims: &CognitoClaims) -> Result<StaffIdentity, AuthError> {
        let email = claims.email.as_deref().ok_or(AuthError::MissingEmail)?;
        let role = if claims.is_admin() {
            StaffRole::Admin
        } else {
            StaffRole::Coordinator
        };
        let name = claims.name.clone().or_else(|| claims.username.clone());

        sqlx::query(
            r#"
            INSERT INTO users (id, cognito_sub, email, name, role, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, NOW(), NOW())
            ON CONFLICT (cognito_sub) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&claims.sub)
        .bind(email)
        .bind(name)
        .bind(role)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, cognito_sub = %claims.sub, "Failed to provision user");
            AuthError::UserProvisionFailed
        })?;

        tracing::info!(cognito_sub = %claims.sub, email = %email, role = %role, "Staff user provisioned");

        self.find_user_by_sub(&claims.sub).await?.ok_or_else(|| {
            tracing::error!(cognito_sub = %claims.sub, "User not found after provisioning");
            AuthError::UserProvisionFailed
        })
    }

    /// Validate the token and resolve the staff member behind it
    pub(crate) async fn authenticate_jwt(&self, token: &str) -> Result<AuthContext, AuthError> {
        let claims = crate::jwt::validate_jwt_token(token, &self.config)?;

        let user = match self.find_user_by_sub(&claims.sub).await? {
            Some(user) => user,
            None => self.provision_user(&claims).await?,
        };

        Ok(AuthContext::new(user))
    }
}
