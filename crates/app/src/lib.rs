//! Relocation CRM application composition root
//!
//! Composes all domain routers into a single application.

use std::sync::Arc;
use std::time::Duration;

use axum::{extract::DefaultBodyLimit, http::HeaderValue, routing::get, Router};
use relocrm_activity::{ActivityRepositories, ActivityState};
use relocrm_applicants::{ApplicantsRepositories, ApplicantsState};
use relocrm_auth::{AuthBackend, AuthConfig};
use relocrm_common::config::Config;
use relocrm_properties::{PropertiesRepositories, PropertiesState};
use relocrm_reminders::{RemindersRepositories, RemindersState};
use relocrm_shuls::{ShulsRepositories, ShulsState};
use relocrm_storage::{StorageConfig, StorageService, StorageServiceFactory};
use sqlx::{postgres::PgPoolOptions, PgPool};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

/// Largest accepted request body; covers multipart document and photo uploads
pub const MAX_BODY_BYTES: usize = 30 * 1024 * 1024;

/// Open the Postgres pool described by the configuration
pub async fn connect_pool(config: &Config) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .acquire_timeout(Duration::from_secs(10))
        .connect(&config.database_url)
        .await
}

/// Create the main application router with all routes and middleware
pub async fn create_app(config: &Config, pool: PgPool) -> Result<Router, anyhow::Error> {
    let storage = StorageServiceFactory::create(StorageConfig::from_config(config)).await?;
    Ok(build_router(pool, AuthConfig::from_config(config), Arc::from(storage)))
}

/// Wire every domain router over one pool, auth backend and storage service
pub fn build_router(
    pool: PgPool,
    auth_config: AuthConfig,
    storage: Arc<dyn StorageService>,
) -> Router {
    let auth = AuthBackend::new(pool.clone(), auth_config);

    let activity_state = ActivityState {
        repos: ActivityRepositories::new(pool.clone()),
        auth: auth.clone(),
    };
    let applicants_state = ApplicantsState {
        repos: ApplicantsRepositories::new(pool.clone()),
        auth: auth.clone(),
        storage: storage.clone(),
    };
    let properties_state = PropertiesState {
        repos: PropertiesRepositories::new(pool.clone()),
        auth: auth.clone(),
        storage,
    };
    let shuls_state = ShulsState {
        repos: ShulsRepositories::new(pool.clone()),
        auth: auth.clone(),
    };
    let reminders_state = RemindersState {
        repos: RemindersRepositories::new(pool),
        auth,
    };

    Router::new()
        .route("/health", get(health_check))
        .route("/", get(|| async { "Relocation CRM API v0.1.0-SNAPSHOT" }))
        .merge(relocrm_activity::routes().with_state(activity_state))
        .merge(relocrm_applicants::routes().with_state(applicants_state))
        .merge(relocrm_properties::routes().with_state(properties_state))
        .merge(relocrm_shuls::routes().with_state(shuls_state))
        .merge(relocrm_reminders::routes().with_state(reminders_state))
}

/// CORS for a comma-separated origin list; `*` allows any origin
pub fn build_cors_layer(origins: &str) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.split(',').any(|o| o.trim() == "*") {
        return layer.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(allowed))
}

/// Raise the extractor body limit to fit uploads
pub fn body_limit_layer() -> DefaultBodyLimit {
    DefaultBodyLimit::max(MAX_BODY_BYTES)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request};
    use relocrm_storage::mock::MockStorageService;
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    fn app() -> Router {
        // Lazy pool: routes that never touch the database work without one
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/relocrm_unused")
            .unwrap();
        build_router(
            pool,
            AuthConfig::with_secret("test-secret"),
            Arc::new(MockStorageService::default()),
        )
    }

    #[tokio::test]
    async fn test_health_check() {
        let response = app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
    }

    #[tokio::test]
    async fn test_api_requires_bearer_token() {
        let response = app()
            .oneshot(Request::get("/api/applicants").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), 401);
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let response = app()
            .oneshot(Request::get("/api/nowhere").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), 404);
    }

    #[test]
    fn test_body_limit_fits_uploads() {
        assert_eq!(MAX_BODY_BYTES, 30 * 1024 * 1024);
    }
}
