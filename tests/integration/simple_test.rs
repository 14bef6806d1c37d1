//! Integration test infrastructure checks that need no database

#![allow(dead_code)]

use axum::{body::Body, http::Request};
use relocrm_auth::AuthConfig;
use relocrm_storage::mock::MockStorageService;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tower::ServiceExt;

mod common;

use crate::common::{create_test_jwt, StaffFixture, TestConfig};

fn router() -> axum::Router {
    let pool = PgPoolOptions::new()
        .connect_lazy("postgres://localhost/relocrm_unused")
        .unwrap();
    relocrm_app::build_router(
        pool,
        AuthConfig::with_secret("test_secret_key_for_testing_only"),
        Arc::new(MockStorageService::default()),
    )
}

#[tokio::test]
async fn test_health_endpoint() {
    let response = router()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn test_every_domain_requires_authentication() {
    for uri in [
        "/api/applicants",
        "/api/properties",
        "/api/showings",
        "/api/shuls",
        "/api/reminders",
        "/api/activity",
        "/api/dashboard/stats",
    ] {
        let response = router()
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), 401, "{} should require a token", uri);
    }
}

#[test]
fn test_config_loading() {
    let config = TestConfig::from_env();
    assert!(!config.database_url.is_empty());
    assert!(!config.jwt_secret.is_empty());
}

#[test]
fn test_fixture_tokens_are_distinct() {
    let config = TestConfig::from_env();
    let a = StaffFixture::coordinator(&config).unwrap();
    let b = StaffFixture::admin(&config).unwrap();
    assert_ne!(a.sub, b.sub);
    assert_ne!(a.token, b.token);
    assert!(create_test_jwt(&a.sub, &a.email, &[], &config.jwt_secret).is_ok());
}
