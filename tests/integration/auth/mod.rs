//! Authentication and authorization across the composed router

use axum::{
    body::Body,
    http::{header::AUTHORIZATION, Request, StatusCode},
};
use serde_json::json;
use tower::ServiceExt;

use crate::common::{create_test_jwt, StaffFixture, TestApp};

#[test_log::test(tokio::test)]
#[ignore] // Requires database
async fn test_missing_token_is_unauthorized() {
    let app = TestApp::new().await.unwrap();
    let response = app
        .router
        .clone()
        .oneshot(Request::get("/api/properties").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[test_log::test(tokio::test)]
#[ignore] // Requires database
async fn test_token_signed_with_other_secret_is_rejected() {
    let app = TestApp::new().await.unwrap();
    let token = create_test_jwt("someone", "someone@relocrm.test", &[], "not-the-secret").unwrap();
    let response = app
        .router
        .clone()
        .oneshot(
            Request::get("/api/properties")
                .header(AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[test_log::test(tokio::test)]
#[ignore] // Requires database
async fn test_first_request_provisions_staff_user() {
    let app = TestApp::new().await.unwrap();
    let staff = StaffFixture::coordinator(&app.config).unwrap();

    let (status, _) = app.get("/api/dashboard/stats", &staff).await.unwrap();
    assert_eq!(status, StatusCode::OK);

    let role: String = sqlx::query_scalar("SELECT role::text FROM users WHERE cognito_sub = $1")
        .bind(&staff.sub)
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(role, "coordinator");
}

#[test_log::test(tokio::test)]
#[ignore] // Requires database
async fn test_configuration_changes_need_admin() {
    let app = TestApp::new().await.unwrap();
    let coordinator = StaffFixture::coordinator(&app.config).unwrap();
    let admin = StaffFixture::admin(&app.config).unwrap();
    let name = format!("Lease {}", uuid::Uuid::new_v4().simple());

    let (status, _) = app
        .post("/api/document-types", &coordinator, json!({ "name": name }))
        .await
        .unwrap();
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .post("/api/document-types", &admin, json!({ "name": name }))
        .await
        .unwrap();
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["name"], name.as_str());

    // Names are unique case-insensitively
    let (status, _) = app
        .post(
            "/api/document-types",
            &admin,
            json!({ "name": name.to_uppercase() }),
        )
        .await
        .unwrap();
    assert_eq!(status, StatusCode::CONFLICT);
}
