//! Applicant, housing search and activity endpoint integration tests

use axum::http::{Method, StatusCode};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::common::{applicant_body, StaffFixture, TestApp};

#[test_log::test(tokio::test)]
#[ignore] // Requires database
async fn test_create_and_fetch_applicant() {
    let app = TestApp::new().await.unwrap();
    let staff = StaffFixture::coordinator(&app.config).unwrap();

    let (status, created) = app
        .post("/api/applicants", &staff, applicant_body("Cohen"))
        .await
        .unwrap();
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["status"], "Submitted");
    let id = created["id"].as_str().unwrap().to_string();

    let (status, detail) = app.get(&format!("/api/applicants/{}", id), &staff).await.unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["husband"]["lastName"], "Cohen");

    let (status, activity) = app
        .get(&format!("/api/applicants/{}/activity", id), &staff)
        .await
        .unwrap();
    assert_eq!(status, StatusCode::OK);
    let items = activity["items"].as_array().unwrap();
    assert!(items.iter().any(|a| a["action"] == "Created"));
}

#[test_log::test(tokio::test)]
#[ignore] // Requires database
async fn test_duplicate_email_is_conflict() {
    let app = TestApp::new().await.unwrap();
    let staff = StaffFixture::coordinator(&app.config).unwrap();

    let body = applicant_body("Levy");
    let (status, _) = app.post("/api/applicants", &staff, body.clone()).await.unwrap();
    assert_eq!(status, StatusCode::CREATED);

    let mut again = applicant_body("Levy");
    again["husband"]["email"] = body["husband"]["email"].clone();
    let (status, _) = app.post("/api/applicants", &staff, again).await.unwrap();
    assert_eq!(status, StatusCode::CONFLICT);
}

#[test_log::test(tokio::test)]
#[ignore] // Requires database
async fn test_soft_delete_and_restore() {
    let app = TestApp::new().await.unwrap();
    let staff = StaffFixture::coordinator(&app.config).unwrap();

    let (_, created) = app
        .post("/api/applicants", &staff, applicant_body("Friedman"))
        .await
        .unwrap();
    let uri = format!("/api/applicants/{}", created["id"].as_str().unwrap());

    let (status, _) = app.request(Method::DELETE, &uri, &staff, None).await.unwrap();
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.get(&uri, &staff).await.unwrap();
    assert_eq!(status, StatusCode::NOT_FOUND);

    let activity_uri = format!("{}/activity", uri);
    let (_, activity) = app.get(&activity_uri, &staff).await.unwrap();
    let logged = activity["totalCount"].as_i64().unwrap();

    // A second delete succeeds without logging anything new
    let (status, _) = app.request(Method::DELETE, &uri, &staff, None).await.unwrap();
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, activity) = app.get(&activity_uri, &staff).await.unwrap();
    assert_eq!(activity["totalCount"].as_i64().unwrap(), logged);

    let (status, restored) = app
        .request(Method::POST, &format!("{}/restore", uri), &staff, None)
        .await
        .unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(restored["isDeleted"], false);
}

#[test_log::test(tokio::test)]
#[ignore] // Requires database
async fn test_one_active_housing_search_per_applicant() {
    let app = TestApp::new().await.unwrap();
    let staff = StaffFixture::coordinator(&app.config).unwrap();

    let (_, created) = app
        .post("/api/applicants", &staff, applicant_body("Stern"))
        .await
        .unwrap();
    let uri = format!(
        "/api/applicants/{}/housing-searches",
        created["id"].as_str().unwrap()
    );

    let (status, search) = app
        .post(&uri, &staff, json!({ "maxBudget": 600000, "minBedrooms": 4 }))
        .await
        .unwrap();
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(search["stage"], "AwaitingAgreements");
    assert_eq!(search["isActive"], true);

    let (status, _) = app.post(&uri, &staff, json!({})).await.unwrap();
    assert_eq!(status, StatusCode::CONFLICT);
}

#[test_log::test(tokio::test)]
#[ignore] // Requires database
async fn test_stage_cannot_skip_ahead() {
    let app = TestApp::new().await.unwrap();
    let staff = StaffFixture::coordinator(&app.config).unwrap();

    let (_, created) = app
        .post("/api/applicants", &staff, applicant_body("Weiss"))
        .await
        .unwrap();
    let (_, search) = app
        .post(
            &format!(
                "/api/applicants/{}/housing-searches",
                created["id"].as_str().unwrap()
            ),
            &staff,
            json!({}),
        )
        .await
        .unwrap();

    let (status, _) = app
        .put(
            &format!("/api/housing-searches/{}/stage", search["id"].as_str().unwrap()),
            &staff,
            json!({ "stage": "MovedIn" }),
        )
        .await
        .unwrap();
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[test_log::test(tokio::test)]
#[ignore] // Requires database
async fn test_email_exists_matches_wife_email_ignoring_case() {
    let app = TestApp::new().await.unwrap();
    let staff = StaffFixture::coordinator(&app.config).unwrap();

    let body = applicant_body("Klein");
    let (_, created) = app.post("/api/applicants", &staff, body.clone()).await.unwrap();
    let id = created["id"].as_str().unwrap();
    let wife_email = body["wife"]["email"].as_str().unwrap().to_uppercase();

    let uri = format!("/api/applicants/email-exists?email={}", wife_email);
    let (status, found) = app.get(&uri, &staff).await.unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(found["exists"], true);

    let (_, excluded) = app
        .get(&format!("{}&excludeApplicantId={}", uri, id), &staff)
        .await
        .unwrap();
    assert_eq!(excluded["exists"], false);

    let unknown_uri = format!(
        "/api/applicants/email-exists?email=nobody.{}@example.org",
        Uuid::new_v4().simple()
    );
    let (_, unknown) = app.get(&unknown_uri, &staff).await.unwrap();
    assert_eq!(unknown["exists"], false);

    // The wife's address, in another case, cannot be reused as a husband's
    let mut again = applicant_body("Klein");
    again["husband"]["email"] = Value::String(wife_email);
    let (status, _) = app.post("/api/applicants", &staff, again).await.unwrap();
    assert_eq!(status, StatusCode::CONFLICT);
}

#[test_log::test(tokio::test)]
#[ignore] // Requires database
async fn test_required_document_gates_stage_change() {
    let app = TestApp::new().await.unwrap();
    let staff = StaffFixture::coordinator(&app.config).unwrap();
    let admin = StaffFixture::admin(&app.config).unwrap();

    // Types left active by an interrupted run would gate this transition for everyone
    sqlx::query("UPDATE document_types SET is_active = FALSE WHERE name LIKE 'Signed agreement %'")
        .execute(&app.pool)
        .await
        .unwrap();

    let tag = Uuid::new_v4().simple().to_string();
    let type_name = format!("Signed agreement {}", &tag[..8]);
    let (status, document_type) = app
        .post("/api/document-types", &admin, json!({ "name": type_name }))
        .await
        .unwrap();
    assert_eq!(status, StatusCode::CREATED);
    let type_id = document_type["id"].as_str().unwrap().to_string();

    let (status, _) = app
        .post(
            "/api/stage-requirements",
            &admin,
            json!({
                "fromStage": "AwaitingAgreements",
                "toStage": "Searching",
                "documentTypeId": type_id,
            }),
        )
        .await
        .unwrap();
    assert_eq!(status, StatusCode::CREATED);

    let (_, created) = app
        .post("/api/applicants", &staff, applicant_body("Gold"))
        .await
        .unwrap();
    let applicant_id = created["id"].as_str().unwrap().to_string();
    let (_, search) = app
        .post(
            &format!("/api/applicants/{}/housing-searches", applicant_id),
            &staff,
            json!({}),
        )
        .await
        .unwrap();
    let stage_uri = format!("/api/housing-searches/{}/stage", search["id"].as_str().unwrap());
    let checklist_uri = format!("/api/applicants/{}/stage-requirements", applicant_id);

    let (status, checklist) = app.get(&checklist_uri, &staff).await.unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(checklist["fromStage"], "AwaitingAgreements");
    assert_eq!(checklist["toStage"], "Searching");
    assert_eq!(checklist["allRequiredUploaded"], false);
    let entry = checklist["requirements"]
        .as_array()
        .unwrap()
        .iter()
        .find(|r| r["documentTypeName"] == type_name.as_str())
        .unwrap();
    assert_eq!(entry["isUploaded"], false);

    let (status, blocked) = app
        .put(&stage_uri, &staff, json!({ "stage": "Searching" }))
        .await
        .unwrap();
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(blocked["title"], "Validation failed");
    assert!(blocked["errors"]
        .as_array()
        .unwrap()
        .iter()
        .any(|e| e.as_str().unwrap().contains(&type_name)));

    let (status, document) = app
        .upload(
            &format!("/api/applicants/{}/documents", applicant_id),
            &staff,
            &[("documentTypeId", type_id.as_str())],
            "agreement.pdf",
            "application/pdf",
            b"%PDF-1.4 signed",
        )
        .await
        .unwrap();
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(document["documentTypeId"], type_id.as_str());

    let (_, checklist) = app.get(&checklist_uri, &staff).await.unwrap();
    assert_eq!(checklist["allRequiredUploaded"], true);

    let (status, moved) = app
        .put(&stage_uri, &staff, json!({ "stage": "Searching" }))
        .await
        .unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(moved["stage"], "Searching");

    let (status, _) = app
        .request(
            Method::DELETE,
            &format!("/api/document-types/{}", type_id),
            &admin,
            None,
        )
        .await
        .unwrap();
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[test_log::test(tokio::test)]
#[ignore] // Requires database
async fn test_malformed_path_and_query_return_error_body() {
    let app = TestApp::new().await.unwrap();
    let staff = StaffFixture::coordinator(&app.config).unwrap();

    for uri in [
        "/api/applicants/not-a-uuid",
        "/api/applicants?page=abc",
        "/api/applicants?includeDeleted=maybe",
    ] {
        let (status, body) = app.get(uri, &staff).await.unwrap();
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert_eq!(body["title"], "Validation failed", "{}", uri);
        assert_eq!(body["errors"].as_array().unwrap().len(), 1, "{}", uri);
    }
}
