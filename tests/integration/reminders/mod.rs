//! Follow-up reminder endpoint integration tests

use axum::http::{Method, StatusCode};
use chrono::{Duration, Utc};
use serde_json::json;

use crate::common::{StaffFixture, TestApp};

#[test_log::test(tokio::test)]
#[ignore] // Requires database
async fn test_reminder_lifecycle() {
    let app = TestApp::new().await.unwrap();
    let staff = StaffFixture::coordinator(&app.config).unwrap();

    let (status, reminder) = app
        .post(
            "/api/reminders",
            &staff,
            json!({
                "title": "Call about the lease",
                "dueAt": Utc::now() + Duration::days(1),
                "priority": "high",
            }),
        )
        .await
        .unwrap();
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(reminder["status"], "Open");
    assert_eq!(reminder["priority"], "High");
    assert!(reminder["assignedTo"].is_string());
    let uri = format!("/api/reminders/{}", reminder["id"].as_str().unwrap());

    let (status, snoozed) = app
        .post(
            &format!("{}/snooze", uri),
            &staff,
            json!({ "until": Utc::now() + Duration::days(2) }),
        )
        .await
        .unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(snoozed["status"], "Snoozed");

    let (status, completed) = app
        .request(Method::POST, &format!("{}/complete", uri), &staff, None)
        .await
        .unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(completed["status"], "Completed");
    assert!(completed["completedAt"].is_string());

    let (status, reopened) = app
        .request(Method::POST, &format!("{}/reopen", uri), &staff, None)
        .await
        .unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reopened["status"], "Open");
    assert!(reopened["completedAt"].is_null());

    let (status, _) = app
        .request(Method::POST, &format!("{}/dismiss", uri), &staff, None)
        .await
        .unwrap();
    assert_eq!(status, StatusCode::OK);

    // Dismissed is final
    let (status, _) = app
        .request(Method::POST, &format!("{}/reopen", uri), &staff, None)
        .await
        .unwrap();
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[test_log::test(tokio::test)]
#[ignore] // Requires database
async fn test_only_assignee_or_admin_may_act() {
    let app = TestApp::new().await.unwrap();
    let owner = StaffFixture::coordinator(&app.config).unwrap();
    let other = StaffFixture::coordinator(&app.config).unwrap();
    let admin = StaffFixture::admin(&app.config).unwrap();

    let (_, reminder) = app
        .post(
            "/api/reminders",
            &owner,
            json!({ "title": "Follow up", "dueAt": Utc::now() + Duration::hours(4) }),
        )
        .await
        .unwrap();
    let complete = format!(
        "/api/reminders/{}/complete",
        reminder["id"].as_str().unwrap()
    );

    let (status, _) = app
        .request(Method::POST, &complete, &other, None)
        .await
        .unwrap();
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .request(Method::POST, &complete, &admin, None)
        .await
        .unwrap();
    assert_eq!(status, StatusCode::OK);
}

#[test_log::test(tokio::test)]
#[ignore] // Requires database
async fn test_summary_counts_callers_reminders() {
    let app = TestApp::new().await.unwrap();
    let staff = StaffFixture::coordinator(&app.config).unwrap();

    for due in [Utc::now() - Duration::hours(1), Utc::now() + Duration::days(3)] {
        let (status, _) = app
            .post(
                "/api/reminders",
                &staff,
                json!({ "title": "Check in", "dueAt": due }),
            )
            .await
            .unwrap();
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, summary) = app.get("/api/reminders/summary", &staff).await.unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["overdue"], 1);
    assert_eq!(summary["upcoming"], 1);
}
