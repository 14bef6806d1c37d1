//! Property, match and showing endpoint integration tests

use axum::http::{Method, StatusCode};
use chrono::{Duration, Utc};
use serde_json::{json, Value};

use crate::common::{applicant_body, property_body, StaffFixture, TestApp};

/// Applicant with an active search (600k budget, 4 bedrooms, Lakewood);
/// returns the search id
async fn active_search(app: &TestApp, staff: &StaffFixture) -> String {
    let (_, applicant) = app
        .post("/api/applicants", staff, applicant_body("Katz"))
        .await
        .unwrap();
    let (status, search) = app
        .post(
            &format!(
                "/api/applicants/{}/housing-searches",
                applicant["id"].as_str().unwrap()
            ),
            staff,
            json!({
                "maxBudget": 600000,
                "minBedrooms": 4,
                "preferredAreas": ["Lakewood"],
            }),
        )
        .await
        .unwrap();
    assert_eq!(status, StatusCode::CREATED);
    search["id"].as_str().unwrap().to_string()
}

async fn create_property(app: &TestApp, staff: &StaffFixture, price: u32, bedrooms: u32) -> Value {
    let (status, property) = app
        .post(
            "/api/properties",
            staff,
            property_body("12 Main St", price, bedrooms),
        )
        .await
        .unwrap();
    assert_eq!(status, StatusCode::CREATED);
    property
}

#[test_log::test(tokio::test)]
#[ignore] // Requires database
async fn test_property_lifecycle() {
    let app = TestApp::new().await.unwrap();
    let staff = StaffFixture::coordinator(&app.config).unwrap();

    let property = create_property(&app, &staff, 550_000, 4).await;
    assert_eq!(property["status"], "Active");
    assert_eq!(property["propertyType"], "House");
    let uri = format!("/api/properties/{}", property["id"].as_str().unwrap());

    let (status, updated) = app
        .put(
            &format!("{}/status", uri),
            &staff,
            json!({ "status": "UnderContract" }),
        )
        .await
        .unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "UnderContract");

    let (status, _) = app.request(Method::DELETE, &uri, &staff, None).await.unwrap();
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = app.request(Method::DELETE, &uri, &staff, None).await.unwrap();
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.get(&uri, &staff).await.unwrap();
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[test_log::test(tokio::test)]
#[ignore] // Requires database
async fn test_price_range_must_be_ordered() {
    let app = TestApp::new().await.unwrap();
    let staff = StaffFixture::coordinator(&app.config).unwrap();

    let (status, _) = app
        .get("/api/properties?minPrice=500000&maxPrice=100000", &staff)
        .await
        .unwrap();
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[test_log::test(tokio::test)]
#[ignore] // Requires database
async fn test_match_showing_offer_flow() {
    let app = TestApp::new().await.unwrap();
    let staff = StaffFixture::coordinator(&app.config).unwrap();

    let search_id = active_search(&app, &staff).await;
    let property = create_property(&app, &staff, 550_000, 4).await;
    let property_id = property["id"].as_str().unwrap();

    let (status, matched) = app
        .post(
            "/api/property-matches",
            &staff,
            json!({ "housingSearchId": search_id, "propertyId": property_id }),
        )
        .await
        .unwrap();
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(matched["matchScore"], 100);
    assert_eq!(matched["status"], "MatchIdentified");
    assert_eq!(matched["familyName"], "Katz");
    let match_id = matched["id"].as_str().unwrap().to_string();

    // Same pair again
    let (status, _) = app
        .post(
            "/api/property-matches",
            &staff,
            json!({ "housingSearchId": search_id, "propertyId": property_id }),
        )
        .await
        .unwrap();
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, showing) = app
        .post(
            "/api/showings",
            &staff,
            json!({
                "propertyMatchId": match_id,
                "scheduledAt": Utc::now() + Duration::days(2),
            }),
        )
        .await
        .unwrap();
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(showing["status"], "Scheduled");
    assert_eq!(showing["durationMinutes"], 30);

    let match_uri = format!("/api/property-matches/{}", match_id);
    let (_, current) = app.get(&match_uri, &staff).await.unwrap();
    assert_eq!(current["status"], "ShowingScheduled");

    let (status, completed) = app
        .put(
            &format!("/api/showings/{}/complete", showing["id"].as_str().unwrap()),
            &staff,
            json!({ "feedback": "Loved the yard" }),
        )
        .await
        .unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(completed["status"], "Completed");

    let (_, current) = app.get(&match_uri, &staff).await.unwrap();
    assert_eq!(current["status"], "ShowingCompleted");

    let (status, offered) = app
        .put(
            &format!("{}/offer", match_uri),
            &staff,
            json!({ "amount": 540000 }),
        )
        .await
        .unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(offered["status"], "OfferMade");
    assert_eq!(
        offered["offerAmount"].as_str().unwrap().parse::<f64>().unwrap(),
        540000.0
    );

    let (status, matches) = app
        .get(&format!("/api/housing-searches/{}/matches", search_id), &staff)
        .await
        .unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(matches.as_array().unwrap().len(), 1);
}

#[test_log::test(tokio::test)]
#[ignore] // Requires database
async fn test_request_showings_counts_only_identified_matches() {
    let app = TestApp::new().await.unwrap();
    let staff = StaffFixture::coordinator(&app.config).unwrap();

    let search_id = active_search(&app, &staff).await;
    let mut match_ids = Vec::new();
    for bedrooms in [3, 4] {
        let property = create_property(&app, &staff, 500_000, bedrooms).await;
        let (_, matched) = app
            .post(
                "/api/property-matches",
                &staff,
                json!({ "housingSearchId": search_id, "propertyId": property["id"] }),
            )
            .await
            .unwrap();
        match_ids.push(matched["id"].clone());
    }

    let (status, body) = app
        .post(
            "/api/property-matches/request-showings",
            &staff,
            json!({ "matchIds": match_ids }),
        )
        .await
        .unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["requestedCount"], 2);

    let (_, body) = app
        .post(
            "/api/property-matches/request-showings",
            &staff,
            json!({ "matchIds": match_ids }),
        )
        .await
        .unwrap();
    assert_eq!(body["requestedCount"], 0);
}

#[test_log::test(tokio::test)]
#[ignore] // Requires database
async fn test_photo_upload_requires_multipart() {
    let app = TestApp::new().await.unwrap();
    let staff = StaffFixture::coordinator(&app.config).unwrap();

    let property = create_property(&app, &staff, 480_000, 3).await;
    let photos_uri = format!("/api/properties/{}/photos", property["id"].as_str().unwrap());

    let (status, body) = app
        .post(&photos_uri, &staff, json!({ "file": "front.jpg" }))
        .await
        .unwrap();
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["title"], "Validation failed");

    let (status, photo) = app
        .upload(&photos_uri, &staff, &[], "front.jpg", "image/jpeg", b"\xFF\xD8\xFF jpeg")
        .await
        .unwrap();
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(photo["isPrimary"], true);
    assert_eq!(photo["contentType"], "image/jpeg");
    assert!(photo["url"].as_str().is_some());
}
