//! Shul directory and walking distance integration tests

use axum::http::{Method, StatusCode};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::common::{property_body, StaffFixture, TestApp};

fn shul_body(name: &str, latitude: f64, longitude: f64) -> Value {
    json!({
        "name": name,
        "address": {
            "street": "1 Shul Way",
            "city": "Lakewood",
            "state": "NJ",
            "zipCode": "08701",
            "latitude": latitude,
            "longitude": longitude,
        },
    })
}

#[test_log::test(tokio::test)]
#[ignore] // Requires database
async fn test_walking_distance_from_property() {
    let app = TestApp::new().await.unwrap();
    let staff = StaffFixture::coordinator(&app.config).unwrap();

    let name = format!("Bais Medrash {}", Uuid::new_v4().simple());
    let (status, shul) = app
        .post("/api/shuls", &staff, shul_body(&name, 40.01, -74.0))
        .await
        .unwrap();
    assert_eq!(status, StatusCode::CREATED);
    let shul_id = shul["id"].clone();

    let (_, property) = app
        .post("/api/properties", &staff, property_body("3 Oak Ct", 500_000, 4))
        .await
        .unwrap();
    let uri = format!(
        "/api/properties/{}/shul-distances",
        property["id"].as_str().unwrap()
    );

    let (status, distances) = app.get(&uri, &staff).await.unwrap();
    assert_eq!(status, StatusCode::OK);
    let ours = distances
        .as_array()
        .unwrap()
        .iter()
        .find(|d| d["shulId"] == shul_id)
        .cloned()
        .unwrap();
    assert_eq!(ours["walkingMinutes"], 18);
    assert_eq!(ours["shulName"], name.as_str());

    // Second read comes from the cache with the same result
    let (_, cached) = app.get(&uri, &staff).await.unwrap();
    let again = cached
        .as_array()
        .unwrap()
        .iter()
        .find(|d| d["shulId"] == shul_id)
        .cloned()
        .unwrap();
    assert_eq!(again["walkingMinutes"], 18);
    assert_eq!(again["distanceMiles"], ours["distanceMiles"]);

    let (status, _) = app
        .request(Method::POST, &format!("{}/recalculate", uri), &staff, None)
        .await
        .unwrap();
    assert_eq!(status, StatusCode::OK);
}

#[test_log::test(tokio::test)]
#[ignore] // Requires database
async fn test_inactive_shuls_are_excluded() {
    let app = TestApp::new().await.unwrap();
    let staff = StaffFixture::coordinator(&app.config).unwrap();

    let (_, shul) = app
        .post(
            "/api/shuls",
            &staff,
            shul_body(&format!("Ohr {}", Uuid::new_v4().simple()), 40.02, -74.0),
        )
        .await
        .unwrap();
    let shul_id = shul["id"].clone();
    let (status, deactivated) = app
        .request(
            Method::POST,
            &format!("/api/shuls/{}/deactivate", shul_id.as_str().unwrap()),
            &staff,
            None,
        )
        .await
        .unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deactivated["isActive"], false);

    let (_, property) = app
        .post("/api/properties", &staff, property_body("5 Elm St", 450_000, 3))
        .await
        .unwrap();
    let (_, distances) = app
        .get(
            &format!(
                "/api/properties/{}/shul-distances",
                property["id"].as_str().unwrap()
            ),
            &staff,
        )
        .await
        .unwrap();
    assert!(!distances
        .as_array()
        .unwrap()
        .iter()
        .any(|d| d["shulId"] == shul_id));
}

#[test_log::test(tokio::test)]
#[ignore] // Requires database
async fn test_property_without_coordinates_is_rejected() {
    let app = TestApp::new().await.unwrap();
    let staff = StaffFixture::coordinator(&app.config).unwrap();

    let mut body = property_body("9 Pine Rd", 400_000, 3);
    body["address"]["latitude"] = Value::Null;
    body["address"]["longitude"] = Value::Null;
    let (_, property) = app.post("/api/properties", &staff, body).await.unwrap();

    let (status, _) = app
        .get(
            &format!(
                "/api/properties/{}/shul-distances",
                property["id"].as_str().unwrap()
            ),
            &staff,
        )
        .await
        .unwrap();
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
