//! Route definitions for Properties domain API

use axum::{
    routing::{get, post, put},
    Router,
};

use super::handlers::{matches, photos, properties, showings};
use super::middleware::PropertiesState;

/// Create all Properties domain API routes
pub fn routes() -> Router<PropertiesState> {
    Router::new()
        // Properties
        .route(
            "/api/properties",
            get(properties::list_properties).post(properties::create_property),
        )
        .route(
            "/api/properties/{id}",
            get(properties::get_property)
                .put(properties::update_property)
                .delete(properties::delete_property),
        )
        .route("/api/properties/{id}/status", put(properties::change_status))
        // Photos
        .route(
            "/api/properties/{id}/photos",
            get(photos::list_photos).post(photos::upload_photo),
        )
        .route("/api/properties/{id}/photos/order", put(photos::reorder_photos))
        .route(
            "/api/properties/{id}/photos/{photo_id}/primary",
            put(photos::set_primary_photo),
        )
        .route(
            "/api/properties/{id}/photos/{photo_id}",
            axum::routing::delete(photos::delete_photo),
        )
        // Matches
        .route("/api/property-matches", post(matches::create_match))
        .route(
            "/api/property-matches/request-showings",
            post(matches::request_showings),
        )
        .route(
            "/api/property-matches/{id}",
            get(matches::get_match)
                .put(matches::update_match)
                .delete(matches::delete_match),
        )
        .route("/api/property-matches/{id}/status", put(matches::change_status))
        .route("/api/property-matches/{id}/offer", put(matches::make_offer))
        .route(
            "/api/housing-searches/{id}/matches",
            get(matches::list_for_search),
        )
        .route("/api/properties/{id}/matches", get(matches::list_for_property))
        // Showings
        .route(
            "/api/showings",
            get(showings::list_showings).post(showings::create_showing),
        )
        .route("/api/showings/{id}", get(showings::get_showing))
        .route(
            "/api/showings/{id}/reschedule",
            put(showings::reschedule_showing),
        )
        .route("/api/showings/{id}/complete", put(showings::complete_showing))
        .route("/api/showings/{id}/cancel", put(showings::cancel_showing))
        .route("/api/showings/{id}/no-show", put(showings::mark_no_show))
}
