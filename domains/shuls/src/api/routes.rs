//! Route definitions for Shuls domain API

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{distances, shuls};
use super::middleware::ShulsState;

/// Create all Shuls domain API routes
pub fn routes() -> Router<ShulsState> {
    Router::new()
        .route("/api/shuls", get(shuls::list_shuls).post(shuls::create_shul))
        .route(
            "/api/shuls/{id}",
            get(shuls::get_shul).put(shuls::update_shul),
        )
        .route("/api/shuls/{id}/deactivate", post(shuls::deactivate_shul))
        .route("/api/shuls/{id}/reactivate", post(shuls::reactivate_shul))
        .route(
            "/api/properties/{id}/shul-distances",
            get(distances::get_distances),
        )
        .route(
            "/api/properties/{id}/shul-distances/recalculate",
            post(distances::recalculate_distances),
        )
}
