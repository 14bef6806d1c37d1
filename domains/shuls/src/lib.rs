//! Shuls domain: synagogue directory and walking distances from properties

pub mod api;
pub mod domain;
pub mod repository;

// Re-export domain types at the crate root for convenience
pub use domain::distance::{
    haversine_miles, resolve_distances, walking_distance, PropertyShulDistance, ShulDistance,
};
pub use domain::entities::{Shul, ShulInfo};

// Re-export repository types
pub use repository::ShulsRepositories;

// Re-export API types
pub use api::routes;
pub use api::ShulsState;
