//! Properties domain: listings, photos, property matches, showings

pub mod api;
pub mod domain;
pub mod repository;

// Re-export domain types at the crate root for convenience
pub use domain::entities::{ListingStatus, Property, PropertyType};
pub use domain::matches::{compute_match_score, MatchCriteria, MatchDetail, MatchStatus, PropertyMatch};
pub use domain::photos::{PhotoGallery, PropertyPhoto, MAX_PHOTOS_PER_PROPERTY};
pub use domain::showings::{Showing, ShowingStatus};

// Re-export repository types
pub use repository::PropertiesRepositories;

// Re-export API types
pub use api::routes;
pub use api::PropertiesState;
