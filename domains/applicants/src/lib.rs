//! Applicants domain: applicants, housing searches, documents, stage requirements, dashboard

pub mod api;
pub mod domain;
pub mod repository;

// Re-export domain types at the crate root for convenience
pub use domain::documents::{ApplicantDocument, DocumentType, StageTransitionRequirement};
pub use domain::entities::{
    Applicant, ApplicantStatus, BoardDecision, BoardReview, Child, SpouseInfo,
};
pub use domain::housing::{HousingSearch, HousingSearchStage};
pub use domain::requirements::{StageRequirementStatus, StageRequirements};

// Re-export repository types
pub use repository::ApplicantsRepositories;

// Re-export API types
pub use api::routes;
pub use api::ApplicantsState;
