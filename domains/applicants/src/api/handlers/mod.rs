//! HTTP handlers for the Applicants domain

pub mod applicants;
pub mod dashboard;
pub mod document_types;
pub mod documents;
pub mod housing_searches;
pub mod stage_requirements;
