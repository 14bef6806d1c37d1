//! Domain layer for the Applicants domain

pub mod dashboard;
pub mod documents;
pub mod entities;
pub mod housing;
pub mod requirements;
pub mod state;
