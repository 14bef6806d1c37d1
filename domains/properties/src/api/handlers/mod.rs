//! HTTP handlers for the Properties domain

pub mod matches;
pub mod photos;
pub mod properties;
pub mod showings;
