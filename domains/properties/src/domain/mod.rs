//! Domain layer for the Properties domain

pub mod entities;
pub mod matches;
pub mod photos;
pub mod showings;
pub mod state;
