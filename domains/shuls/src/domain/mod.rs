//! Domain layer for the Shuls domain

pub mod distance;
pub mod entities;
