//! HTTP handlers for the Shuls domain

pub mod distances;
pub mod shuls;
