//! HTTP handlers for the Activity domain

pub mod activity;
pub mod audit;
