//! Domain layer for activity and audit logging

pub mod diff;
pub mod entities;
