//! Domain layer for the Reminders domain

pub mod entities;
pub mod state;
pub mod summary;
