//! HTTP handlers for the Reminders domain

pub mod reminders;
