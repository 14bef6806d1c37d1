//! Reminders domain: follow-up reminders for staff

pub mod api;
pub mod domain;
pub mod repository;

// Re-export domain types at the crate root for convenience
pub use domain::entities::{FollowUpReminder, ReminderInfo, ReminderPriority, ReminderStatus};
pub use domain::summary::{ReminderSummary, SummaryWindow};

// Re-export repository types
pub use repository::RemindersRepositories;

// Re-export API types
pub use api::routes;
pub use api::RemindersState;
