//! API layer for the Reminders domain

pub mod handlers;
pub mod middleware;
pub mod routes;

pub use middleware::RemindersState;
pub use routes::routes;
