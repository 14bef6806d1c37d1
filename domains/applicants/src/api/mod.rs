//! API layer for the Applicants domain
//!
//! Contains HTTP handlers, routes, and domain state definition.

pub mod handlers;
pub mod middleware;
pub mod routes;

pub use middleware::ApplicantsState;
pub use routes::routes;
