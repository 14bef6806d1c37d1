//! API layer for the Shuls domain

pub mod handlers;
pub mod middleware;
pub mod routes;

pub use middleware::ShulsState;
pub use routes::routes;
