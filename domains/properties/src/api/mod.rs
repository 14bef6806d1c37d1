//! API layer for the Properties domain

pub mod handlers;
pub mod middleware;
pub mod routes;

pub use middleware::PropertiesState;
pub use routes::routes;
