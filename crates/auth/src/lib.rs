//! Authentication middleware for the relocation CRM API
//!
//! Validates Cognito-issued bearer tokens, resolves the staff user behind
//! them, and exposes axum extractors that work with any domain state
//! implementing `FromRef<S>` for `AuthBackend`.

mod backend;
mod claims;
mod config;
mod context;
mod error;
mod extractors;
mod jwt;
mod types;

pub use backend::AuthBackend;
pub use claims::CognitoClaims;
pub use config::AuthConfig;
pub use context::AuthContext;
pub use error::AuthError;
pub use extractors::{AdminUser, AuthUser};
pub use types::{StaffIdentity, StaffRole};
