//! Shared utilities, configuration, and error handling for the relocation CRM
//!
//! This crate provides common functionality used across every domain crate:
//! - Configuration management following 12-factor principles
//! - Error types and the global error-to-HTTP mapping
//! - Pagination and request extractors
//! - Shared value objects and state machine helpers

pub mod address;
pub mod config;
pub mod db;
pub mod enums;
pub mod error;
pub mod extractors;
pub mod pagination;
pub mod state;
pub mod upload;

pub use address::Address;
pub use db::RepositoryError;
pub use enums::parse_optional;
pub use error::{Error, Result};
pub use extractors::{Path, Query, ValidatedJson};
pub use pagination::{PageRequest, PagedResult};
pub use state::{StateError, StateMachine};
pub use upload::{MultipartForm, UploadedFile};
