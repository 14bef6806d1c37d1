//! Activity domain: append-only activity timeline and audit log
//!
//! Other domains write here through `record_activity_tx` / `record_audit_tx`
//! inside their own transactions. Nothing updates or deletes a log row.

pub mod api;
pub mod domain;
pub mod repository;

// Re-export domain types at the crate root for convenience
pub use domain::diff::{diff_snapshots, SnapshotDiff};
pub use domain::entities::{
    ActivityLog, AuditAction, AuditLogEntry, EntityType, NewActivity, NewAuditEntry,
};

// Re-export repository types
pub use repository::{
    record_activity_tx, record_audit_tx, ActivityFilter, ActivityRepositories, AuditFilter,
};

// Re-export API types
pub use api::routes;
pub use api::ActivityState;
