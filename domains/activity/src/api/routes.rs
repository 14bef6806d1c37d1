//! Route definitions for Activity domain API

use axum::{routing::get, Router};

use super::handlers::{activity, audit};
use super::middleware::ActivityState;

/// Create all Activity domain API routes
pub fn routes() -> Router<ActivityState> {
    Router::new()
        .route("/api/activity", get(activity::list_activity))
        .route(
            "/api/applicants/{id}/activity",
            get(activity::list_applicant_activity),
        )
        .route("/api/audit-logs", get(audit::list_audit_logs))
}
