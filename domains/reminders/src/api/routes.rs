//! Route definitions for Reminders domain API

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::reminders;
use super::middleware::RemindersState;

/// Create all Reminders domain API routes
pub fn routes() -> Router<RemindersState> {
    Router::new()
        .route(
            "/api/reminders",
            get(reminders::list_reminders).post(reminders::create_reminder),
        )
        .route("/api/reminders/summary", get(reminders::get_summary))
        .route(
            "/api/reminders/{id}",
            get(reminders::get_reminder).put(reminders::update_reminder),
        )
        .route("/api/reminders/{id}/complete", post(reminders::complete_reminder))
        .route("/api/reminders/{id}/snooze", post(reminders::snooze_reminder))
        .route("/api/reminders/{id}/dismiss", post(reminders::dismiss_reminder))
        .route("/api/reminders/{id}/reopen", post(reminders::reopen_reminder))
}
