//! Dashboard statistics handler

use axum::{extract::State, Json};
use relocrm_common::Result;

use crate::api::middleware::{ApplicantsState, AuthUser};
use crate::domain::dashboard::DashboardStats;

/// Headline counts across applicants, searches, properties, showings and reminders
///
/// **GET /api/dashboard/stats**
pub async fn get_stats(
    AuthUser(_ctx): AuthUser,
    State(state): State<ApplicantsState>,
) -> Result<Json<DashboardStats>> {
    let stats = state.repos.dashboard.stats().await?;
    Ok(Json(stats))
}
