//! Activity timeline API handlers

use axum::{extract::State, Json};
use relocrm_common::{parse_optional, Error, PageRequest, PagedResult, Path, Query, Result};
use serde::Deserialize;
use uuid::Uuid;

use crate::api::middleware::{ActivityState, AuthUser};
use crate::domain::entities::ActivityLog;
use crate::repository::ActivityFilter;

/// Query filters for `GET /api/activity`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityQuery {
    pub entity_type: Option<String>,
    pub entity_id: Option<Uuid>,
    pub applicant_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
}

impl ActivityQuery {
    fn into_filter(self) -> Result<ActivityFilter> {
        Ok(ActivityFilter {
            entity_type: parse_optional(self.entity_type.as_deref())?,
            entity_id: self.entity_id,
            applicant_id: self.applicant_id,
            user_id: self.user_id,
        })
    }
}

/// List activity across the system, newest first
pub async fn list_activity(
    AuthUser(_ctx): AuthUser,
    State(state): State<ActivityState>,
    Query(page): Query<PageRequest>,
    Query(query): Query<ActivityQuery>,
) -> Result<Json<PagedResult<ActivityLog>>> {
    let filter = query.into_filter()?;
    let (rows, total) = state.repos.activity.list(&filter, &page).await?;
    Ok(Json(PagedResult::new(rows, total, &page)))
}

/// Timeline for one applicant
pub async fn list_applicant_activity(
    AuthUser(_ctx): AuthUser,
    State(state): State<ActivityState>,
    Path(applicant_id): Path<Uuid>,
    Query(page): Query<PageRequest>,
) -> Result<Json<PagedResult<ActivityLog>>> {
    if !state.repos.activity.applicant_exists(applicant_id).await? {
        return Err(Error::not_found("Applicant", applicant_id));
    }

    let filter = ActivityFilter {
        applicant_id: Some(applicant_id),
        ..ActivityFilter::default()
    };
    let (rows, total) = state.repos.activity.list(&filter, &page).await?;
    Ok(Json(PagedResult::new(rows, total, &page)))
}
