//! Audit log API handlers

use axum::{extract::State, Json};
use relocrm_common::{parse_optional, PageRequest, PagedResult, Query, Result};
use serde::Deserialize;
use uuid::Uuid;

use crate::api::middleware::{ActivityState, AuthUser};
use crate::domain::entities::AuditLogEntry;
use crate::repository::AuditFilter;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditQuery {
    pub entity_type: Option<String>,
    pub entity_id: Option<Uuid>,
}

/// List audit entries, newest first
pub async fn list_audit_logs(
    AuthUser(_ctx): AuthUser,
    State(state): State<ActivityState>,
    Query(page): Query<PageRequest>,
    Query(query): Query<AuditQuery>,
) -> Result<Json<PagedResult<AuditLogEntry>>> {
    let filter = AuditFilter {
        entity_type: parse_optional(query.entity_type.as_deref())?,
        entity_id: query.entity_id,
    };
    let (rows, total) = state.repos.audit.list(&filter, &page).await?;
    Ok(Json(PagedResult::new(rows, total, &page)))
}
