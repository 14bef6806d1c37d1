//! Shul directory handlers

use axum::{extract::State, http::StatusCode, Json};
use relocrm_activity::{
    record_activity_tx, record_audit_tx, EntityType, NewActivity, NewAuditEntry,
};
use relocrm_auth::AuthContext;
use relocrm_common::{Error, PageRequest, PagedResult, Path, Query, Result, ValidatedJson};
use serde::Deserialize;
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::api::middleware::{AuthUser, ShulsState};
use crate::domain::entities::{Shul, ShulInfo};
use crate::repository::{
    clear_shul_distances_tx, find_shul_for_update_tx, insert_shul_tx, update_shul_tx, ShulFilter,
};

/// Query filters for `GET /api/shuls`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShulQuery {
    pub include_inactive: Option<bool>,
    pub search: Option<String>,
}

impl From<ShulQuery> for ShulFilter {
    fn from(query: ShulQuery) -> Self {
        ShulFilter {
            include_inactive: query.include_inactive.unwrap_or(false),
            search: query
                .search
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
        }
    }
}

async fn lock_shul(tx: &mut Transaction<'_, Postgres>, id: Uuid) -> Result<Shul> {
    find_shul_for_update_tx(tx, id)
        .await?
        .ok_or_else(|| Error::not_found("Shul", id))
}

async fn log_shul_change(
    tx: &mut Transaction<'_, Postgres>,
    ctx: &AuthContext,
    before: &Shul,
    after: &Shul,
    action: &str,
    description: String,
) -> Result<()> {
    record_audit_tx(
        tx,
        NewAuditEntry::updated(EntityType::Shul, after.id, before, after)?.by(ctx),
    )
    .await?;
    record_activity_tx(
        tx,
        NewActivity::new(EntityType::Shul, after.id, action, description).by(ctx),
    )
    .await?;
    Ok(())
}

/// **POST /api/shuls**
pub async fn create_shul(
    AuthUser(ctx): AuthUser,
    State(state): State<ShulsState>,
    ValidatedJson(req): ValidatedJson<ShulInfo>,
) -> Result<(StatusCode, Json<Shul>)> {
    let shul = Shul::new(req);

    let mut tx = state.repos.begin().await?;
    let shul = insert_shul_tx(&mut tx, &shul).await?;
    record_audit_tx(
        &mut tx,
        NewAuditEntry::created(EntityType::Shul, shul.id, &shul)?.by(&ctx),
    )
    .await?;
    record_activity_tx(
        &mut tx,
        NewActivity::new(
            EntityType::Shul,
            shul.id,
            "Created",
            format!("Shul added: {}", shul.name),
        )
        .by(&ctx),
    )
    .await?;
    tx.commit().await?;

    tracing::info!(shul_id = %shul.id, geocoded = shul.coordinates().is_some(), "Shul created");
    Ok((StatusCode::CREATED, Json(shul)))
}

/// **GET /api/shuls**
pub async fn list_shuls(
    AuthUser(_ctx): AuthUser,
    State(state): State<ShulsState>,
    Query(page): Query<PageRequest>,
    Query(query): Query<ShulQuery>,
) -> Result<Json<PagedResult<Shul>>> {
    let (shuls, total) = state.repos.shuls.list(&query.into(), &page).await?;
    Ok(Json(PagedResult::new(shuls, total, &page)))
}

/// **GET /api/shuls/{id}**
pub async fn get_shul(
    AuthUser(_ctx): AuthUser,
    State(state): State<ShulsState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Shul>> {
    let shul = state
        .repos
        .shuls
        .find(id)
        .await?
        .ok_or_else(|| Error::not_found("Shul", id))?;
    Ok(Json(shul))
}

/// Replace the shul details. Moving the shul drops its cached distances.
///
/// **PUT /api/shuls/{id}**
pub async fn update_shul(
    AuthUser(ctx): AuthUser,
    State(state): State<ShulsState>,
    Path(id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<ShulInfo>,
) -> Result<Json<Shul>> {
    let mut tx = state.repos.begin().await?;
    let mut shul = lock_shul(&mut tx, id).await?;
    let before = shul.clone();

    let moved = shul.update_info(req);
    let shul = update_shul_tx(&mut tx, &shul).await?;
    if moved {
        let cleared = clear_shul_distances_tx(&mut tx, id).await?;
        tracing::debug!(shul_id = %id, cleared, "Cleared distances after shul move");
    }
    let description = format!("Shul updated: {}", shul.name);
    log_shul_change(&mut tx, &ctx, &before, &shul, "Updated", description).await?;
    tx.commit().await?;

    Ok(Json(shul))
}

/// **POST /api/shuls/{id}/deactivate**
pub async fn deactivate_shul(
    AuthUser(ctx): AuthUser,
    State(state): State<ShulsState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Shul>> {
    let mut tx = state.repos.begin().await?;
    let mut shul = lock_shul(&mut tx, id).await?;
    let before = shul.clone();

    if !shul.deactivate() {
        return Ok(Json(shul));
    }
    let shul = update_shul_tx(&mut tx, &shul).await?;
    let description = format!("Shul deactivated: {}", shul.name);
    log_shul_change(&mut tx, &ctx, &before, &shul, "Deactivated", description).await?;
    tx.commit().await?;

    Ok(Json(shul))
}

/// **POST /api/shuls/{id}/reactivate**
pub async fn reactivate_shul(
    AuthUser(ctx): AuthUser,
    State(state): State<ShulsState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Shul>> {
    let mut tx = state.repos.begin().await?;
    let mut shul = lock_shul(&mut tx, id).await?;
    let before = shul.clone();

    if !shul.reactivate() {
        return Ok(Json(shul));
    }
    let shul = update_shul_tx(&mut tx, &shul).await?;
    let description = format!("Shul reactivated: {}", shul.name);
    log_shul_change(&mut tx, &ctx, &before, &shul, "Reactivated", description).await?;
    tx.commit().await?;

    Ok(Json(shul))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_defaults_to_active_only() {
        let filter: ShulFilter = ShulQuery::default().into();
        assert!(!filter.include_inactive);
        assert!(filter.search.is_none());
    }

    #[test]
    fn test_blank_search_is_ignored() {
        let filter: ShulFilter = ShulQuery {
            include_inactive: Some(true),
            search: Some("   ".to_string()),
        }
        .into();
        assert!(filter.include_inactive);
        assert!(filter.search.is_none());
    }
}
