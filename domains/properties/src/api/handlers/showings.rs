//! Showing handlers
//!
//! Booking, completing and cancelling a showing also moves its match. The
//! match row is locked before the showing row in every handler.

use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use relocrm_activity::{
    record_activity_tx, record_audit_tx, EntityType, NewActivity, NewAuditEntry,
};
use relocrm_auth::AuthContext;
use relocrm_common::{
    parse_optional, Error, PageRequest, PagedResult, Path, Query, Result, ValidatedJson,
};
use serde::Deserialize;
use serde_json::json;
use sqlx::{Postgres, Transaction};
use uuid::Uuid;
use validator::Validate;

use super::matches::{lock_match, save_match_change};
use crate::api::middleware::{AuthUser, PropertiesState};
use crate::domain::matches::{MatchDetail, MatchStatus};
use crate::domain::showings::Showing;
use crate::repository::{
    find_showing_for_update_tx, insert_showing_tx, update_showing_tx, ShowingFilter,
};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateShowingRequest {
    /// Match the showing belongs to
    pub property_match_id: Uuid,
    /// Start time (UTC)
    pub scheduled_at: DateTime<Utc>,
    /// Length in minutes (5-480, default 30)
    pub duration_minutes: Option<i32>,

    /// Free-form notes (max 4000 chars)
    #[validate(length(max = 4000))]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RescheduleRequest {
    /// New start time; must differ from the current one
    pub scheduled_at: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct CompleteShowingRequest {
    /// Family feedback (max 4000 chars)
    #[validate(length(max = 4000))]
    pub feedback: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct CancelShowingRequest {
    /// Appended to the showing notes
    #[validate(length(max = 1000))]
    pub reason: Option<String>,
}

/// Query filters for `GET /api/showings`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowingQuery {
    pub status: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub property_match_id: Option<Uuid>,
}

impl ShowingQuery {
    fn into_filter(self) -> Result<ShowingFilter> {
        if let (Some(from), Some(to)) = (self.from, self.to) {
            if from > to {
                return Err(Error::validation("from cannot be after to"));
            }
        }
        Ok(ShowingFilter {
            status: parse_optional(self.status.as_deref())?,
            from: self.from,
            to: self.to,
            property_match_id: self.property_match_id,
        })
    }
}

fn format_time(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M UTC").to_string()
}

fn showing_activity(
    showing: &Showing,
    detail: &MatchDetail,
    action: &str,
    what: &str,
) -> NewActivity {
    NewActivity::new(EntityType::Showing, showing.id, action, detail.describe(what))
        .for_applicant(Some(detail.applicant_id))
}

/// Lock a showing together with its match, match first
async fn lock_showing(
    state: &PropertiesState,
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
) -> Result<(Showing, MatchDetail)> {
    let match_id = state
        .repos
        .showings
        .find(id)
        .await?
        .ok_or_else(|| Error::not_found("Showing", id))?
        .property_match_id;
    let detail = lock_match(tx, match_id).await?;
    let showing = find_showing_for_update_tx(tx, id)
        .await?
        .ok_or_else(|| Error::not_found("Showing", id))?;
    Ok((showing, detail))
}

/// Persist a changed showing with its audit diff and activity entry
async fn save_showing_change(
    tx: &mut Transaction<'_, Postgres>,
    ctx: &AuthContext,
    before: &Showing,
    showing: &Showing,
    activity: NewActivity,
) -> Result<Showing> {
    let showing = update_showing_tx(tx, showing).await?;
    record_audit_tx(
        tx,
        NewAuditEntry::updated(EntityType::Showing, showing.id, before, &showing)?.by(ctx),
    )
    .await?;
    record_activity_tx(tx, activity.by(ctx)).await?;
    Ok(showing)
}

/// Move the match when it is still `ShowingScheduled`. A match that moved
/// on through another showing is left alone.
async fn settle_match(
    tx: &mut Transaction<'_, Postgres>,
    ctx: &AuthContext,
    detail: &mut MatchDetail,
    next: MatchStatus,
) -> Result<()> {
    if detail.property_match.status != MatchStatus::ShowingScheduled {
        return Ok(());
    }
    let before = detail.property_match.clone();
    let previous = detail.property_match.change_status(next)?;
    let activity = NewActivity::new(
        EntityType::PropertyMatch,
        before.id,
        "StatusChanged",
        detail.describe(&format!("Match moved from {} to {}", previous, next)),
    )
    .for_applicant(Some(detail.applicant_id))
    .with_metadata(json!({ "fromStatus": previous, "toStatus": next }));
    save_match_change(tx, ctx, &before, detail, activity).await
}

/// Book a showing. The match moves to `ShowingScheduled`.
///
/// **POST /api/showings**
pub async fn create_showing(
    AuthUser(ctx): AuthUser,
    State(state): State<PropertiesState>,
    ValidatedJson(req): ValidatedJson<CreateShowingRequest>,
) -> Result<(StatusCode, Json<Showing>)> {
    let mut tx = state.repos.begin().await?;
    let mut detail = lock_match(&mut tx, req.property_match_id).await?;
    let before_match = detail.property_match.clone();

    let showing = Showing::new(
        detail.property_match.id,
        req.scheduled_at,
        req.duration_minutes,
        req.notes,
        Some(ctx.user_id()),
    )?;
    let previous = detail.property_match.schedule_showing()?;

    let showing = insert_showing_tx(&mut tx, &showing).await?;
    record_audit_tx(
        &mut tx,
        NewAuditEntry::created(EntityType::Showing, showing.id, &showing)?.by(&ctx),
    )
    .await?;
    record_activity_tx(
        &mut tx,
        showing_activity(
            &showing,
            &detail,
            "Scheduled",
            &format!("Showing scheduled on {}", format_time(showing.scheduled_at)),
        )
        .with_metadata(json!({
            "propertyMatchId": detail.property_match.id,
            "scheduledAt": showing.scheduled_at,
            "durationMinutes": showing.duration_minutes,
        }))
        .by(&ctx),
    )
    .await?;

    let activity = NewActivity::new(
        EntityType::PropertyMatch,
        before_match.id,
        "StatusChanged",
        detail.describe(&format!(
            "Match moved from {} to {}",
            previous,
            MatchStatus::ShowingScheduled
        )),
    )
    .for_applicant(Some(detail.applicant_id))
    .with_metadata(json!({
        "fromStatus": previous,
        "toStatus": MatchStatus::ShowingScheduled,
    }));
    save_match_change(&mut tx, &ctx, &before_match, &mut detail, activity).await?;
    tx.commit().await?;

    tracing::info!(
        showing_id = %showing.id,
        match_id = %detail.property_match.id,
        scheduled_at = %showing.scheduled_at,
        "Showing scheduled"
    );
    Ok((StatusCode::CREATED, Json(showing)))
}

/// **GET /api/showings**
pub async fn list_showings(
    AuthUser(_ctx): AuthUser,
    State(state): State<PropertiesState>,
    Query(page): Query<PageRequest>,
    Query(query): Query<ShowingQuery>,
) -> Result<Json<PagedResult<Showing>>> {
    let filter = query.into_filter()?;
    let (showings, total) = state.repos.showings.list(&filter, &page).await?;
    Ok(Json(PagedResult::new(showings, total, &page)))
}

/// **GET /api/showings/{id}**
pub async fn get_showing(
    AuthUser(_ctx): AuthUser,
    State(state): State<PropertiesState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Showing>> {
    let showing = state
        .repos
        .showings
        .find(id)
        .await?
        .ok_or_else(|| Error::not_found("Showing", id))?;
    Ok(Json(showing))
}

/// **PUT /api/showings/{id}/reschedule**
pub async fn reschedule_showing(
    AuthUser(ctx): AuthUser,
    State(state): State<PropertiesState>,
    Path(id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<RescheduleRequest>,
) -> Result<Json<Showing>> {
    let mut tx = state.repos.begin().await?;
    let (mut showing, detail) = lock_showing(&state, &mut tx, id).await?;
    let before = showing.clone();

    let previous = showing.reschedule(req.scheduled_at)?;
    let activity = showing_activity(
        &showing,
        &detail,
        "Rescheduled",
        &format!(
            "Showing rescheduled from {} to {}",
            format_time(previous),
            format_time(showing.scheduled_at)
        ),
    )
    .with_metadata(json!({ "from": previous, "to": showing.scheduled_at }));
    let showing = save_showing_change(&mut tx, &ctx, &before, &showing, activity).await?;
    tx.commit().await?;

    Ok(Json(showing))
}

/// Record the visit. The match moves to `ShowingCompleted`.
///
/// **PUT /api/showings/{id}/complete**
pub async fn complete_showing(
    AuthUser(ctx): AuthUser,
    State(state): State<PropertiesState>,
    Path(id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<CompleteShowingRequest>,
) -> Result<Json<Showing>> {
    let mut tx = state.repos.begin().await?;
    let (mut showing, mut detail) = lock_showing(&state, &mut tx, id).await?;
    let before = showing.clone();

    showing.complete(req.feedback)?;
    let activity = showing_activity(&showing, &detail, "Completed", "Showing completed")
        .with_metadata(json!({ "feedback": showing.feedback }));
    let showing = save_showing_change(&mut tx, &ctx, &before, &showing, activity).await?;
    settle_match(&mut tx, &ctx, &mut detail, MatchStatus::ShowingCompleted).await?;
    tx.commit().await?;

    Ok(Json(showing))
}

/// **PUT /api/showings/{id}/cancel**
pub async fn cancel_showing(
    AuthUser(ctx): AuthUser,
    State(state): State<PropertiesState>,
    Path(id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<CancelShowingRequest>,
) -> Result<Json<Showing>> {
    let mut tx = state.repos.begin().await?;
    let (mut showing, mut detail) = lock_showing(&state, &mut tx, id).await?;
    let before = showing.clone();

    showing.cancel(req.reason.as_deref())?;
    let activity = showing_activity(&showing, &detail, "Cancelled", "Showing cancelled")
        .with_metadata(json!({ "reason": req.reason }));
    let showing = save_showing_change(&mut tx, &ctx, &before, &showing, activity).await?;
    settle_match(&mut tx, &ctx, &mut detail, MatchStatus::ShowingRequested).await?;
    tx.commit().await?;

    Ok(Json(showing))
}

/// **PUT /api/showings/{id}/no-show**
pub async fn mark_no_show(
    AuthUser(ctx): AuthUser,
    State(state): State<PropertiesState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Showing>> {
    let mut tx = state.repos.begin().await?;
    let (mut showing, mut detail) = lock_showing(&state, &mut tx, id).await?;
    let before = showing.clone();

    showing.mark_no_show()?;
    let activity = showing_activity(&showing, &detail, "NoShow", "Showing marked as no-show");
    let showing = save_showing_change(&mut tx, &ctx, &before, &showing, activity).await?;
    settle_match(&mut tx, &ctx, &mut detail, MatchStatus::ShowingRequested).await?;
    tx.commit().await?;

    Ok(Json(showing))
}
