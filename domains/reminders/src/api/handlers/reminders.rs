//! Follow-up reminder handlers
//!
//! Anyone may act on an unassigned reminder. An assigned one is changed by
//! its assignee, its creator or an admin.

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

use crate::api::middleware::{AuthUser, RemindersState};
use crate::domain::entities::{FollowUpReminder, ReminderInfo};
use crate::domain::summary::{ReminderSummary, SummaryWindow};
use crate::repository::{
    find_reminder_for_update_tx, insert_reminder_tx, update_reminder_tx, ReminderFilter,
};

/// Query filters for `GET /api/reminders`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderQuery {
    pub status: Option<String>,
    pub assigned_to: Option<Uuid>,
    /// Only reminders assigned to the caller; wins over `assignedTo`
    pub mine: Option<bool>,
    pub applicant_id: Option<Uuid>,
    pub priority: Option<String>,
    /// Effective due time (snooze included) before this instant
    pub due_before: Option<DateTime<Utc>>,
    /// Only open reminders already past due
    pub overdue_only: Option<bool>,
}

impl ReminderQuery {
    /// `mine` takes precedence over `assignedTo`
    fn into_filter(self, user_id: Uuid, now: DateTime<Utc>) -> Result<ReminderFilter> {
        let assigned_to = if self.mine.unwrap_or(false) {
            Some(user_id)
        } else {
            self.assigned_to
        };
        Ok(ReminderFilter {
            status: parse_optional(self.status.as_deref())?,
            assigned_to,
            applicant_id: self.applicant_id,
            priority: parse_optional(self.priority.as_deref())?,
            due_before: self.due_before,
            overdue_at: self.overdue_only.unwrap_or(false).then_some(now),
        })
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct SnoozeRequest {
    /// New due time, in the future
    pub until: DateTime<Utc>,
}

fn ensure_can_act(ctx: &AuthContext, reminder: &FollowUpReminder) -> Result<()> {
    if reminder.assigned_to.is_none() {
        return Ok(());
    }
    ctx.require_admin_or(&[reminder.assigned_to, reminder.created_by])
}

async fn lock_reminder(
    tx: &mut Transaction<'_, Postgres>,
    ctx: &AuthContext,
    id: Uuid,
) -> Result<FollowUpReminder> {
    let reminder = find_reminder_for_update_tx(tx, id)
        .await?
        .ok_or_else(|| Error::not_found("FollowUpReminder", id))?;
    ensure_can_act(ctx, &reminder)?;
    Ok(reminder)
}

fn reminder_activity(reminder: &FollowUpReminder, action: &str, description: String) -> NewActivity {
    NewActivity::new(EntityType::FollowUpReminder, reminder.id, action, description)
        .for_applicant(reminder.applicant_id)
}

/// Persist a changed reminder with its audit diff and activity entry
async fn save_reminder_change(
    tx: &mut Transaction<'_, Postgres>,
    ctx: &AuthContext,
    before: &FollowUpReminder,
    reminder: &FollowUpReminder,
    action: &str,
    description: String,
) -> Result<FollowUpReminder> {
    let reminder = update_reminder_tx(tx, reminder).await?;
    record_audit_tx(
        tx,
        NewAuditEntry::updated(EntityType::FollowUpReminder, reminder.id, before, &reminder)?
            .by(ctx),
    )
    .await?;
    record_activity_tx(
        tx,
        reminder_activity(&reminder, action, description)
            .with_metadata(json!({ "fromStatus": before.status, "toStatus": reminder.status }))
            .by(ctx),
    )
    .await?;
    Ok(reminder)
}

/// Create a reminder. Without an assignee it is assigned to the caller.
///
/// **POST /api/reminders**
pub async fn create_reminder(
    AuthUser(ctx): AuthUser,
    State(state): State<RemindersState>,
    ValidatedJson(mut req): ValidatedJson<ReminderInfo>,
) -> Result<(StatusCode, Json<FollowUpReminder>)> {
    req.assigned_to = req.assigned_to.or(Some(ctx.user_id()));
    let reminder = FollowUpReminder::new(req, Some(ctx.user_id()))?;

    let mut tx = state.repos.begin().await?;
    let reminder = insert_reminder_tx(&mut tx, &reminder).await?;
    record_audit_tx(
        &mut tx,
        NewAuditEntry::created(EntityType::FollowUpReminder, reminder.id, &reminder)?.by(&ctx),
    )
    .await?;
    record_activity_tx(
        &mut tx,
        reminder_activity(
            &reminder,
            "Created",
            format!("Reminder created: {}", reminder.title),
        )
        .with_metadata(json!({
            "dueAt": reminder.due_at,
            "priority": reminder.priority,
            "assignedTo": reminder.assigned_to,
        }))
        .by(&ctx),
    )
    .await?;
    tx.commit().await?;

    tracing::info!(reminder_id = %reminder.id, user_id = %ctx.user_id(), "Reminder created");
    Ok((StatusCode::CREATED, Json(reminder)))
}

/// **GET /api/reminders**
pub async fn list_reminders(
    AuthUser(ctx): AuthUser,
    State(state): State<RemindersState>,
    Query(page): Query<PageRequest>,
    Query(query): Query<ReminderQuery>,
) -> Result<Json<PagedResult<FollowUpReminder>>> {
    let filter = query.into_filter(ctx.user_id(), Utc::now())?;
    let (reminders, total) = state.repos.reminders.list(&filter, &page).await?;
    Ok(Json(PagedResult::new(reminders, total, &page)))
}

/// **GET /api/reminders/{id}**
pub async fn get_reminder(
    AuthUser(_ctx): AuthUser,
    State(state): State<RemindersState>,
    Path(id): Path<Uuid>,
) -> Result<Json<FollowUpReminder>> {
    let reminder = state
        .repos
        .reminders
        .find(id)
        .await?
        .ok_or_else(|| Error::not_found("FollowUpReminder", id))?;
    Ok(Json(reminder))
}

/// **PUT /api/reminders/{id}**
pub async fn update_reminder(
    AuthUser(ctx): AuthUser,
    State(state): State<RemindersState>,
    Path(id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<ReminderInfo>,
) -> Result<Json<FollowUpReminder>> {
    let mut tx = state.repos.begin().await?;
    let mut reminder = lock_reminder(&mut tx, &ctx, id).await?;
    let before = reminder.clone();

    reminder.update_info(req)?;
    let description = format!("Reminder updated: {}", reminder.title);
    let reminder =
        save_reminder_change(&mut tx, &ctx, &before, &reminder, "Updated", description).await?;
    tx.commit().await?;

    Ok(Json(reminder))
}

/// **POST /api/reminders/{id}/complete**
pub async fn complete_reminder(
    AuthUser(ctx): AuthUser,
    State(state): State<RemindersState>,
    Path(id): Path<Uuid>,
) -> Result<Json<FollowUpReminder>> {
    let mut tx = state.repos.begin().await?;
    let mut reminder = lock_reminder(&mut tx, &ctx, id).await?;
    let before = reminder.clone();

    reminder.complete(ctx.user_id())?;
    let description = format!("Reminder completed: {}", reminder.title);
    let reminder =
        save_reminder_change(&mut tx, &ctx, &before, &reminder, "Completed", description).await?;
    tx.commit().await?;

    Ok(Json(reminder))
}

/// Hide a reminder until a future time
///
/// **POST /api/reminders/{id}/snooze**
pub async fn snooze_reminder(
    AuthUser(ctx): AuthUser,
    State(state): State<RemindersState>,
    Path(id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<SnoozeRequest>,
) -> Result<Json<FollowUpReminder>> {
    let mut tx = state.repos.begin().await?;
    let mut reminder = lock_reminder(&mut tx, &ctx, id).await?;
    let before = reminder.clone();

    reminder.snooze(req.until)?;
    let description = format!(
        "Reminder snoozed until {}: {}",
        req.until.format("%Y-%m-%d %H:%M UTC"),
        reminder.title
    );
    let reminder =
        save_reminder_change(&mut tx, &ctx, &before, &reminder, "Snoozed", description).await?;
    tx.commit().await?;

    Ok(Json(reminder))
}

/// **POST /api/reminders/{id}/dismiss**
pub async fn dismiss_reminder(
    AuthUser(ctx): AuthUser,
    State(state): State<RemindersState>,
    Path(id): Path<Uuid>,
) -> Result<Json<FollowUpReminder>> {
    let mut tx = state.repos.begin().await?;
    let mut reminder = lock_reminder(&mut tx, &ctx, id).await?;
    let before = reminder.clone();

    reminder.dismiss()?;
    let description = format!("Reminder dismissed: {}", reminder.title);
    let reminder =
        save_reminder_change(&mut tx, &ctx, &before, &reminder, "Dismissed", description).await?;
    tx.commit().await?;

    Ok(Json(reminder))
}

/// **POST /api/reminders/{id}/reopen**
pub async fn reopen_reminder(
    AuthUser(ctx): AuthUser,
    State(state): State<RemindersState>,
    Path(id): Path<Uuid>,
) -> Result<Json<FollowUpReminder>> {
    let mut tx = state.repos.begin().await?;
    let mut reminder = lock_reminder(&mut tx, &ctx, id).await?;
    let before = reminder.clone();

    reminder.reopen()?;
    let description = format!("Reminder reopened: {}", reminder.title);
    let reminder =
        save_reminder_change(&mut tx, &ctx, &before, &reminder, "Reopened", description).await?;
    tx.commit().await?;

    Ok(Json(reminder))
}

/// Counts of the caller's reminders
///
/// **GET /api/reminders/summary**
pub async fn get_summary(
    AuthUser(ctx): AuthUser,
    State(state): State<RemindersState>,
) -> Result<Json<ReminderSummary>> {
    let window = SummaryWindow::at(Utc::now());
    let summary = state
        .repos
        .reminders
        .summary_for(ctx.user_id(), &window)
        .await?;
    Ok(Json(summary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{ReminderPriority, ReminderStatus};

    #[test]
    fn test_mine_overrides_assigned_to() {
        let me = Uuid::new_v4();
        let filter = ReminderQuery {
            assigned_to: Some(Uuid::new_v4()),
            mine: Some(true),
            ..ReminderQuery::default()
        }
        .into_filter(me, Utc::now())
        .unwrap();
        assert_eq!(filter.assigned_to, Some(me));
    }

    #[test]
    fn test_overdue_only_sets_cutoff() {
        let now = Utc::now();
        let filter = ReminderQuery {
            overdue_only: Some(true),
            status: Some("snoozed".to_string()),
            priority: Some("URGENT".to_string()),
            ..ReminderQuery::default()
        }
        .into_filter(Uuid::new_v4(), now)
        .unwrap();
        assert_eq!(filter.overdue_at, Some(now));
        assert_eq!(filter.status, Some(ReminderStatus::Snoozed));
        assert_eq!(filter.priority, Some(ReminderPriority::Urgent));
    }

    #[test]
    fn test_unknown_priority_rejected() {
        let result = ReminderQuery {
            priority: Some("Someday".to_string()),
            ..ReminderQuery::default()
        }
        .into_filter(Uuid::new_v4(), Utc::now());
        assert!(matches!(result, Err(Error::Validation(_))));
    }
}
