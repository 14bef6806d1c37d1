//! Transactional free functions for the Reminders domain

use relocrm_common::Result;
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use super::reminders::REMINDER_COLUMNS;
use crate::domain::entities::FollowUpReminder;

pub async fn find_reminder_for_update_tx(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
) -> Result<Option<FollowUpReminder>> {
    let query =
        format!("SELECT {REMINDER_COLUMNS} FROM follow_up_reminders WHERE id = $1 FOR UPDATE");
    let reminder = sqlx::query_as::<_, FollowUpReminder>(&query)
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?;

    Ok(reminder)
}

pub async fn insert_reminder_tx(
    tx: &mut Transaction<'_, Postgres>,
    reminder: &FollowUpReminder,
) -> Result<FollowUpReminder> {
    let query = format!(
        "INSERT INTO follow_up_reminders ({REMINDER_COLUMNS}) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17) \
         RETURNING {REMINDER_COLUMNS}"
    );
    let created = sqlx::query_as::<_, FollowUpReminder>(&query)
        .bind(reminder.id)
        .bind(&reminder.title)
        .bind(&reminder.description)
        .bind(reminder.due_at)
        .bind(reminder.priority)
        .bind(reminder.status)
        .bind(reminder.assigned_to)
        .bind(reminder.applicant_id)
        .bind(reminder.entity_type)
        .bind(reminder.entity_id)
        .bind(reminder.source_activity_id)
        .bind(reminder.snoozed_until)
        .bind(reminder.completed_at)
        .bind(reminder.completed_by)
        .bind(reminder.created_by)
        .bind(reminder.created_at)
        .bind(reminder.updated_at)
        .fetch_one(&mut **tx)
        .await?;

    Ok(created)
}

pub async fn update_reminder_tx(
    tx: &mut Transaction<'_, Postgres>,
    reminder: &FollowUpReminder,
) -> Result<FollowUpReminder> {
    let query = format!(
        "UPDATE follow_up_reminders SET \
            title = $2, description = $3, due_at = $4, priority = $5, status = $6, \
            assigned_to = $7, applicant_id = $8, entity_type = $9, entity_id = $10, \
            source_activity_id = $11, snoozed_until = $12, completed_at = $13, \
            completed_by = $14, updated_at = $15 \
         WHERE id = $1 \
         RETURNING {REMINDER_COLUMNS}"
    );
    let updated = sqlx::query_as::<_, FollowUpReminder>(&query)
        .bind(reminder.id)
        .bind(&reminder.title)
        .bind(&reminder.description)
        .bind(reminder.due_at)
        .bind(reminder.priority)
        .bind(reminder.status)
        .bind(reminder.assigned_to)
        .bind(reminder.applicant_id)
        .bind(reminder.entity_type)
        .bind(reminder.entity_id)
        .bind(reminder.source_activity_id)
        .bind(reminder.snoozed_until)
        .bind(reminder.completed_at)
        .bind(reminder.completed_by)
        .bind(reminder.updated_at)
        .fetch_one(&mut **tx)
        .await?;

    Ok(updated)
}
