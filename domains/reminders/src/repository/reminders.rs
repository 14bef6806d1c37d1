//! Reminder repository

use chrono::{DateTime, Utc};
use relocrm_common::{PageRequest, Result};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::domain::entities::{FollowUpReminder, ReminderPriority, ReminderStatus};
use crate::domain::summary::{ReminderSummary, SummaryWindow};

/// All columns in the follow_up_reminders table, used for SELECT and RETURNING clauses.
pub(crate) const REMINDER_COLUMNS: &str = "\
    id, title, description, due_at, priority, status, assigned_to, applicant_id, \
    entity_type, entity_id, source_activity_id, snoozed_until, completed_at, completed_by, \
    created_by, created_at, updated_at";

/// `snoozed_until` while snoozed, otherwise `due_at`
const EFFECTIVE_DUE: &str =
    "(CASE WHEN status = 'Snoozed' THEN COALESCE(snoozed_until, due_at) ELSE due_at END)";

#[derive(Debug, Clone, Default)]
pub struct ReminderFilter {
    pub status: Option<ReminderStatus>,
    pub assigned_to: Option<Uuid>,
    pub applicant_id: Option<Uuid>,
    pub priority: Option<ReminderPriority>,
    pub due_before: Option<DateTime<Utc>>,
    /// Open or snoozed reminders whose effective due time is before this instant
    pub overdue_at: Option<DateTime<Utc>>,
}

impl ReminderFilter {
    fn push_where(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        qb.push(" WHERE TRUE");
        if let Some(status) = self.status {
            qb.push(" AND status = ").push_bind(status);
        }
        if let Some(assigned_to) = self.assigned_to {
            qb.push(" AND assigned_to = ").push_bind(assigned_to);
        }
        if let Some(applicant_id) = self.applicant_id {
            qb.push(" AND applicant_id = ").push_bind(applicant_id);
        }
        if let Some(priority) = self.priority {
            qb.push(" AND priority = ").push_bind(priority);
        }
        if let Some(due_before) = self.due_before {
            qb.push(format!(" AND {EFFECTIVE_DUE} < "))
                .push_bind(due_before);
        }
        if let Some(now) = self.overdue_at {
            qb.push(format!(
                " AND status IN ('Open', 'Snoozed') AND {EFFECTIVE_DUE} < "
            ))
            .push_bind(now);
        }
    }
}

#[derive(Clone)]
pub struct ReminderRepository {
    pool: PgPool,
}

impl ReminderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find(&self, id: Uuid) -> Result<Option<FollowUpReminder>> {
        let query = format!("SELECT {REMINDER_COLUMNS} FROM follow_up_reminders WHERE id = $1");
        let reminder = sqlx::query_as::<_, FollowUpReminder>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(reminder)
    }

    /// Soonest effective due time first
    pub async fn list(
        &self,
        filter: &ReminderFilter,
        page: &PageRequest,
    ) -> Result<(Vec<FollowUpReminder>, i64)> {
        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM follow_up_reminders");
        filter.push_where(&mut count);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut query =
            QueryBuilder::new(format!("SELECT {REMINDER_COLUMNS} FROM follow_up_reminders"));
        filter.push_where(&mut query);
        query
            .push(format!(" ORDER BY {EFFECTIVE_DUE} ASC, id ASC LIMIT "))
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());
        let reminders = query
            .build_query_as::<FollowUpReminder>()
            .fetch_all(&self.pool)
            .await?;

        Ok((reminders, total))
    }

    /// Bucket counts of a user's open and snoozed reminders
    pub async fn summary_for(&self, user_id: Uuid, window: &SummaryWindow) -> Result<ReminderSummary> {
        let query = format!(
            "SELECT \
                COUNT(*) FILTER (WHERE {EFFECTIVE_DUE} < $2) AS overdue, \
                COUNT(*) FILTER (WHERE {EFFECTIVE_DUE} >= $2 AND {EFFECTIVE_DUE} < $3) AS due_today, \
                COUNT(*) FILTER (WHERE {EFFECTIVE_DUE} >= $3 AND {EFFECTIVE_DUE} < $4) AS upcoming \
             FROM follow_up_reminders \
             WHERE assigned_to = $1 AND status IN ('Open', 'Snoozed')"
        );
        let summary = sqlx::query_as::<_, ReminderSummary>(&query)
            .bind(user_id)
            .bind(window.now)
            .bind(window.end_of_today)
            .bind(window.end_of_upcoming)
            .fetch_one(&self.pool)
            .await?;

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn where_sql(filter: &ReminderFilter) -> String {
        let mut qb: QueryBuilder<'_, Postgres> =
            QueryBuilder::new("SELECT 1 FROM follow_up_reminders");
        filter.push_where(&mut qb);
        qb.sql().to_string()
    }

    #[test]
    fn test_empty_filter() {
        assert_eq!(
            where_sql(&ReminderFilter::default()),
            "SELECT 1 FROM follow_up_reminders WHERE TRUE"
        );
    }

    #[test]
    fn test_overdue_filter_uses_effective_due_time() {
        let sql = where_sql(&ReminderFilter {
            assigned_to: Some(Uuid::new_v4()),
            overdue_at: Some(Utc::now()),
            ..ReminderFilter::default()
        });
        assert!(sql.contains("assigned_to = $1"));
        assert!(sql.contains("status IN ('Open', 'Snoozed')"));
        assert!(sql.contains("COALESCE(snoozed_until, due_at) ELSE due_at END) < $2"));
    }
}
