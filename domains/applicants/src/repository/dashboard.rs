//! Read models for dashboard statistics
//!
//! Properties, showings and reminders are read by table name so this crate
//! does not depend on their domains.

use relocrm_common::Result;
use sqlx::PgPool;

use crate::domain::dashboard::{ApplicantStatusRow, DashboardStats, ScheduleCounts};
use crate::domain::housing::HousingSearchStage;

#[derive(Clone)]
pub struct DashboardRepository {
    pool: PgPool,
}

impl DashboardRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn stats(&self) -> Result<DashboardStats> {
        let applicants = sqlx::query_as::<_, ApplicantStatusRow>(
            "SELECT status, board_review->>'decision' AS board_decision \
             FROM applicants WHERE is_deleted = FALSE",
        )
        .fetch_all(&self.pool)
        .await?;

        let stages: Vec<HousingSearchStage> = sqlx::query_scalar(
            "SELECT s.stage FROM housing_searches s \
             JOIN applicants a ON a.id = s.applicant_id \
             WHERE s.is_active = TRUE AND a.is_deleted = FALSE",
        )
        .fetch_all(&self.pool)
        .await?;

        let property_statuses: Vec<String> =
            sqlx::query_scalar("SELECT status::text FROM properties WHERE is_deleted = FALSE")
                .fetch_all(&self.pool)
                .await?;

        let upcoming_showings: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM showings \
             WHERE status = 'Scheduled' \
               AND scheduled_at >= NOW() AND scheduled_at < NOW() + INTERVAL '7 days'",
        )
        .fetch_one(&self.pool)
        .await?;

        let overdue_reminders: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM follow_up_reminders \
             WHERE status IN ('Open', 'Snoozed') \
               AND (CASE WHEN status = 'Snoozed' THEN COALESCE(snoozed_until, due_at) \
                    ELSE due_at END) < NOW()",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(DashboardStats::aggregate(
            &applicants,
            &stages,
            &property_statuses,
            ScheduleCounts {
                upcoming_showings,
                overdue_reminders,
            },
        ))
    }
}
