//! Activity log repository (read side)

use relocrm_common::{PageRequest, Result};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::domain::entities::{ActivityLog, EntityType};

/// All columns in the activity_logs table, used for SELECT and RETURNING clauses.
pub(crate) const ACTIVITY_COLUMNS: &str = "\
    id, entity_type, entity_id, applicant_id, action, description, \
    user_id, user_name, metadata, created_at";

/// Optional filters for activity listings
#[derive(Debug, Clone, Default)]
pub struct ActivityFilter {
    pub entity_type: Option<EntityType>,
    pub entity_id: Option<Uuid>,
    pub applicant_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
}

impl ActivityFilter {
    fn push_where(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        qb.push(" WHERE TRUE");
        if let Some(entity_type) = self.entity_type {
            qb.push(" AND entity_type = ").push_bind(entity_type);
        }
        if let Some(entity_id) = self.entity_id {
            qb.push(" AND entity_id = ").push_bind(entity_id);
        }
        if let Some(applicant_id) = self.applicant_id {
            qb.push(" AND applicant_id = ").push_bind(applicant_id);
        }
        if let Some(user_id) = self.user_id {
            qb.push(" AND user_id = ").push_bind(user_id);
        }
    }
}

#[derive(Clone)]
pub struct ActivityLogRepository {
    pool: PgPool,
}

impl ActivityLogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Page of activity rows, newest first, plus the total matching count
    pub async fn list(
        &self,
        filter: &ActivityFilter,
        page: &PageRequest,
    ) -> Result<(Vec<ActivityLog>, i64)> {
        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM activity_logs");
        filter.push_where(&mut count);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut query = QueryBuilder::new(format!("SELECT {ACTIVITY_COLUMNS} FROM activity_logs"));
        filter.push_where(&mut query);
        query
            .push(" ORDER BY created_at DESC, id DESC LIMIT ")
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());
        let rows = query
            .build_query_as::<ActivityLog>()
            .fetch_all(&self.pool)
            .await?;

        Ok((rows, total))
    }

    pub async fn find(&self, id: Uuid) -> Result<Option<ActivityLog>> {
        let query = format!("SELECT {ACTIVITY_COLUMNS} FROM activity_logs WHERE id = $1");
        let row = sqlx::query_as::<_, ActivityLog>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    /// Whether an applicant row exists (deleted applicants keep their timeline)
    pub async fn applicant_exists(&self, applicant_id: Uuid) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM applicants WHERE id = $1)")
                .bind(applicant_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }
}
