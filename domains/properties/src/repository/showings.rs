//! Showing repository

use chrono::{DateTime, Utc};
use relocrm_common::{PageRequest, Result};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::domain::showings::{Showing, ShowingStatus};

/// All columns in the showings table, used for SELECT and RETURNING clauses.
pub(crate) const SHOWING_COLUMNS: &str = "\
    id, property_match_id, scheduled_at, duration_minutes, status, notes, feedback, \
    completed_at, created_by, created_at, updated_at";

#[derive(Debug, Clone, Default)]
pub struct ShowingFilter {
    pub status: Option<ShowingStatus>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub property_match_id: Option<Uuid>,
}

impl ShowingFilter {
    fn push_where(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        qb.push(" WHERE TRUE");
        if let Some(status) = self.status {
            qb.push(" AND status = ").push_bind(status);
        }
        if let Some(from) = self.from {
            qb.push(" AND scheduled_at >= ").push_bind(from);
        }
        if let Some(to) = self.to {
            qb.push(" AND scheduled_at <= ").push_bind(to);
        }
        if let Some(match_id) = self.property_match_id {
            qb.push(" AND property_match_id = ").push_bind(match_id);
        }
    }
}

#[derive(Clone)]
pub struct ShowingRepository {
    pool: PgPool,
}

impl ShowingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find(&self, id: Uuid) -> Result<Option<Showing>> {
        let query = format!("SELECT {SHOWING_COLUMNS} FROM showings WHERE id = $1");
        let showing = sqlx::query_as::<_, Showing>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(showing)
    }

    /// Soonest first
    pub async fn list(
        &self,
        filter: &ShowingFilter,
        page: &PageRequest,
    ) -> Result<(Vec<Showing>, i64)> {
        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM showings");
        filter.push_where(&mut count);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut query = QueryBuilder::new(format!("SELECT {SHOWING_COLUMNS} FROM showings"));
        filter.push_where(&mut query);
        query
            .push(" ORDER BY scheduled_at ASC, id ASC LIMIT ")
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());
        let showings = query
            .build_query_as::<Showing>()
            .fetch_all(&self.pool)
            .await?;

        Ok((showings, total))
    }
}
