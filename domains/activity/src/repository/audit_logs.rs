//! Audit log repository (read side)

use relocrm_common::{PageRequest, Result};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::domain::entities::{AuditLogEntry, EntityType};

pub(crate) const AUDIT_COLUMNS: &str = "\
    id, entity_type, entity_id, action, old_values, new_values, \
    changed_fields, user_id, created_at";

#[derive(Debug, Clone, Default)]
pub struct AuditFilter {
    pub entity_type: Option<EntityType>,
    pub entity_id: Option<Uuid>,
}

impl AuditFilter {
    fn push_where(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        qb.push(" WHERE TRUE");
        if let Some(entity_type) = self.entity_type {
            qb.push(" AND entity_type = ").push_bind(entity_type);
        }
        if let Some(entity_id) = self.entity_id {
            qb.push(" AND entity_id = ").push_bind(entity_id);
        }
    }
}

#[derive(Clone)]
pub struct AuditLogRepository {
    pool: PgPool,
}

impl AuditLogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(
        &self,
        filter: &AuditFilter,
        page: &PageRequest,
    ) -> Result<(Vec<AuditLogEntry>, i64)> {
        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM audit_logs");
        filter.push_where(&mut count);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut query = QueryBuilder::new(format!("SELECT {AUDIT_COLUMNS} FROM audit_logs"));
        filter.push_where(&mut query);
        query
            .push(" ORDER BY created_at DESC, id DESC LIMIT ")
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());
        let rows = query
            .build_query_as::<AuditLogEntry>()
            .fetch_all(&self.pool)
            .await?;

        Ok((rows, total))
    }
}
