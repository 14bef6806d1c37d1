//! Shul repository

use relocrm_common::db::like_pattern;
use relocrm_common::{PageRequest, Result};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::domain::entities::Shul;

/// All columns in the shuls table, used for SELECT and RETURNING clauses.
pub(crate) const SHUL_COLUMNS: &str = "\
    id, name, address, denomination, rabbi, phone, website, is_active, created_at, updated_at";

#[derive(Debug, Clone, Default)]
pub struct ShulFilter {
    pub include_inactive: bool,
    pub search: Option<String>,
}

impl ShulFilter {
    fn push_where(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        qb.push(" WHERE TRUE");
        if !self.include_inactive {
            qb.push(" AND is_active = TRUE");
        }
        if let Some(search) = &self.search {
            let pattern = like_pattern(search);
            qb.push(" AND (name ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR rabbi ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR address->>'street' ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR address->>'city' ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
    }
}

#[derive(Clone)]
pub struct ShulRepository {
    pool: PgPool,
}

impl ShulRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find(&self, id: Uuid) -> Result<Option<Shul>> {
        let query = format!("SELECT {SHUL_COLUMNS} FROM shuls WHERE id = $1");
        let shul = sqlx::query_as::<_, Shul>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(shul)
    }

    /// Alphabetical by name
    pub async fn list(&self, filter: &ShulFilter, page: &PageRequest) -> Result<(Vec<Shul>, i64)> {
        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM shuls");
        filter.push_where(&mut count);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut query = QueryBuilder::new(format!("SELECT {SHUL_COLUMNS} FROM shuls"));
        filter.push_where(&mut query);
        query
            .push(" ORDER BY LOWER(name), id LIMIT ")
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());
        let shuls = query.build_query_as::<Shul>().fetch_all(&self.pool).await?;

        Ok((shuls, total))
    }

    /// Active shuls with both coordinates set
    pub async fn list_active_geocoded(&self) -> Result<Vec<Shul>> {
        let query = format!(
            "SELECT {SHUL_COLUMNS} FROM shuls \
             WHERE is_active = TRUE \
               AND address->>'latitude' IS NOT NULL \
               AND address->>'longitude' IS NOT NULL \
             ORDER BY name"
        );
        let shuls = sqlx::query_as::<_, Shul>(&query)
            .fetch_all(&self.pool)
            .await?;

        Ok(shuls)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn where_sql(filter: &ShulFilter) -> String {
        let mut qb: QueryBuilder<'_, Postgres> = QueryBuilder::new("SELECT 1 FROM shuls");
        filter.push_where(&mut qb);
        qb.sql().to_string()
    }

    #[test]
    fn test_inactive_hidden_by_default() {
        assert!(where_sql(&ShulFilter::default()).contains("is_active = TRUE"));
        let all = ShulFilter {
            include_inactive: true,
            ..ShulFilter::default()
        };
        assert!(!where_sql(&all).contains("is_active"));
    }

    #[test]
    fn test_search_covers_name_rabbi_and_address() {
        let sql = where_sql(&ShulFilter {
            search: Some("govoha".to_string()),
            ..ShulFilter::default()
        });
        assert!(sql.contains("name ILIKE $1"));
        assert!(sql.contains("rabbi ILIKE $2"));
        assert!(sql.contains("address->>'city' ILIKE $4"));
    }
}
