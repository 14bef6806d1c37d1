//! Property repository

use relocrm_common::db::like_pattern;
use relocrm_common::{PageRequest, Result};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::domain::entities::{ListingStatus, Property};

/// All columns in the properties table, used for SELECT and RETURNING clauses.
pub(crate) const PROPERTY_COLUMNS: &str = "\
    id, address, price, bedrooms, bathrooms, square_feet, property_type, status, \
    mls_number, listing_url, description, created_by, \
    is_deleted, deleted_at, deleted_by, created_at, updated_at";

#[derive(Debug, Clone, Default)]
pub struct PropertyFilter {
    pub status: Option<ListingStatus>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub min_bedrooms: Option<i32>,
    pub city: Option<String>,
    pub search: Option<String>,
}

impl PropertyFilter {
    fn push_where(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        qb.push(" WHERE is_deleted = FALSE");
        if let Some(status) = self.status {
            qb.push(" AND status = ").push_bind(status);
        }
        if let Some(min_price) = self.min_price {
            qb.push(" AND price >= ").push_bind(min_price);
        }
        if let Some(max_price) = self.max_price {
            qb.push(" AND price <= ").push_bind(max_price);
        }
        if let Some(min_bedrooms) = self.min_bedrooms {
            qb.push(" AND bedrooms >= ").push_bind(min_bedrooms);
        }
        if let Some(city) = &self.city {
            qb.push(" AND LOWER(address->>'city') = LOWER(")
                .push_bind(city.trim().to_string())
                .push(")");
        }
        if let Some(search) = &self.search {
            let pattern = like_pattern(search);
            qb.push(" AND (address->>'street' ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR address->>'city' ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR address->>'zipCode' ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR mls_number ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
    }
}

#[derive(Clone)]
pub struct PropertyRepository {
    pool: PgPool,
}

impl PropertyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a property that has not been deleted
    pub async fn find(&self, id: Uuid) -> Result<Option<Property>> {
        let query = format!(
            "SELECT {PROPERTY_COLUMNS} FROM properties WHERE id = $1 AND is_deleted = FALSE"
        );
        let property = sqlx::query_as::<_, Property>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(property)
    }

    /// Newest listings first
    pub async fn list(
        &self,
        filter: &PropertyFilter,
        page: &PageRequest,
    ) -> Result<(Vec<Property>, i64)> {
        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM properties");
        filter.push_where(&mut count);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut query = QueryBuilder::new(format!("SELECT {PROPERTY_COLUMNS} FROM properties"));
        filter.push_where(&mut query);
        query
            .push(" ORDER BY created_at DESC, id DESC LIMIT ")
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());
        let properties = query
            .build_query_as::<Property>()
            .fetch_all(&self.pool)
            .await?;

        Ok((properties, total))
    }
}
