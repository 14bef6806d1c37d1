//! Property match repository

use relocrm_common::Result;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::matches::{MatchCriteria, MatchDetail, PropertyMatch};

/// All columns in the property_matches table, used for SELECT and RETURNING clauses.
pub(crate) const MATCH_COLUMNS: &str = "\
    id, housing_search_id, property_id, status, match_score, notes, offer_amount, \
    created_by, created_at, updated_at";

/// Match joined through its search to the applicant, and to the property address
pub(crate) const MATCH_DETAIL_SELECT: &str = "\
    SELECT m.id, m.housing_search_id, m.property_id, m.status, m.match_score, m.notes, \
           m.offer_amount, m.created_by, m.created_at, m.updated_at, \
           hs.applicant_id, \
           COALESCE(a.husband->>'lastName', '') AS family_name, \
           p.address AS property_address \
    FROM property_matches m \
    JOIN housing_searches hs ON hs.id = m.housing_search_id \
    JOIN applicants a ON a.id = hs.applicant_id \
    JOIN properties p ON p.id = m.property_id";

/// Search criteria columns read when scoring a match
pub(crate) const CRITERIA_SELECT: &str = "\
    SELECT id AS housing_search_id, applicant_id, is_active, \
           min_budget, max_budget, min_bedrooms, preferred_areas \
    FROM housing_searches";

#[derive(Clone)]
pub struct MatchRepository {
    pool: PgPool,
}

impl MatchRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_detail(&self, id: Uuid) -> Result<Option<MatchDetail>> {
        let query = format!("{MATCH_DETAIL_SELECT} WHERE m.id = $1");
        let detail = sqlx::query_as::<_, MatchDetail>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(detail)
    }

    /// Matches of a housing search, best score first
    pub async fn list_for_search(&self, housing_search_id: Uuid) -> Result<Vec<MatchDetail>> {
        let query = format!(
            "{MATCH_DETAIL_SELECT} WHERE m.housing_search_id = $1 \
             ORDER BY m.match_score DESC, m.created_at DESC"
        );
        let matches = sqlx::query_as::<_, MatchDetail>(&query)
            .bind(housing_search_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(matches)
    }

    pub async fn list_for_property(&self, property_id: Uuid) -> Result<Vec<MatchDetail>> {
        let query = format!(
            "{MATCH_DETAIL_SELECT} WHERE m.property_id = $1 \
             ORDER BY m.match_score DESC, m.created_at DESC"
        );
        let matches = sqlx::query_as::<_, MatchDetail>(&query)
            .bind(property_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(matches)
    }

    pub async fn housing_search_exists(&self, id: Uuid) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM housing_searches WHERE id = $1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    /// Plain match rows, used where the joined detail is not needed
    pub async fn find(&self, id: Uuid) -> Result<Option<PropertyMatch>> {
        let query = format!("SELECT {MATCH_COLUMNS} FROM property_matches WHERE id = $1");
        let found = sqlx::query_as::<_, PropertyMatch>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(found)
    }

    pub async fn find_criteria(&self, housing_search_id: Uuid) -> Result<Option<MatchCriteria>> {
        let query = format!("{CRITERIA_SELECT} WHERE id = $1");
        let criteria = sqlx::query_as::<_, MatchCriteria>(&query)
            .bind(housing_search_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(criteria)
    }
}
