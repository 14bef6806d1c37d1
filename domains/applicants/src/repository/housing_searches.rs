//! Housing search repository

use relocrm_common::Result;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::housing::HousingSearch;

pub(crate) const HOUSING_SEARCH_COLUMNS: &str = "\
    id, applicant_id, stage, stage_changed_at, is_active, \
    min_budget, max_budget, min_bedrooms, preferred_areas, notes, \
    deactivated_at, created_at, updated_at";

#[derive(Clone)]
pub struct HousingSearchRepository {
    pool: PgPool,
}

impl HousingSearchRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find(&self, id: Uuid) -> Result<Option<HousingSearch>> {
        let query = format!("SELECT {HOUSING_SEARCH_COLUMNS} FROM housing_searches WHERE id = $1");
        let search = sqlx::query_as::<_, HousingSearch>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(search)
    }

    /// All searches of an applicant, active first
    pub async fn list_for_applicant(&self, applicant_id: Uuid) -> Result<Vec<HousingSearch>> {
        let query = format!(
            "SELECT {HOUSING_SEARCH_COLUMNS} FROM housing_searches \
             WHERE applicant_id = $1 ORDER BY is_active DESC, created_at DESC"
        );
        let searches = sqlx::query_as::<_, HousingSearch>(&query)
            .bind(applicant_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(searches)
    }

    pub async fn find_active(&self, applicant_id: Uuid) -> Result<Option<HousingSearch>> {
        let query = format!(
            "SELECT {HOUSING_SEARCH_COLUMNS} FROM housing_searches \
             WHERE applicant_id = $1 AND is_active = TRUE"
        );
        let search = sqlx::query_as::<_, HousingSearch>(&query)
            .bind(applicant_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(search)
    }
}
