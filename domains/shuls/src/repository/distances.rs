//! Cached property-to-shul distances

use relocrm_common::{Address, Result};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::distance::PropertyShulDistance;

pub(crate) const DISTANCE_COLUMNS: &str =
    "property_id, shul_id, distance_miles, walking_minutes, calculated_at";

#[derive(Clone)]
pub struct DistanceRepository {
    pool: PgPool,
}

impl DistanceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Address of a property that has not been deleted
    pub async fn find_property_address(&self, property_id: Uuid) -> Result<Option<Address>> {
        let address: Option<Json<Address>> = sqlx::query_scalar(
            "SELECT address FROM properties WHERE id = $1 AND is_deleted = FALSE",
        )
        .bind(property_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(address.map(|Json(address)| address))
    }

    pub async fn list_for_property(&self, property_id: Uuid) -> Result<Vec<PropertyShulDistance>> {
        let query = format!(
            "SELECT {DISTANCE_COLUMNS} FROM property_shul_distances WHERE property_id = $1"
        );
        let distances = sqlx::query_as::<_, PropertyShulDistance>(&query)
            .bind(property_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(distances)
    }
}
