//! Property photo repository

use relocrm_common::Result;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::photos::PropertyPhoto;

/// All columns in the property_photos table, used for SELECT and RETURNING clauses.
pub(crate) const PHOTO_COLUMNS: &str = "\
    id, property_id, storage_key, file_name, content_type, size_bytes, \
    display_order, is_primary, uploaded_at";

#[derive(Clone)]
pub struct PhotoRepository {
    pool: PgPool,
}

impl PhotoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_for_property(&self, property_id: Uuid) -> Result<Vec<PropertyPhoto>> {
        let query = format!(
            "SELECT {PHOTO_COLUMNS} FROM property_photos \
             WHERE property_id = $1 ORDER BY display_order, uploaded_at"
        );
        let photos = sqlx::query_as::<_, PropertyPhoto>(&query)
            .bind(property_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(photos)
    }
}
