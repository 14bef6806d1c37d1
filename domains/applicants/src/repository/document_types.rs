//! Document type repository

use relocrm_common::Result;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::documents::DocumentType;

pub(crate) const DOCUMENT_TYPE_COLUMNS: &str =
    "id, name, description, is_active, display_order, created_at, updated_at";

#[derive(Clone)]
pub struct DocumentTypeRepository {
    pool: PgPool,
}

impl DocumentTypeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find(&self, id: Uuid) -> Result<Option<DocumentType>> {
        let query = format!("SELECT {DOCUMENT_TYPE_COLUMNS} FROM document_types WHERE id = $1");
        let document_type = sqlx::query_as::<_, DocumentType>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(document_type)
    }

    /// Ordered by display order, then name
    pub async fn list(&self, include_inactive: bool) -> Result<Vec<DocumentType>> {
        let query = format!(
            "SELECT {DOCUMENT_TYPE_COLUMNS} FROM document_types \
             WHERE ($1 OR is_active = TRUE) ORDER BY display_order, name"
        );
        let document_types = sqlx::query_as::<_, DocumentType>(&query)
            .bind(include_inactive)
            .fetch_all(&self.pool)
            .await?;

        Ok(document_types)
    }
}
