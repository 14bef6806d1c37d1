//! Applicant document repository

use relocrm_common::Result;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::documents::ApplicantDocument;

pub(crate) const DOCUMENT_COLUMNS: &str = "\
    id, applicant_id, document_type_id, file_name, storage_key, \
    content_type, size_bytes, uploaded_by, uploaded_at";

#[derive(Clone)]
pub struct ApplicantDocumentRepository {
    pool: PgPool,
}

impl ApplicantDocumentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find(&self, id: Uuid) -> Result<Option<ApplicantDocument>> {
        let query = format!("SELECT {DOCUMENT_COLUMNS} FROM applicant_documents WHERE id = $1");
        let document = sqlx::query_as::<_, ApplicantDocument>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(document)
    }

    /// Newest uploads first
    pub async fn list_for_applicant(&self, applicant_id: Uuid) -> Result<Vec<ApplicantDocument>> {
        let query = format!(
            "SELECT {DOCUMENT_COLUMNS} FROM applicant_documents \
             WHERE applicant_id = $1 ORDER BY uploaded_at DESC"
        );
        let documents = sqlx::query_as::<_, ApplicantDocument>(&query)
            .bind(applicant_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(documents)
    }

    pub async fn count_for_applicant(&self, applicant_id: Uuid) -> Result<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM applicant_documents WHERE applicant_id = $1")
                .bind(applicant_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }
}
