//! Stage transition requirement repository

use relocrm_common::Result;
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::domain::documents::StageTransitionRequirement;
use crate::domain::housing::HousingSearchStage;
use crate::domain::requirements::{RequirementRow, StageRequirements};

pub(crate) const REQUIREMENT_COLUMNS: &str =
    "id, from_stage, to_stage, document_type_id, is_required, created_at";

#[derive(Clone)]
pub struct StageRequirementRepository {
    pool: PgPool,
}

impl StageRequirementRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find(&self, id: Uuid) -> Result<Option<StageTransitionRequirement>> {
        let query = format!(
            "SELECT {REQUIREMENT_COLUMNS} FROM stage_transition_requirements WHERE id = $1"
        );
        let requirement = sqlx::query_as::<_, StageTransitionRequirement>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(requirement)
    }

    pub async fn list(
        &self,
        from_stage: Option<HousingSearchStage>,
        to_stage: Option<HousingSearchStage>,
    ) -> Result<Vec<StageTransitionRequirement>> {
        let mut query: QueryBuilder<'_, Postgres> = QueryBuilder::new(format!(
            "SELECT {REQUIREMENT_COLUMNS} FROM stage_transition_requirements WHERE TRUE"
        ));
        if let Some(from_stage) = from_stage {
            query.push(" AND from_stage = ").push_bind(from_stage);
        }
        if let Some(to_stage) = to_stage {
            query.push(" AND to_stage = ").push_bind(to_stage);
        }
        query.push(" ORDER BY from_stage, to_stage, created_at");

        let requirements = query
            .build_query_as::<StageTransitionRequirement>()
            .fetch_all(&self.pool)
            .await?;

        Ok(requirements)
    }
}

/// Evaluate the configured requirements for `from → to` against the
/// applicant's uploads. Inactive document types are ignored.
///
/// Takes a connection so it can run on a pooled connection or inside the
/// stage-change transaction.
pub async fn load_stage_requirements(
    conn: &mut PgConnection,
    applicant_id: Uuid,
    from_stage: HousingSearchStage,
    to_stage: HousingSearchStage,
) -> Result<StageRequirements> {
    let rows = sqlx::query_as::<_, RequirementRow>(
        r#"
        SELECT r.document_type_id, t.name AS document_type_name,
               t.display_order, r.is_required
        FROM stage_transition_requirements r
        JOIN document_types t ON t.id = r.document_type_id
        WHERE r.from_stage = $1 AND r.to_stage = $2 AND t.is_active = TRUE
        "#,
    )
    .bind(from_stage)
    .bind(to_stage)
    .fetch_all(&mut *conn)
    .await?;

    let uploaded: Vec<(Uuid, Uuid)> = sqlx::query_as(
        "SELECT id, document_type_id FROM applicant_documents WHERE applicant_id = $1",
    )
    .bind(applicant_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(StageRequirements::evaluate(
        from_stage, to_stage, rows, &uploaded,
    ))
}
