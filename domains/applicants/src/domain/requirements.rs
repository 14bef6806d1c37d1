//! Stage-requirement evaluation
//!
//! Cross-references the document types configured for a stage transition
//! with the documents an applicant has uploaded.

use serde::Serialize;
use uuid::Uuid;

use super::housing::HousingSearchStage;

/// Configured requirement joined with its document type
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct RequirementRow {
    pub document_type_id: Uuid,
    pub document_type_name: String,
    pub display_order: i32,
    pub is_required: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageRequirementStatus {
    pub document_type_id: Uuid,
    pub document_type_name: String,
    pub is_required: bool,
    pub is_uploaded: bool,
    pub document_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageRequirements {
    pub from_stage: HousingSearchStage,
    pub to_stage: HousingSearchStage,
    pub requirements: Vec<StageRequirementStatus>,
    pub all_required_uploaded: bool,
}

impl StageRequirements {
    /// `uploaded` holds `(document_id, document_type_id)` pairs
    pub fn evaluate(
        from_stage: HousingSearchStage,
        to_stage: HousingSearchStage,
        mut rows: Vec<RequirementRow>,
        uploaded: &[(Uuid, Uuid)],
    ) -> Self {
        rows.sort_by(|a, b| {
            a.display_order
                .cmp(&b.display_order)
                .then_with(|| a.document_type_name.cmp(&b.document_type_name))
        });

        let requirements: Vec<StageRequirementStatus> = rows
            .into_iter()
            .map(|row| {
                let document_ids: Vec<Uuid> = uploaded
                    .iter()
                    .filter(|(_, type_id)| *type_id == row.document_type_id)
                    .map(|(doc_id, _)| *doc_id)
                    .collect();
                StageRequirementStatus {
                    document_type_id: row.document_type_id,
                    document_type_name: row.document_type_name,
                    is_required: row.is_required,
                    is_uploaded: !document_ids.is_empty(),
                    document_ids,
                }
            })
            .collect();

        let all_required_uploaded = requirements
            .iter()
            .filter(|r| r.is_required)
            .all(|r| r.is_uploaded);

        Self {
            from_stage,
            to_stage,
            requirements,
            all_required_uploaded,
        }
    }

    /// One message per required document type without an upload
    pub fn missing_required(&self) -> Vec<String> {
        self.requirements
            .iter()
            .filter(|r| r.is_required && !r.is_uploaded)
            .map(|r| {
                format!(
                    "Required document '{}' has not been uploaded for the transition from {} to {}",
                    r.document_type_name, self.from_stage, self.to_stage
                )
            })
            .collect()
    }
}
