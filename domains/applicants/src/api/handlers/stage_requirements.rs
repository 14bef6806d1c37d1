//! Stage transition requirement configuration handlers

use axum::{extract::State, http::StatusCode, Json};
use relocrm_activity::{
    record_activity_tx, record_audit_tx, EntityType, NewActivity, NewAuditEntry,
};
use relocrm_common::{parse_optional, Error, Path, Query, Result, ValidatedJson};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::api::middleware::{AdminUser, ApplicantsState, AuthUser};
use crate::domain::documents::StageTransitionRequirement;
use crate::domain::housing::HousingSearchStage;
use crate::repository::{
    delete_stage_requirement_tx, find_document_type_for_update_tx, insert_stage_requirement_tx,
    update_stage_requirement_tx,
};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateRequirementRequest {
    /// Stage the transition starts from
    #[validate(length(min = 1, message = "From stage is required"))]
    pub from_stage: String,

    /// Stage the transition ends at
    #[validate(length(min = 1, message = "To stage is required"))]
    pub to_stage: String,

    /// Active document type to require
    pub document_type_id: Uuid,

    /// Whether the document blocks the transition (default true)
    #[serde(default = "default_required")]
    pub is_required: bool,
}

fn default_required() -> bool {
    true
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRequirementRequest {
    /// Whether the document blocks the transition
    pub is_required: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequirementQuery {
    pub from_stage: Option<String>,
    pub to_stage: Option<String>,
}

fn requirement_description(verb: &str, requirement: &StageTransitionRequirement) -> String {
    format!(
        "Stage requirement {} for {} to {}",
        verb, requirement.from_stage, requirement.to_stage
    )
}

/// **POST /api/stage-requirements**
pub async fn create_requirement(
    AdminUser(ctx): AdminUser,
    State(state): State<ApplicantsState>,
    ValidatedJson(req): ValidatedJson<CreateRequirementRequest>,
) -> Result<(StatusCode, Json<StageTransitionRequirement>)> {
    let from_stage: HousingSearchStage = req.from_stage.parse()?;
    let to_stage: HousingSearchStage = req.to_stage.parse()?;
    let requirement =
        StageTransitionRequirement::new(from_stage, to_stage, req.document_type_id, req.is_required)?;

    let mut tx = state.repos.begin().await?;
    match find_document_type_for_update_tx(&mut tx, req.document_type_id).await? {
        Some(document_type) if document_type.is_active => {}
        _ => return Err(Error::not_found("DocumentType", req.document_type_id)),
    }

    let requirement = insert_stage_requirement_tx(&mut tx, &requirement).await?;
    record_audit_tx(
        &mut tx,
        NewAuditEntry::created(
            EntityType::StageTransitionRequirement,
            requirement.id,
            &requirement,
        )?
        .by(&ctx),
    )
    .await?;
    record_activity_tx(
        &mut tx,
        NewActivity::new(
            EntityType::StageTransitionRequirement,
            requirement.id,
            "Created",
            requirement_description("created", &requirement),
        )
        .by(&ctx),
    )
    .await?;
    tx.commit().await?;

    Ok((StatusCode::CREATED, Json(requirement)))
}

/// **GET /api/stage-requirements**
pub async fn list_requirements(
    AuthUser(_ctx): AuthUser,
    State(state): State<ApplicantsState>,
    Query(query): Query<RequirementQuery>,
) -> Result<Json<Vec<StageTransitionRequirement>>> {
    let from_stage = parse_optional(query.from_stage.as_deref())?;
    let to_stage = parse_optional(query.to_stage.as_deref())?;
    let requirements = state
        .repos
        .stage_requirements
        .list(from_stage, to_stage)
        .await?;
    Ok(Json(requirements))
}

/// **PUT /api/stage-requirements/{id}**
pub async fn update_requirement(
    AdminUser(ctx): AdminUser,
    State(state): State<ApplicantsState>,
    Path(id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<UpdateRequirementRequest>,
) -> Result<Json<StageTransitionRequirement>> {
    let before = state
        .repos
        .stage_requirements
        .find(id)
        .await?
        .ok_or_else(|| Error::not_found("StageTransitionRequirement", id))?;

    let mut tx = state.repos.begin().await?;
    let requirement = update_stage_requirement_tx(&mut tx, id, req.is_required)
        .await?
        .ok_or_else(|| Error::not_found("StageTransitionRequirement", id))?;

    record_audit_tx(
        &mut tx,
        NewAuditEntry::updated(
            EntityType::StageTransitionRequirement,
            id,
            &before,
            &requirement,
        )?
        .by(&ctx),
    )
    .await?;
    record_activity_tx(
        &mut tx,
        NewActivity::new(
            EntityType::StageTransitionRequirement,
            id,
            "Updated",
            requirement_description("updated", &requirement),
        )
        .by(&ctx),
    )
    .await?;
    tx.commit().await?;

    Ok(Json(requirement))
}

/// Hard delete
///
/// **DELETE /api/stage-requirements/{id}**
pub async fn delete_requirement(
    AdminUser(ctx): AdminUser,
    State(state): State<ApplicantsState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    let mut tx = state.repos.begin().await?;
    let requirement = delete_stage_requirement_tx(&mut tx, id)
        .await?
        .ok_or_else(|| Error::not_found("StageTransitionRequirement", id))?;

    record_audit_tx(
        &mut tx,
        NewAuditEntry::deleted(EntityType::StageTransitionRequirement, id, &requirement)?.by(&ctx),
    )
    .await?;
    record_activity_tx(
        &mut tx,
        NewActivity::new(
            EntityType::StageTransitionRequirement,
            id,
            "Deleted",
            requirement_description("deleted", &requirement),
        )
        .by(&ctx),
    )
    .await?;
    tx.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_request_defaults_to_required() {
        let req: CreateRequirementRequest = serde_json::from_value(json!({
            "fromStage": "AwaitingAgreements",
            "toStage": "Searching",
            "documentTypeId": Uuid::new_v4(),
        }))
        .unwrap();
        assert!(req.is_required);
    }

    #[test]
    fn test_description_names_both_stages() {
        let requirement = StageTransitionRequirement::new(
            HousingSearchStage::Searching,
            HousingSearchStage::UnderContract,
            Uuid::new_v4(),
            true,
        )
        .unwrap();
        assert_eq!(
            requirement_description("created", &requirement),
            "Stage requirement created for Searching to UnderContract"
        );
    }
}
