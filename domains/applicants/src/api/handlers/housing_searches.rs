//! Housing search API handlers

use axum::{extract::State, http::StatusCode, Json};
use relocrm_activity::{
    record_activity_tx, record_audit_tx, EntityType, NewActivity, NewAuditEntry,
};
use relocrm_auth::AuthContext;
use relocrm_common::{Error, Path, Result, ValidatedJson};
use serde::Deserialize;
use serde_json::json;
use sqlx::{Postgres, Transaction};
use uuid::Uuid;
use validator::Validate;

use crate::api::middleware::{ApplicantsState, AuthUser};
use crate::domain::housing::{HousingPreferences, HousingSearch, HousingSearchStage};
use crate::repository::{
    find_active_search_tx, find_applicant_for_update_tx, find_housing_search_for_update_tx,
    insert_housing_search_tx, load_stage_requirements, update_housing_search_tx,
};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChangeStageRequest {
    /// Target stage
    #[validate(length(min = 1, message = "Stage is required"))]
    pub stage: String,

    /// Recorded in the activity metadata
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
}

async fn lock_search(tx: &mut Transaction<'_, Postgres>, id: Uuid) -> Result<HousingSearch> {
    find_housing_search_for_update_tx(tx, id)
        .await?
        .ok_or_else(|| Error::not_found("HousingSearch", id))
}

fn search_activity(search: &HousingSearch, action: &str, description: String) -> NewActivity {
    NewActivity::new(EntityType::HousingSearch, search.id, action, description)
        .for_applicant(Some(search.applicant_id))
}

async fn log_search_change(
    tx: &mut Transaction<'_, Postgres>,
    ctx: &AuthContext,
    before: &HousingSearch,
    after: &HousingSearch,
    activity: NewActivity,
) -> Result<()> {
    record_audit_tx(
        tx,
        NewAuditEntry::updated(EntityType::HousingSearch, after.id, before, after)?.by(ctx),
    )
    .await?;
    record_activity_tx(tx, activity.by(ctx)).await?;
    Ok(())
}

/// **POST /api/applicants/{id}/housing-searches**
pub async fn create_housing_search(
    AuthUser(ctx): AuthUser,
    State(state): State<ApplicantsState>,
    Path(applicant_id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<HousingPreferences>,
) -> Result<(StatusCode, Json<HousingSearch>)> {
    let mut tx = state.repos.begin().await?;
    let applicant = find_applicant_for_update_tx(&mut tx, applicant_id, false)
        .await?
        .ok_or_else(|| Error::not_found("Applicant", applicant_id))?;

    if find_active_search_tx(&mut tx, applicant_id).await?.is_some() {
        return Err(Error::Conflict(
            "Applicant already has an active housing search".to_string(),
        ));
    }

    let search = HousingSearch::new(applicant_id, req)?;
    let search = insert_housing_search_tx(&mut tx, &search).await?;

    record_audit_tx(
        &mut tx,
        NewAuditEntry::created(EntityType::HousingSearch, search.id, &search)?.by(&ctx),
    )
    .await?;
    record_activity_tx(
        &mut tx,
        search_activity(
            &search,
            "Created",
            format!("Housing search created for {} family", applicant.family_name()),
        )
        .by(&ctx),
    )
    .await?;
    tx.commit().await?;

    Ok((StatusCode::CREATED, Json(search)))
}

/// All searches of an applicant, active first
pub async fn list_for_applicant(
    AuthUser(_ctx): AuthUser,
    State(state): State<ApplicantsState>,
    Path(applicant_id): Path<Uuid>,
) -> Result<Json<Vec<HousingSearch>>> {
    if state.repos.applicants.find(applicant_id).await?.is_none() {
        return Err(Error::not_found("Applicant", applicant_id));
    }
    let searches = state
        .repos
        .housing_searches
        .list_for_applicant(applicant_id)
        .await?;
    Ok(Json(searches))
}

pub async fn get_housing_search(
    AuthUser(_ctx): AuthUser,
    State(state): State<ApplicantsState>,
    Path(id): Path<Uuid>,
) -> Result<Json<HousingSearch>> {
    let search = state
        .repos
        .housing_searches
        .find(id)
        .await?
        .ok_or_else(|| Error::not_found("HousingSearch", id))?;
    Ok(Json(search))
}

/// Replace the search criteria
///
/// **PUT /api/housing-searches/{id}**
pub async fn update_housing_search(
    AuthUser(ctx): AuthUser,
    State(state): State<ApplicantsState>,
    Path(id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<HousingPreferences>,
) -> Result<Json<HousingSearch>> {
    let mut tx = state.repos.begin().await?;
    let mut search = lock_search(&mut tx, id).await?;
    let before = search.clone();

    search.update_preferences(req)?;
    let search = update_housing_search_tx(&mut tx, &search).await?;

    log_search_change(
        &mut tx,
        &ctx,
        &before,
        &search,
        search_activity(&search, "Updated", "Housing search preferences updated".to_string()),
    )
    .await?;
    tx.commit().await?;

    Ok(Json(search))
}

/// Move a search to another stage.
///
/// **PUT /api/housing-searches/{id}/stage**
///
/// The transition must be valid and every required document configured for
/// `(current, target)` must already be uploaded for the applicant. Each
/// missing document is reported as its own validation message.
pub async fn change_stage(
    AuthUser(ctx): AuthUser,
    State(state): State<ApplicantsState>,
    Path(id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<ChangeStageRequest>,
) -> Result<Json<HousingSearch>> {
    let next: HousingSearchStage = req.stage.parse()?;

    let mut tx = state.repos.begin().await?;
    let mut search = lock_search(&mut tx, id).await?;
    let before = search.clone();

    let previous = search.change_stage(next)?;

    let requirements =
        load_stage_requirements(&mut *tx, search.applicant_id, previous, next).await?;
    let missing = requirements.missing_required();
    if !missing.is_empty() {
        tracing::debug!(
            housing_search_id = %id,
            from_stage = %previous,
            to_stage = %next,
            missing = missing.len(),
            "Stage change blocked by missing documents"
        );
        return Err(Error::Validation(missing));
    }

    let search = update_housing_search_tx(&mut tx, &search).await?;

    let activity = search_activity(
        &search,
        "StageChanged",
        format!("Stage changed from {} to {}", previous, next),
    )
    .with_metadata(json!({
        "fromStage": previous,
        "toStage": next,
        "notes": req.notes,
    }));
    log_search_change(&mut tx, &ctx, &before, &search, activity).await?;
    tx.commit().await?;

    tracing::info!(housing_search_id = %id, from_stage = %previous, to_stage = %next, "Housing search stage changed");
    Ok(Json(search))
}

/// Deactivate a duplicate search. Idempotent.
///
/// **POST /api/housing-searches/{id}/deactivate**
pub async fn deactivate_housing_search(
    AuthUser(ctx): AuthUser,
    State(state): State<ApplicantsState>,
    Path(id): Path<Uuid>,
) -> Result<Json<HousingSearch>> {
    let mut tx = state.repos.begin().await?;
    let mut search = lock_search(&mut tx, id).await?;
    let before = search.clone();

    if !search.deactivate() {
        return Ok(Json(search));
    }
    let search = update_housing_search_tx(&mut tx, &search).await?;

    log_search_change(
        &mut tx,
        &ctx,
        &before,
        &search,
        search_activity(&search, "Deactivated", "Housing search deactivated".to_string()),
    )
    .await?;
    tx.commit().await?;

    Ok(Json(search))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_change_stage_request_deserializes() {
        let req: ChangeStageRequest =
            serde_json::from_value(json!({"stage": "searching", "notes": "Agreements signed"}))
                .unwrap();
        assert!(req.validate().is_ok());
        assert_eq!(
            req.stage.parse::<HousingSearchStage>().unwrap(),
            HousingSearchStage::Searching
        );
    }

    #[test]
    fn test_change_stage_request_requires_stage() {
        let req: ChangeStageRequest = serde_json::from_value(json!({"stage": ""})).unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_unknown_stage_is_validation_error() {
        assert!(matches!(
            "Escrow".parse::<HousingSearchStage>(),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_search_activity_targets_applicant_timeline() {
        let applicant_id = Uuid::new_v4();
        let search = HousingSearch::new(applicant_id, HousingPreferences::default()).unwrap();
        let activity = search_activity(&search, "Updated", "x".to_string());
        assert_eq!(activity.applicant_id, Some(applicant_id));
        assert_eq!(activity.entity_type, EntityType::HousingSearch);
    }
}
