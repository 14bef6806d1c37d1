//! Property match handlers
//!
//! Activity descriptions name the family and street, read through the
//! match's housing search and property.

use axum::{extract::State, http::StatusCode, Json};
use relocrm_activity::{
    record_activity_tx, record_audit_tx, EntityType, NewActivity, NewAuditEntry,
};
use relocrm_auth::AuthContext;
use relocrm_common::{Error, Path, Result, ValidatedJson};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::{Postgres, Transaction};
use uuid::Uuid;
use validator::Validate;

use super::properties::lock_property;
use crate::api::middleware::{AuthUser, PropertiesState};
use crate::domain::matches::{compute_match_score, MatchDetail, MatchStatus, PropertyMatch};
use crate::repository::{
    delete_match_tx, find_match_criteria_tx, find_match_detail_for_update_tx,
    find_match_details_for_update_tx, insert_match_tx, update_match_tx,
};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateMatchRequest {
    /// Active housing search to match
    pub housing_search_id: Uuid,
    /// Property to match
    pub property_id: Uuid,

    /// Overrides the computed score (0-100)
    #[validate(range(min = 0, max = 100))]
    pub match_score: Option<i32>,

    /// Free-form notes (max 4000 chars)
    #[validate(length(max = 4000))]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMatchRequest {
    /// Replaces the notes
    #[validate(length(max = 4000))]
    pub notes: Option<String>,

    /// New score (0-100); unchanged when absent
    #[validate(range(min = 0, max = 100))]
    pub match_score: Option<i32>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChangeMatchStatusRequest {
    /// Target match status
    #[validate(length(min = 1, message = "Status is required"))]
    pub status: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct OfferRequest {
    /// Offer amount, greater than zero
    pub amount: Decimal,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RequestShowingsRequest {
    /// Matches to move to `ShowingRequested`
    #[validate(length(min = 1, message = "matchIds must not be empty"))]
    pub match_ids: Vec<Uuid>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestShowingsResponse {
    pub requested_count: usize,
}

pub(crate) async fn lock_match(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
) -> Result<MatchDetail> {
    find_match_detail_for_update_tx(tx, id)
        .await?
        .ok_or_else(|| Error::not_found("PropertyMatch", id))
}

pub(crate) fn match_activity(detail: &MatchDetail, action: &str, what: &str) -> NewActivity {
    NewActivity::new(
        EntityType::PropertyMatch,
        detail.property_match.id,
        action,
        detail.describe(what),
    )
    .for_applicant(Some(detail.applicant_id))
}

/// Persist a changed match with its audit diff and activity entry
pub(crate) async fn save_match_change(
    tx: &mut Transaction<'_, Postgres>,
    ctx: &AuthContext,
    before: &PropertyMatch,
    detail: &mut MatchDetail,
    activity: NewActivity,
) -> Result<()> {
    detail.property_match = update_match_tx(tx, &detail.property_match).await?;
    record_audit_tx(
        tx,
        NewAuditEntry::updated(EntityType::PropertyMatch, before.id, before, &detail.property_match)?
            .by(ctx),
    )
    .await?;
    record_activity_tx(tx, activity.by(ctx)).await?;
    Ok(())
}

/// Match a property to a housing search. Without a score in the request the
/// score is computed from the search criteria.
///
/// **POST /api/property-matches**
pub async fn create_match(
    AuthUser(ctx): AuthUser,
    State(state): State<PropertiesState>,
    ValidatedJson(req): ValidatedJson<CreateMatchRequest>,
) -> Result<(StatusCode, Json<MatchDetail>)> {
    let mut tx = state.repos.begin().await?;
    let criteria = find_match_criteria_tx(&mut tx, req.housing_search_id)
        .await?
        .ok_or_else(|| Error::not_found("HousingSearch", req.housing_search_id))?;
    if !criteria.is_active {
        return Err(Error::validation(
            "Properties can only be matched to an active housing search",
        ));
    }
    let property = lock_property(&mut tx, req.property_id, false).await?;

    let score = req
        .match_score
        .unwrap_or_else(|| compute_match_score(&criteria, &property));
    let property_match = PropertyMatch::new(
        criteria.housing_search_id,
        property.id,
        score,
        req.notes,
        Some(ctx.user_id()),
    )?;
    let property_match = insert_match_tx(&mut tx, &property_match).await?;
    let detail = lock_match(&mut tx, property_match.id).await?;

    record_audit_tx(
        &mut tx,
        NewAuditEntry::created(EntityType::PropertyMatch, property_match.id, &property_match)?
            .by(&ctx),
    )
    .await?;
    record_activity_tx(
        &mut tx,
        match_activity(&detail, "Created", "Property matched")
            .with_metadata(json!({
                "propertyId": property.id,
                "matchScore": score,
                "scoreComputed": req.match_score.is_none(),
            }))
            .by(&ctx),
    )
    .await?;
    tx.commit().await?;

    tracing::info!(
        match_id = %property_match.id,
        housing_search_id = %criteria.housing_search_id,
        property_id = %property.id,
        score,
        "Property match created"
    );
    Ok((StatusCode::CREATED, Json(detail)))
}

/// **GET /api/property-matches/{id}**
pub async fn get_match(
    AuthUser(_ctx): AuthUser,
    State(state): State<PropertiesState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MatchDetail>> {
    let detail = state
        .repos
        .matches
        .find_detail(id)
        .await?
        .ok_or_else(|| Error::not_found("PropertyMatch", id))?;
    Ok(Json(detail))
}

/// **GET /api/housing-searches/{id}/matches**
pub async fn list_for_search(
    AuthUser(_ctx): AuthUser,
    State(state): State<PropertiesState>,
    Path(housing_search_id): Path<Uuid>,
) -> Result<Json<Vec<MatchDetail>>> {
    if !state
        .repos
        .matches
        .housing_search_exists(housing_search_id)
        .await?
    {
        return Err(Error::not_found("HousingSearch", housing_search_id));
    }
    let matches = state.repos.matches.list_for_search(housing_search_id).await?;
    Ok(Json(matches))
}

/// **GET /api/properties/{id}/matches**
pub async fn list_for_property(
    AuthUser(_ctx): AuthUser,
    State(state): State<PropertiesState>,
    Path(property_id): Path<Uuid>,
) -> Result<Json<Vec<MatchDetail>>> {
    if state.repos.properties.find(property_id).await?.is_none() {
        return Err(Error::not_found("Property", property_id));
    }
    let matches = state.repos.matches.list_for_property(property_id).await?;
    Ok(Json(matches))
}

/// **PUT /api/property-matches/{id}**
pub async fn update_match(
    AuthUser(ctx): AuthUser,
    State(state): State<PropertiesState>,
    Path(id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<UpdateMatchRequest>,
) -> Result<Json<MatchDetail>> {
    let mut tx = state.repos.begin().await?;
    let mut detail = lock_match(&mut tx, id).await?;
    let before = detail.property_match.clone();

    detail.property_match.update_details(req.notes, req.match_score)?;
    let activity = match_activity(&detail, "Updated", "Match details updated");
    save_match_change(&mut tx, &ctx, &before, &mut detail, activity).await?;
    tx.commit().await?;

    Ok(Json(detail))
}

/// **PUT /api/property-matches/{id}/status**
pub async fn change_status(
    AuthUser(ctx): AuthUser,
    State(state): State<PropertiesState>,
    Path(id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<ChangeMatchStatusRequest>,
) -> Result<Json<MatchDetail>> {
    let next: MatchStatus = req.status.parse()?;

    let mut tx = state.repos.begin().await?;
    let mut detail = lock_match(&mut tx, id).await?;
    let before = detail.property_match.clone();

    let previous = detail.property_match.change_status(next)?;
    let activity = match_activity(
        &detail,
        "StatusChanged",
        &format!("Match moved from {} to {}", previous, next),
    )
    .with_metadata(json!({ "fromStatus": previous, "toStatus": next }));
    save_match_change(&mut tx, &ctx, &before, &mut detail, activity).await?;
    tx.commit().await?;

    Ok(Json(detail))
}

/// Record an offer on the property
///
/// **PUT /api/property-matches/{id}/offer**
pub async fn make_offer(
    AuthUser(ctx): AuthUser,
    State(state): State<PropertiesState>,
    Path(id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<OfferRequest>,
) -> Result<Json<MatchDetail>> {
    let mut tx = state.repos.begin().await?;
    let mut detail = lock_match(&mut tx, id).await?;
    let before = detail.property_match.clone();

    let previous = detail.property_match.make_offer(req.amount)?;
    let activity = match_activity(
        &detail,
        "OfferMade",
        &format!("Offer of ${} made", req.amount),
    )
    .with_metadata(json!({ "amount": req.amount, "fromStatus": previous }));
    save_match_change(&mut tx, &ctx, &before, &mut detail, activity).await?;
    tx.commit().await?;

    Ok(Json(detail))
}

/// Ask for showings on several matches at once.
///
/// **POST /api/property-matches/request-showings**
///
/// Only matches still in `MatchIdentified` move; the rest and unknown ids
/// are left alone and not counted.
pub async fn request_showings(
    AuthUser(ctx): AuthUser,
    State(state): State<PropertiesState>,
    ValidatedJson(req): ValidatedJson<RequestShowingsRequest>,
) -> Result<Json<RequestShowingsResponse>> {
    let mut ids = req.match_ids;
    ids.sort_unstable();
    ids.dedup();

    let mut tx = state.repos.begin().await?;
    let details = find_match_details_for_update_tx(&mut tx, &ids).await?;

    let mut requested_count = 0;
    for mut detail in details {
        let before = detail.property_match.clone();
        if !detail.property_match.request_showing() {
            continue;
        }
        let activity = match_activity(&detail, "ShowingRequested", "Showing requested");
        save_match_change(&mut tx, &ctx, &before, &mut detail, activity).await?;
        requested_count += 1;
    }
    tx.commit().await?;

    tracing::info!(
        requested = requested_count,
        submitted = ids.len(),
        "Showings requested"
    );
    Ok(Json(RequestShowingsResponse { requested_count }))
}

/// Hard delete; the match's showings go with it
///
/// **DELETE /api/property-matches/{id}**
pub async fn delete_match(
    AuthUser(ctx): AuthUser,
    State(state): State<PropertiesState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    let mut tx = state.repos.begin().await?;
    let detail = lock_match(&mut tx, id).await?;
    delete_match_tx(&mut tx, id).await?;

    record_audit_tx(
        &mut tx,
        NewAuditEntry::deleted(EntityType::PropertyMatch, id, &detail.property_match)?.by(&ctx),
    )
    .await?;
    record_activity_tx(
        &mut tx,
        match_activity(&detail, "Deleted", "Match removed").by(&ctx),
    )
    .await?;
    tx.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_score_bounds() {
        let req = CreateMatchRequest {
            housing_search_id: Uuid::new_v4(),
            property_id: Uuid::new_v4(),
            match_score: Some(120),
            notes: None,
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_request_showings_body_uses_camel_case() {
        let id = Uuid::new_v4();
        let req: RequestShowingsRequest =
            serde_json::from_value(json!({ "matchIds": [id] })).unwrap();
        assert_eq!(req.match_ids, vec![id]);

        let empty: RequestShowingsRequest =
            serde_json::from_value(json!({ "matchIds": [] })).unwrap();
        assert!(empty.validate().is_err());
    }

    #[test]
    fn test_requested_count_serializes_camel_case() {
        let body = serde_json::to_value(RequestShowingsResponse { requested_count: 2 }).unwrap();
        assert_eq!(body, json!({ "requestedCount": 2 }));
    }
}
