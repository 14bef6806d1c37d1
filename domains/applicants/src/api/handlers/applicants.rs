//! Applicant API handlers
//!
//! Every mutation writes its audit row and activity entry in the same
//! transaction as the change itself.

use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use relocrm_activity::{
    record_activity_tx, record_audit_tx, EntityType, NewActivity, NewAuditEntry,
};
use relocrm_auth::AuthContext;
use relocrm_common::{
    parse_optional, Error, PageRequest, PagedResult, Path, Query, Result, ValidatedJson,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::{Postgres, Transaction};
use uuid::Uuid;
use validator::Validate;

use crate::api::middleware::{ApplicantsState, AuthUser};
use crate::domain::entities::{Applicant, ApplicantInfo, ApplicantStatus, BoardDecision};
use crate::domain::housing::{HousingPreferences, HousingSearch};
use crate::repository::{
    find_active_search_tx, find_applicant_for_update_tx, find_taken_email_tx,
    insert_applicant_tx, insert_housing_search_tx, update_applicant_tx, ApplicantFilter,
    ApplicantSort,
};

/// Query filters for `GET /api/applicants`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicantQuery {
    /// Applicant status, case-insensitive
    pub status: Option<String>,
    /// Board decision, case-insensitive
    pub board_decision: Option<String>,
    /// Matched against both spouses' names and emails
    pub search: Option<String>,
    /// Include soft-deleted applicants (default false)
    pub include_deleted: Option<bool>,
    /// `createdAt` (default), `lastName` or `status`
    pub sort_by: Option<String>,
    /// Defaults to newest first for `createdAt`, ascending otherwise
    pub sort_descending: Option<bool>,
}

impl ApplicantQuery {
    fn into_filter(self) -> Result<ApplicantFilter> {
        let sort = ApplicantSort::parse(self.sort_by.as_deref())?;
        Ok(ApplicantFilter {
            status: parse_optional(self.status.as_deref())?,
            board_decision: parse_optional(self.board_decision.as_deref())?,
            search: self
                .search
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            include_deleted: self.include_deleted.unwrap_or(false),
            descending: self
                .sort_descending
                .unwrap_or_else(|| sort.default_descending()),
            sort,
        })
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChangeStatusRequest {
    /// Target status
    #[validate(length(min = 1, message = "Status is required"))]
    pub status: String,

    /// Recorded in the activity metadata
    #[validate(length(max = 1000))]
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BoardReviewRequest {
    /// Board decision, e.g. `Approved` or `Deferred`
    #[validate(length(min = 1, message = "Decision is required"))]
    pub decision: String,

    /// Board notes (max 4000 chars)
    #[validate(length(max = 4000))]
    pub notes: Option<String>,

    /// Defaults to now once a decision is made
    pub decision_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailExistsQuery {
    /// Email to look up, compared case-insensitively
    #[serde(default)]
    pub email: String,
    /// Applicant whose own emails are ignored
    pub exclude_applicant_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct EmailExistsResponse {
    pub exists: bool,
}

/// Applicant with its active search and document count
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicantDetail {
    #[serde(flatten)]
    pub applicant: Applicant,
    pub active_housing_search: Option<HousingSearch>,
    pub document_count: i64,
}

/// Fail with `DuplicateEmail` if another live applicant uses one of the emails
async fn ensure_emails_available(
    tx: &mut Transaction<'_, Postgres>,
    applicant: &Applicant,
    exclude: Option<Uuid>,
) -> Result<()> {
    if let Some(taken) = find_taken_email_tx(tx, &applicant.emails(), exclude).await? {
        return Err(Error::DuplicateEmail(format!(
            "An applicant with the email '{}' already exists",
            taken
        )));
    }
    Ok(())
}

async fn lock_applicant(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
    include_deleted: bool,
) -> Result<Applicant> {
    find_applicant_for_update_tx(tx, id, include_deleted)
        .await?
        .ok_or_else(|| Error::not_found("Applicant", id))
}

fn applicant_activity(applicant: &Applicant, action: &str, description: String) -> NewActivity {
    NewActivity::new(EntityType::Applicant, applicant.id, action, description)
        .for_applicant(Some(applicant.id))
}

/// Write the audit diff and activity entry for an applicant update
async fn log_applicant_change(
    tx: &mut Transaction<'_, Postgres>,
    ctx: &AuthContext,
    before: &Applicant,
    after: &Applicant,
    activity: NewActivity,
) -> Result<()> {
    record_audit_tx(
        tx,
        NewAuditEntry::updated(EntityType::Applicant, after.id, before, after)?.by(ctx),
    )
    .await?;
    record_activity_tx(tx, activity.by(ctx)).await?;
    Ok(())
}

/// Create an applicant
///
/// **POST /api/applicants**
pub async fn create_applicant(
    AuthUser(ctx): AuthUser,
    State(state): State<ApplicantsState>,
    ValidatedJson(req): ValidatedJson<ApplicantInfo>,
) -> Result<(StatusCode, Json<Applicant>)> {
    let applicant = Applicant::new(req, Some(ctx.user_id()))?;

    let mut tx = state.repos.begin().await?;
    ensure_emails_available(&mut tx, &applicant, None).await?;
    let applicant = insert_applicant_tx(&mut tx, &applicant).await?;

    record_audit_tx(
        &mut tx,
        NewAuditEntry::created(EntityType::Applicant, applicant.id, &applicant)?.by(&ctx),
    )
    .await?;
    let description = format!("Applicant created: {} family", applicant.family_name());
    record_activity_tx(
        &mut tx,
        applicant_activity(&applicant, "Created", description).by(&ctx),
    )
    .await?;
    tx.commit().await?;

    tracing::info!(applicant_id = %applicant.id, user_id = %ctx.user_id(), "Applicant created");
    Ok((StatusCode::CREATED, Json(applicant)))
}

/// List applicants
///
/// **GET /api/applicants**
pub async fn list_applicants(
    AuthUser(_ctx): AuthUser,
    State(state): State<ApplicantsState>,
    Query(page): Query<PageRequest>,
    Query(query): Query<ApplicantQuery>,
) -> Result<Json<PagedResult<Applicant>>> {
    let filter = query.into_filter()?;
    let (applicants, total) = state.repos.applicants.list(&filter, &page).await?;
    Ok(Json(PagedResult::new(applicants, total, &page)))
}

/// Get one applicant with the active housing search and document count
///
/// **GET /api/applicants/{id}**
pub async fn get_applicant(
    AuthUser(_ctx): AuthUser,
    State(state): State<ApplicantsState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApplicantDetail>> {
    let applicant = state
        .repos
        .applicants
        .find(id)
        .await?
        .ok_or_else(|| Error::not_found("Applicant", id))?;

    let active_housing_search = state.repos.housing_searches.find_active(id).await?;
    let document_count = state.repos.documents.count_for_applicant(id).await?;

    Ok(Json(ApplicantDetail {
        applicant,
        active_housing_search,
        document_count,
    }))
}

/// Replace an applicant's information
///
/// **PUT /api/applicants/{id}**
pub async fn update_applicant(
    AuthUser(ctx): AuthUser,
    State(state): State<ApplicantsState>,
    Path(id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<ApplicantInfo>,
) -> Result<Json<Applicant>> {
    let mut tx = state.repos.begin().await?;
    let mut applicant = lock_applicant(&mut tx, id, false).await?;
    let before = applicant.clone();

    applicant.update_info(req)?;
    ensure_emails_available(&mut tx, &applicant, Some(id)).await?;
    let applicant = update_applicant_tx(&mut tx, &applicant).await?;

    let description = format!("Applicant updated: {} family", applicant.family_name());
    log_applicant_change(
        &mut tx,
        &ctx,
        &before,
        &applicant,
        applicant_activity(&applicant, "Updated", description),
    )
    .await?;
    tx.commit().await?;

    Ok(Json(applicant))
}

/// Soft delete an applicant. Deleting twice is a no-op.
///
/// **DELETE /api/applicants/{id}**
pub async fn delete_applicant(
    AuthUser(ctx): AuthUser,
    State(state): State<ApplicantsState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    let mut tx = state.repos.begin().await?;
    let mut applicant = lock_applicant(&mut tx, id, true).await?;
    let before = applicant.clone();

    if !applicant.soft_delete(ctx.user_id()) {
        return Ok(StatusCode::NO_CONTENT);
    }
    let applicant = update_applicant_tx(&mut tx, &applicant).await?;

    record_audit_tx(
        &mut tx,
        NewAuditEntry::deleted(EntityType::Applicant, id, &before)?.by(&ctx),
    )
    .await?;
    let description = format!("Applicant deleted: {} family", applicant.family_name());
    record_activity_tx(
        &mut tx,
        applicant_activity(&applicant, "Deleted", description).by(&ctx),
    )
    .await?;
    tx.commit().await?;

    tracing::info!(applicant_id = %id, user_id = %ctx.user_id(), "Applicant soft-deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Undo a soft delete
///
/// **POST /api/applicants/{id}/restore**
pub async fn restore_applicant(
    AuthUser(ctx): AuthUser,
    State(state): State<ApplicantsState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Applicant>> {
    let mut tx = state.repos.begin().await?;
    let mut applicant = lock_applicant(&mut tx, id, true).await?;
    let before = applicant.clone();

    if !applicant.restore() {
        return Ok(Json(applicant));
    }
    // Another applicant may have claimed the emails while this one was deleted
    ensure_emails_available(&mut tx, &applicant, Some(id)).await?;
    let applicant = update_applicant_tx(&mut tx, &applicant).await?;

    record_audit_tx(
        &mut tx,
        NewAuditEntry::restored(EntityType::Applicant, id, &before, &applicant)?.by(&ctx),
    )
    .await?;
    let description = format!("Applicant restored: {} family", applicant.family_name());
    record_activity_tx(
        &mut tx,
        applicant_activity(&applicant, "Restored", description).by(&ctx),
    )
    .await?;
    tx.commit().await?;

    Ok(Json(applicant))
}

/// Move an applicant to another status
///
/// **PUT /api/applicants/{id}/status**
pub async fn change_status(
    AuthUser(ctx): AuthUser,
    State(state): State<ApplicantsState>,
    Path(id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<ChangeStatusRequest>,
) -> Result<Json<Applicant>> {
    let next: ApplicantStatus = req.status.parse()?;

    let mut tx = state.repos.begin().await?;
    let mut applicant = lock_applicant(&mut tx, id, false).await?;
    let before = applicant.clone();

    let previous = applicant.change_status(next)?;
    let applicant = update_applicant_tx(&mut tx, &applicant).await?;

    let activity = applicant_activity(
        &applicant,
        "StatusChanged",
        format!("Status changed from {} to {}", previous, next),
    )
    .with_metadata(json!({
        "fromStatus": previous,
        "toStatus": next,
        "reason": req.reason,
    }));
    log_applicant_change(&mut tx, &ctx, &before, &applicant, activity).await?;
    tx.commit().await?;

    Ok(Json(applicant))
}

/// Record the board's decision.
///
/// **PUT /api/applicants/{id}/board-review**
///
/// Approval opens a housing search at `AwaitingAgreements` when the
/// applicant has no active one.
pub async fn record_board_review(
    AuthUser(ctx): AuthUser,
    State(state): State<ApplicantsState>,
    Path(id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<BoardReviewRequest>,
) -> Result<Json<Applicant>> {
    let decision: BoardDecision = req.decision.parse()?;

    let mut tx = state.repos.begin().await?;
    let mut applicant = lock_applicant(&mut tx, id, false).await?;
    let before = applicant.clone();

    let approved =
        applicant.record_board_review(decision, req.notes, req.decision_date, ctx.user_id())?;
    let applicant = update_applicant_tx(&mut tx, &applicant).await?;

    let activity = applicant_activity(
        &applicant,
        "BoardReviewRecorded",
        format!("Board review recorded: {}", decision),
    )
    .with_metadata(json!({ "decision": decision }));
    log_applicant_change(&mut tx, &ctx, &before, &applicant, activity).await?;

    if approved && find_active_search_tx(&mut tx, id).await?.is_none() {
        let search = HousingSearch::new(id, HousingPreferences::default())?;
        let search = insert_housing_search_tx(&mut tx, &search).await?;
        record_audit_tx(
            &mut tx,
            NewAuditEntry::created(EntityType::HousingSearch, search.id, &search)?.by(&ctx),
        )
        .await?;
        record_activity_tx(
            &mut tx,
            NewActivity::new(
                EntityType::HousingSearch,
                search.id,
                "Created",
                format!(
                    "Housing search opened for {} family after board approval",
                    applicant.family_name()
                ),
            )
            .for_applicant(Some(id))
            .by(&ctx),
        )
        .await?;
        tracing::info!(applicant_id = %id, housing_search_id = %search.id, "Housing search opened on approval");
    }
    tx.commit().await?;

    Ok(Json(applicant))
}

/// Whether an email is used by a live applicant
///
/// **GET /api/applicants/email-exists**
pub async fn email_exists(
    AuthUser(_ctx): AuthUser,
    State(state): State<ApplicantsState>,
    Query(query): Query<EmailExistsQuery>,
) -> Result<Json<EmailExistsResponse>> {
    if query.email.trim().is_empty() {
        return Err(Error::validation("Email is required"));
    }
    let exists = state
        .repos
        .applicants
        .email_exists(&query.email, query.exclude_applicant_id)
        .await?;
    Ok(Json(EmailExistsResponse { exists }))
}
