//! Applicant document handlers
//!
//! Files go to object storage before the metadata row is committed. A failed
//! commit leaves the object orphaned in the bucket.

use std::time::Duration;

use axum::{extract::State, http::StatusCode, Json};
use relocrm_activity::{
    record_activity_tx, record_audit_tx, EntityType, NewActivity, NewAuditEntry,
};
use relocrm_auth::AuthContext;
use relocrm_common::{parse_optional, Error, MultipartForm, Path, Query, Result};
use relocrm_storage::PresignedUrl;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::api::middleware::{ApplicantsState, AuthUser};
use crate::domain::documents::{resolve_document_content_type, ApplicantDocument, DocumentType};
use crate::domain::housing::HousingSearchStage;
use crate::domain::requirements::StageRequirements;
use crate::repository::{delete_document_tx, insert_document_tx, load_stage_requirements};

/// Lifetime of presigned download links
pub const DOWNLOAD_URL_TTL: Duration = Duration::from_secs(15 * 60);

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageRequirementsQuery {
    pub from_stage: Option<String>,
    pub to_stage: Option<String>,
}

async fn ensure_applicant(state: &ApplicantsState, applicant_id: Uuid) -> Result<()> {
    match state.repos.applicants.find(applicant_id).await? {
        Some(_) => Ok(()),
        None => Err(Error::not_found("Applicant", applicant_id)),
    }
}

async fn persist_document(
    state: &ApplicantsState,
    ctx: &AuthContext,
    document: &ApplicantDocument,
    document_type: &DocumentType,
) -> Result<ApplicantDocument> {
    let mut tx = state.repos.begin().await?;
    let document = insert_document_tx(&mut tx, document).await?;

    record_audit_tx(
        &mut tx,
        NewAuditEntry::created(EntityType::ApplicantDocument, document.id, &document)?.by(ctx),
    )
    .await?;
    record_activity_tx(
        &mut tx,
        NewActivity::new(
            EntityType::ApplicantDocument,
            document.id,
            "Uploaded",
            format!(
                "Document uploaded: {} ({})",
                document.file_name, document_type.name
            ),
        )
        .for_applicant(Some(document.applicant_id))
        .with_metadata(json!({
            "documentTypeId": document_type.id,
            "sizeBytes": document.size_bytes,
        }))
        .by(ctx),
    )
    .await?;
    tx.commit().await?;

    Ok(document)
}

/// Upload a document for an applicant.
///
/// **POST /api/applicants/{id}/documents**
///
/// Multipart form with a `documentTypeId` text part and a `file` part.
pub async fn upload_document(
    AuthUser(ctx): AuthUser,
    State(state): State<ApplicantsState>,
    Path(applicant_id): Path<Uuid>,
    mut form: MultipartForm,
) -> Result<(StatusCode, Json<ApplicantDocument>)> {
    let document_type_id: Uuid = form
        .text("documentTypeId")
        .ok_or_else(|| Error::validation("documentTypeId is required"))?
        .parse()
        .map_err(|_| Error::validation("documentTypeId must be a valid UUID"))?;
    let file = form.require_file()?;

    ensure_applicant(&state, applicant_id).await?;
    let document_type = state
        .repos
        .document_types
        .find(document_type_id)
        .await?
        .filter(|t| t.is_active)
        .ok_or_else(|| Error::not_found("DocumentType", document_type_id))?;

    let content_type = resolve_document_content_type(file.content_type.as_deref(), &file.file_name)?;
    let document = ApplicantDocument::new(
        applicant_id,
        document_type_id,
        &file.file_name,
        content_type,
        file.bytes.len(),
        Some(ctx.user_id()),
    )?;

    state
        .storage
        .put_object(&document.storage_key, file.bytes, content_type)
        .await?;

    let document = persist_document(&state, &ctx, &document, &document_type).await?;

    tracing::info!(
        document_id = %document.id,
        applicant_id = %applicant_id,
        size_bytes = document.size_bytes,
        "Applicant document uploaded"
    );
    Ok((StatusCode::CREATED, Json(document)))
}

/// **GET /api/applicants/{id}/documents**
pub async fn list_documents(
    AuthUser(_ctx): AuthUser,
    State(state): State<ApplicantsState>,
    Path(applicant_id): Path<Uuid>,
) -> Result<Json<Vec<ApplicantDocument>>> {
    ensure_applicant(&state, applicant_id).await?;
    let documents = state
        .repos
        .documents
        .list_for_applicant(applicant_id)
        .await?;
    Ok(Json(documents))
}

/// Short-lived download link
///
/// **GET /api/documents/{id}/download-url**
pub async fn get_download_url(
    AuthUser(_ctx): AuthUser,
    State(state): State<ApplicantsState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PresignedUrl>> {
    let document = state
        .repos
        .documents
        .find(id)
        .await?
        .ok_or_else(|| Error::not_found("ApplicantDocument", id))?;

    let url = state
        .storage
        .presigned_get_url(&document.storage_key, DOWNLOAD_URL_TTL)
        .await?;
    Ok(Json(url))
}

/// Delete the metadata row, then the stored object on a best-effort basis
///
/// **DELETE /api/documents/{id}**
pub async fn delete_document(
    AuthUser(ctx): AuthUser,
    State(state): State<ApplicantsState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    let mut tx = state.repos.begin().await?;
    let document = delete_document_tx(&mut tx, id)
        .await?
        .ok_or_else(|| Error::not_found("ApplicantDocument", id))?;

    record_audit_tx(
        &mut tx,
        NewAuditEntry::deleted(EntityType::ApplicantDocument, id, &document)?.by(&ctx),
    )
    .await?;
    record_activity_tx(
        &mut tx,
        NewActivity::new(
            EntityType::ApplicantDocument,
            id,
            "Deleted",
            format!("Document deleted: {}", document.file_name),
        )
        .for_applicant(Some(document.applicant_id))
        .by(&ctx),
    )
    .await?;
    tx.commit().await?;

    if let Err(err) = state.storage.delete_object(&document.storage_key).await {
        tracing::warn!(
            document_id = %id,
            storage_key = %document.storage_key,
            error = %err,
            "Failed to delete stored document; object is orphaned"
        );
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Resolve the stage pair for a requirements query.
///
/// Missing stages fall back to the active search's stage and its first
/// forward transition.
fn resolve_stage_pair(
    from: Option<HousingSearchStage>,
    to: Option<HousingSearchStage>,
    active_stage: Option<HousingSearchStage>,
) -> Result<(HousingSearchStage, HousingSearchStage)> {
    let from = match from.or(active_stage) {
        Some(stage) => stage,
        None => {
            return Err(Error::validation(
                "Applicant has no active housing search; fromStage and toStage are required",
            ))
        }
    };
    let to = match to.or_else(|| from.next_stage()) {
        Some(stage) => stage,
        None => {
            return Err(Error::validation(format!(
                "Stage {} has no further transition",
                from
            )))
        }
    };
    Ok((from, to))
}

/// Document checklist for a stage transition
///
/// **GET /api/applicants/{id}/stage-requirements**
pub async fn get_stage_requirements(
    AuthUser(_ctx): AuthUser,
    State(state): State<ApplicantsState>,
    Path(applicant_id): Path<Uuid>,
    Query(query): Query<StageRequirementsQuery>,
) -> Result<Json<StageRequirements>> {
    ensure_applicant(&state, applicant_id).await?;

    let from = parse_optional(query.from_stage.as_deref())?;
    let to = parse_optional(query.to_stage.as_deref())?;
    let active_stage = if from.is_none() || to.is_none() {
        state
            .repos
            .housing_searches
            .find_active(applicant_id)
            .await?
            .map(|s| s.stage)
    } else {
        None
    };
    let (from, to) = resolve_stage_pair(from, to, active_stage)?;

    let mut conn = state.repos.pool().acquire().await?;
    let requirements = load_stage_requirements(&mut *conn, applicant_id, from, to).await?;
    Ok(Json(requirements))
}
