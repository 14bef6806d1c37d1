//! Document type configuration handlers
//!
//! Reads are open to all staff; changes require an admin.

use axum::{extract::State, http::StatusCode, Json};
use relocrm_activity::{
    record_activity_tx, record_audit_tx, EntityType, NewActivity, NewAuditEntry,
};
use relocrm_common::{Error, Path, Query, Result, ValidatedJson};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::api::middleware::{AdminUser, ApplicantsState, AuthUser};
use crate::domain::documents::DocumentType;
use crate::repository::{
    find_document_type_for_update_tx, insert_document_type_tx, update_document_type_tx,
};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateDocumentTypeRequest {
    /// Display name, unique ignoring case (1-100 chars)
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    pub name: String,

    /// Optional description (max 500 chars)
    #[validate(length(max = 500))]
    pub description: Option<String>,

    /// Sort position in checklists
    #[serde(default)]
    pub display_order: i32,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDocumentTypeRequest {
    /// Display name, unique ignoring case (1-100 chars)
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    pub name: String,

    /// Optional description (max 500 chars)
    #[validate(length(max = 500))]
    pub description: Option<String>,

    /// New sort position; unchanged when absent
    pub display_order: Option<i32>,
    /// Reactivate or deactivate the type
    pub is_active: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentTypeQuery {
    pub include_inactive: Option<bool>,
}

/// **POST /api/document-types**
pub async fn create_document_type(
    AdminUser(ctx): AdminUser,
    State(state): State<ApplicantsState>,
    ValidatedJson(req): ValidatedJson<CreateDocumentTypeRequest>,
) -> Result<(StatusCode, Json<DocumentType>)> {
    let document_type = DocumentType::new(&req.name, req.description, req.display_order)?;

    let mut tx = state.repos.begin().await?;
    let document_type = insert_document_type_tx(&mut tx, &document_type).await?;
    record_audit_tx(
        &mut tx,
        NewAuditEntry::created(EntityType::DocumentType, document_type.id, &document_type)?
            .by(&ctx),
    )
    .await?;
    record_activity_tx(
        &mut tx,
        NewActivity::new(
            EntityType::DocumentType,
            document_type.id,
            "Created",
            format!("Document type created: {}", document_type.name),
        )
        .by(&ctx),
    )
    .await?;
    tx.commit().await?;

    Ok((StatusCode::CREATED, Json(document_type)))
}

/// **GET /api/document-types**
pub async fn list_document_types(
    AuthUser(_ctx): AuthUser,
    State(state): State<ApplicantsState>,
    Query(query): Query<DocumentTypeQuery>,
) -> Result<Json<Vec<DocumentType>>> {
    let types = state
        .repos
        .document_types
        .list(query.include_inactive.unwrap_or(false))
        .await?;
    Ok(Json(types))
}

pub async fn get_document_type(
    AuthUser(_ctx): AuthUser,
    State(state): State<ApplicantsState>,
    Path(id): Path<Uuid>,
) -> Result<Json<DocumentType>> {
    let document_type = state
        .repos
        .document_types
        .find(id)
        .await?
        .ok_or_else(|| Error::not_found("DocumentType", id))?;
    Ok(Json(document_type))
}

/// **PUT /api/document-types/{id}**
pub async fn update_document_type(
    AdminUser(ctx): AdminUser,
    State(state): State<ApplicantsState>,
    Path(id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<UpdateDocumentTypeRequest>,
) -> Result<Json<DocumentType>> {
    let mut tx = state.repos.begin().await?;
    let mut document_type = find_document_type_for_update_tx(&mut tx, id)
        .await?
        .ok_or_else(|| Error::not_found("DocumentType", id))?;
    let before = document_type.clone();

    document_type.update(
        &req.name,
        req.description,
        req.display_order.unwrap_or(before.display_order),
        req.is_active.unwrap_or(before.is_active),
    )?;
    let document_type = update_document_type_tx(&mut tx, &document_type).await?;

    record_audit_tx(
        &mut tx,
        NewAuditEntry::updated(EntityType::DocumentType, id, &before, &document_type)?.by(&ctx),
    )
    .await?;
    record_activity_tx(
        &mut tx,
        NewActivity::new(
            EntityType::DocumentType,
            id,
            "Updated",
            format!("Document type updated: {}", document_type.name),
        )
        .by(&ctx),
    )
    .await?;
    tx.commit().await?;

    Ok(Json(document_type))
}

/// Soft deactivate; existing uploads keep their type
///
/// **DELETE /api/document-types/{id}**
pub async fn deactivate_document_type(
    AdminUser(ctx): AdminUser,
    State(state): State<ApplicantsState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    let mut tx = state.repos.begin().await?;
    let mut document_type = find_document_type_for_update_tx(&mut tx, id)
        .await?
        .ok_or_else(|| Error::not_found("DocumentType", id))?;
    let before = document_type.clone();

    if !document_type.deactivate() {
        return Ok(StatusCode::NO_CONTENT);
    }
    let document_type = update_document_type_tx(&mut tx, &document_type).await?;

    record_audit_tx(
        &mut tx,
        NewAuditEntry::updated(EntityType::DocumentType, id, &before, &document_type)?.by(&ctx),
    )
    .await?;
    record_activity_tx(
        &mut tx,
        NewActivity::new(
            EntityType::DocumentType,
            id,
            "Deactivated",
            format!("Document type deactivated: {}", document_type.name),
        )
        .by(&ctx),
    )
    .await?;
    tx.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}
