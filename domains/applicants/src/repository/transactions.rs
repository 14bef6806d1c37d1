//! Transactional free functions for the Applicants domain

use relocrm_common::db::conflict_on_unique;
use relocrm_common::Result;
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use super::applicants::{APPLICANT_COLUMNS, TAKEN_EMAIL_SQL};
use super::document_types::DOCUMENT_TYPE_COLUMNS;
use super::documents::DOCUMENT_COLUMNS;
use super::housing_searches::HOUSING_SEARCH_COLUMNS;
use super::stage_requirements::REQUIREMENT_COLUMNS;
use crate::domain::documents::{ApplicantDocument, DocumentType, StageTransitionRequirement};
use crate::domain::entities::Applicant;
use crate::domain::housing::HousingSearch;

// ============================================================================
// Applicants
// ============================================================================

/// Lock an applicant row. Deleted rows are returned only with `include_deleted`.
pub async fn find_applicant_for_update_tx(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
    include_deleted: bool,
) -> Result<Option<Applicant>> {
    let query = format!(
        "SELECT {APPLICANT_COLUMNS} FROM applicants \
         WHERE id = $1 AND ($2 OR is_deleted = FALSE) FOR UPDATE"
    );
    let applicant = sqlx::query_as::<_, Applicant>(&query)
        .bind(id)
        .bind(include_deleted)
        .fetch_optional(&mut **tx)
        .await?;

    Ok(applicant)
}

/// First of `emails` used by another non-deleted applicant.
///
/// Takes a transaction-scoped advisory lock first so concurrent writers
/// check and insert in turn.
pub async fn find_taken_email_tx(
    tx: &mut Transaction<'_, Postgres>,
    emails: &[String],
    exclude: Option<Uuid>,
) -> Result<Option<String>> {
    if emails.is_empty() {
        return Ok(None);
    }
    sqlx::query("SELECT pg_advisory_xact_lock(hashtext('applicant_emails'))")
        .execute(&mut **tx)
        .await?;
    let taken: Option<String> = sqlx::query_scalar(TAKEN_EMAIL_SQL)
        .bind(emails)
        .bind(exclude)
        .fetch_optional(&mut **tx)
        .await?;

    Ok(taken)
}

pub async fn insert_applicant_tx(
    tx: &mut Transaction<'_, Postgres>,
    applicant: &Applicant,
) -> Result<Applicant> {
    let query = format!(
        "INSERT INTO applicants ({APPLICANT_COLUMNS}) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17) \
         RETURNING {APPLICANT_COLUMNS}"
    );
    let created = sqlx::query_as::<_, Applicant>(&query)
        .bind(applicant.id)
        .bind(&applicant.husband)
        .bind(&applicant.wife)
        .bind(&applicant.address)
        .bind(&applicant.phone)
        .bind(&applicant.current_kehila)
        .bind(&applicant.shabbos_shul)
        .bind(&applicant.children)
        .bind(applicant.status)
        .bind(&applicant.board_review)
        .bind(&applicant.notes)
        .bind(applicant.created_by)
        .bind(applicant.is_deleted)
        .bind(applicant.deleted_at)
        .bind(applicant.deleted_by)
        .bind(applicant.created_at)
        .bind(applicant.updated_at)
        .fetch_one(&mut **tx)
        .await?;

    Ok(created)
}

/// Persist every mutable column of an applicant
pub async fn update_applicant_tx(
    tx: &mut Transaction<'_, Postgres>,
    applicant: &Applicant,
) -> Result<Applicant> {
    let query = format!(
        "UPDATE applicants SET \
            husband = $2, wife = $3, address = $4, phone = $5, \
            current_kehila = $6, shabbos_shul = $7, children = $8, \
            status = $9, board_review = $10, notes = $11, \
            is_deleted = $12, deleted_at = $13, deleted_by = $14, updated_at = $15 \
         WHERE id = $1 RETURNING {APPLICANT_COLUMNS}"
    );
    let updated = sqlx::query_as::<_, Applicant>(&query)
        .bind(applicant.id)
        .bind(&applicant.husband)
        .bind(&applicant.wife)
        .bind(&applicant.address)
        .bind(&applicant.phone)
        .bind(&applicant.current_kehila)
        .bind(&applicant.shabbos_shul)
        .bind(&applicant.children)
        .bind(applicant.status)
        .bind(&applicant.board_review)
        .bind(&applicant.notes)
        .bind(applicant.is_deleted)
        .bind(applicant.deleted_at)
        .bind(applicant.deleted_by)
        .bind(applicant.updated_at)
        .fetch_one(&mut **tx)
        .await?;

    Ok(updated)
}

// ============================================================================
// Housing searches
// ============================================================================

pub async fn find_housing_search_for_update_tx(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
) -> Result<Option<HousingSearch>> {
    let query = format!(
        "SELECT {HOUSING_SEARCH_COLUMNS} FROM housing_searches WHERE id = $1 FOR UPDATE"
    );
    let search = sqlx::query_as::<_, HousingSearch>(&query)
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?;

    Ok(search)
}

pub async fn find_active_search_tx(
    tx: &mut Transaction<'_, Postgres>,
    applicant_id: Uuid,
) -> Result<Option<HousingSearch>> {
    let query = format!(
        "SELECT {HOUSING_SEARCH_COLUMNS} FROM housing_searches \
         WHERE applicant_id = $1 AND is_active = TRUE"
    );
    let search = sqlx::query_as::<_, HousingSearch>(&query)
        .bind(applicant_id)
        .fetch_optional(&mut **tx)
        .await?;

    Ok(search)
}

/// Insert a search. The partial unique index on active searches turns a
/// concurrent second active search into `Conflict`.
pub async fn insert_housing_search_tx(
    tx: &mut Transaction<'_, Postgres>,
    search: &HousingSearch,
) -> Result<HousingSearch> {
    let query = format!(
        "INSERT INTO housing_searches ({HOUSING_SEARCH_COLUMNS}) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) \
         RETURNING {HOUSING_SEARCH_COLUMNS}"
    );
    sqlx::query_as::<_, HousingSearch>(&query)
        .bind(search.id)
        .bind(search.applicant_id)
        .bind(search.stage)
        .bind(search.stage_changed_at)
        .bind(search.is_active)
        .bind(search.min_budget)
        .bind(search.max_budget)
        .bind(search.min_bedrooms)
        .bind(&search.preferred_areas)
        .bind(&search.notes)
        .bind(search.deactivated_at)
        .bind(search.created_at)
        .bind(search.updated_at)
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| conflict_on_unique(e, "Applicant already has an active housing search"))
}

pub async fn update_housing_search_tx(
    tx: &mut Transaction<'_, Postgres>,
    search: &HousingSearch,
) -> Result<HousingSearch> {
    let query = format!(
        "UPDATE housing_searches SET \
            stage = $2, stage_changed_at = $3, is_active = $4, \
            min_budget = $5, max_budget = $6, min_bedrooms = $7, \
            preferred_areas = $8, notes = $9, deactivated_at = $10, updated_at = $11 \
         WHERE id = $1 RETURNING {HOUSING_SEARCH_COLUMNS}"
    );
    let updated = sqlx::query_as::<_, HousingSearch>(&query)
        .bind(search.id)
        .bind(search.stage)
        .bind(search.stage_changed_at)
        .bind(search.is_active)
        .bind(search.min_budget)
        .bind(search.max_budget)
        .bind(search.min_bedrooms)
        .bind(&search.preferred_areas)
        .bind(&search.notes)
        .bind(search.deactivated_at)
        .bind(search.updated_at)
        .fetch_one(&mut **tx)
        .await?;

    Ok(updated)
}

// ============================================================================
// Document types and stage requirements
// ============================================================================

pub async fn find_document_type_for_update_tx(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
) -> Result<Option<DocumentType>> {
    let query =
        format!("SELECT {DOCUMENT_TYPE_COLUMNS} FROM document_types WHERE id = $1 FOR UPDATE");
    let document_type = sqlx::query_as::<_, DocumentType>(&query)
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?;

    Ok(document_type)
}

pub async fn insert_document_type_tx(
    tx: &mut Transaction<'_, Postgres>,
    document_type: &DocumentType,
) -> Result<DocumentType> {
    let query = format!(
        "INSERT INTO document_types ({DOCUMENT_TYPE_COLUMNS}) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {DOCUMENT_TYPE_COLUMNS}"
    );
    sqlx::query_as::<_, DocumentType>(&query)
        .bind(document_type.id)
        .bind(&document_type.name)
        .bind(&document_type.description)
        .bind(document_type.is_active)
        .bind(document_type.display_order)
        .bind(document_type.created_at)
        .bind(document_type.updated_at)
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| {
            conflict_on_unique(
                e,
                &format!("A document type named '{}' already exists", document_type.name),
            )
        })
}

pub async fn update_document_type_tx(
    tx: &mut Transaction<'_, Postgres>,
    document_type: &DocumentType,
) -> Result<DocumentType> {
    let query = format!(
        "UPDATE document_types SET name = $2, description = $3, is_active = $4, \
         display_order = $5, updated_at = $6 WHERE id = $1 RETURNING {DOCUMENT_TYPE_COLUMNS}"
    );
    sqlx::query_as::<_, DocumentType>(&query)
        .bind(document_type.id)
        .bind(&document_type.name)
        .bind(&document_type.description)
        .bind(document_type.is_active)
        .bind(document_type.display_order)
        .bind(document_type.updated_at)
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| {
            conflict_on_unique(
                e,
                &format!("A document type named '{}' already exists", document_type.name),
            )
        })
}

pub async fn insert_stage_requirement_tx(
    tx: &mut Transaction<'_, Postgres>,
    requirement: &StageTransitionRequirement,
) -> Result<StageTransitionRequirement> {
    let query = format!(
        "INSERT INTO stage_transition_requirements ({REQUIREMENT_COLUMNS}) \
         VALUES ($1, $2, $3, $4, $5, $6) RETURNING {REQUIREMENT_COLUMNS}"
    );
    sqlx::query_as::<_, StageTransitionRequirement>(&query)
        .bind(requirement.id)
        .bind(requirement.from_stage)
        .bind(requirement.to_stage)
        .bind(requirement.document_type_id)
        .bind(requirement.is_required)
        .bind(requirement.created_at)
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| {
            conflict_on_unique(
                e,
                &format!(
                    "A requirement for this document type already exists for {} to {}",
                    requirement.from_stage, requirement.to_stage
                ),
            )
        })
}

pub async fn update_stage_requirement_tx(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
    is_required: bool,
) -> Result<Option<StageTransitionRequirement>> {
    let query = format!(
        "UPDATE stage_transition_requirements SET is_required = $2 \
         WHERE id = $1 RETURNING {REQUIREMENT_COLUMNS}"
    );
    let updated = sqlx::query_as::<_, StageTransitionRequirement>(&query)
        .bind(id)
        .bind(is_required)
        .fetch_optional(&mut **tx)
        .await?;

    Ok(updated)
}

/// Hard delete; returns the removed row
pub async fn delete_stage_requirement_tx(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
) -> Result<Option<StageTransitionRequirement>> {
    let query = format!(
        "DELETE FROM stage_transition_requirements WHERE id = $1 RETURNING {REQUIREMENT_COLUMNS}"
    );
    let deleted = sqlx::query_as::<_, StageTransitionRequirement>(&query)
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?;

    Ok(deleted)
}

// ============================================================================
// Applicant documents
// ============================================================================

pub async fn insert_document_tx(
    tx: &mut Transaction<'_, Postgres>,
    document: &ApplicantDocument,
) -> Result<ApplicantDocument> {
    let query = format!(
        "INSERT INTO applicant_documents ({DOCUMENT_COLUMNS}) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING {DOCUMENT_COLUMNS}"
    );
    let created = sqlx::query_as::<_, ApplicantDocument>(&query)
        .bind(document.id)
        .bind(document.applicant_id)
        .bind(document.document_type_id)
        .bind(&document.file_name)
        .bind(&document.storage_key)
        .bind(&document.content_type)
        .bind(document.size_bytes)
        .bind(document.uploaded_by)
        .bind(document.uploaded_at)
        .fetch_one(&mut **tx)
        .await?;

    Ok(created)
}

/// Hard delete; returns the removed row
pub async fn delete_document_tx(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
) -> Result<Option<ApplicantDocument>> {
    let query = format!(
        "DELETE FROM applicant_documents WHERE id = $1 RETURNING {DOCUMENT_COLUMNS}"
    );
    let deleted = sqlx::query_as::<_, ApplicantDocument>(&query)
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?;

    Ok(deleted)
}
