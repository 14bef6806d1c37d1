//! Transactional free functions for the Properties domain

use relocrm_common::db::conflict_on_unique;
use relocrm_common::Result;
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use super::matches::{CRITERIA_SELECT, MATCH_COLUMNS, MATCH_DETAIL_SELECT};
use super::photos::PHOTO_COLUMNS;
use super::properties::PROPERTY_COLUMNS;
use super::showings::SHOWING_COLUMNS;
use crate::domain::entities::Property;
use crate::domain::matches::{MatchCriteria, MatchDetail, PropertyMatch};
use crate::domain::photos::PropertyPhoto;
use crate::domain::showings::Showing;

// ============================================================================
// Properties
// ============================================================================

/// Lock a property row. Deleted rows are returned only with `include_deleted`.
pub async fn find_property_for_update_tx(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
    include_deleted: bool,
) -> Result<Option<Property>> {
    let query = format!(
        "SELECT {PROPERTY_COLUMNS} FROM properties \
         WHERE id = $1 AND ($2 OR is_deleted = FALSE) FOR UPDATE"
    );
    let property = sqlx::query_as::<_, Property>(&query)
        .bind(id)
        .bind(include_deleted)
        .fetch_optional(&mut **tx)
        .await?;

    Ok(property)
}

pub async fn insert_property_tx(
    tx: &mut Transaction<'_, Postgres>,
    property: &Property,
) -> Result<Property> {
    let query = format!(
        "INSERT INTO properties ({PROPERTY_COLUMNS}) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17) \
         RETURNING {PROPERTY_COLUMNS}"
    );
    let created = sqlx::query_as::<_, Property>(&query)
        .bind(property.id)
        .bind(&property.address)
        .bind(property.price)
        .bind(property.bedrooms)
        .bind(property.bathrooms)
        .bind(property.square_feet)
        .bind(property.property_type)
        .bind(property.status)
        .bind(&property.mls_number)
        .bind(&property.listing_url)
        .bind(&property.description)
        .bind(property.created_by)
        .bind(property.is_deleted)
        .bind(property.deleted_at)
        .bind(property.deleted_by)
        .bind(property.created_at)
        .bind(property.updated_at)
        .fetch_one(&mut **tx)
        .await?;

    Ok(created)
}

pub async fn update_property_tx(
    tx: &mut Transaction<'_, Postgres>,
    property: &Property,
) -> Result<Property> {
    let query = format!(
        "UPDATE properties SET \
            address = $2, price = $3, bedrooms = $4, bathrooms = $5, square_feet = $6, \
            property_type = $7, status = $8, mls_number = $9, listing_url = $10, \
            description = $11, is_deleted = $12, deleted_at = $13, deleted_by = $14, \
            updated_at = $15 \
         WHERE id = $1 \
         RETURNING {PROPERTY_COLUMNS}"
    );
    let updated = sqlx::query_as::<_, Property>(&query)
        .bind(property.id)
        .bind(&property.address)
        .bind(property.price)
        .bind(property.bedrooms)
        .bind(property.bathrooms)
        .bind(property.square_feet)
        .bind(property.property_type)
        .bind(property.status)
        .bind(&property.mls_number)
        .bind(&property.listing_url)
        .bind(&property.description)
        .bind(property.is_deleted)
        .bind(property.deleted_at)
        .bind(property.deleted_by)
        .bind(property.updated_at)
        .fetch_one(&mut **tx)
        .await?;

    Ok(updated)
}

/// Drop cached shul distances after a property moves
pub async fn clear_property_distances_tx(
    tx: &mut Transaction<'_, Postgres>,
    property_id: Uuid,
) -> Result<u64> {
    let result = sqlx::query("DELETE FROM property_shul_distances WHERE property_id = $1")
        .bind(property_id)
        .execute(&mut **tx)
        .await?;

    Ok(result.rows_affected())
}

// ============================================================================
// Photos
// ============================================================================

/// Photos of a property. Callers lock the property row first.
pub async fn list_photos_tx(
    tx: &mut Transaction<'_, Postgres>,
    property_id: Uuid,
) -> Result<Vec<PropertyPhoto>> {
    let query = format!(
        "SELECT {PHOTO_COLUMNS} FROM property_photos \
         WHERE property_id = $1 ORDER BY display_order, uploaded_at"
    );
    let photos = sqlx::query_as::<_, PropertyPhoto>(&query)
        .bind(property_id)
        .fetch_all(&mut **tx)
        .await?;

    Ok(photos)
}

pub async fn insert_photo_tx(
    tx: &mut Transaction<'_, Postgres>,
    photo: &PropertyPhoto,
) -> Result<PropertyPhoto> {
    let query = format!(
        "INSERT INTO property_photos ({PHOTO_COLUMNS}) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
         RETURNING {PHOTO_COLUMNS}"
    );
    let created = sqlx::query_as::<_, PropertyPhoto>(&query)
        .bind(photo.id)
        .bind(photo.property_id)
        .bind(&photo.storage_key)
        .bind(&photo.file_name)
        .bind(&photo.content_type)
        .bind(photo.size_bytes)
        .bind(photo.display_order)
        .bind(photo.is_primary)
        .bind(photo.uploaded_at)
        .fetch_one(&mut **tx)
        .await?;

    Ok(created)
}

pub async fn delete_photo_tx(tx: &mut Transaction<'_, Postgres>, photo_id: Uuid) -> Result<()> {
    sqlx::query("DELETE FROM property_photos WHERE id = $1")
        .bind(photo_id)
        .execute(&mut **tx)
        .await?;

    Ok(())
}

/// Write display order and primary flag for every photo in one statement
pub async fn save_photo_order_tx(
    tx: &mut Transaction<'_, Postgres>,
    photos: &[PropertyPhoto],
) -> Result<()> {
    if photos.is_empty() {
        return Ok(());
    }
    let ids: Vec<Uuid> = photos.iter().map(|p| p.id).collect();
    let orders: Vec<i32> = photos.iter().map(|p| p.display_order).collect();
    let primaries: Vec<bool> = photos.iter().map(|p| p.is_primary).collect();

    sqlx::query(
        "UPDATE property_photos AS p SET display_order = v.display_order, is_primary = v.is_primary \
         FROM UNNEST($1::uuid[], $2::int[], $3::bool[]) AS v(id, display_order, is_primary) \
         WHERE p.id = v.id",
    )
    .bind(&ids)
    .bind(&orders)
    .bind(&primaries)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

// ============================================================================
// Matches
// ============================================================================

pub async fn find_match_criteria_tx(
    tx: &mut Transaction<'_, Postgres>,
    housing_search_id: Uuid,
) -> Result<Option<MatchCriteria>> {
    let query = format!("{CRITERIA_SELECT} WHERE id = $1 FOR SHARE");
    let criteria = sqlx::query_as::<_, MatchCriteria>(&query)
        .bind(housing_search_id)
        .fetch_optional(&mut **tx)
        .await?;

    Ok(criteria)
}

pub async fn insert_match_tx(
    tx: &mut Transaction<'_, Postgres>,
    property_match: &PropertyMatch,
) -> Result<PropertyMatch> {
    let query = format!(
        "INSERT INTO property_matches ({MATCH_COLUMNS}) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
         RETURNING {MATCH_COLUMNS}"
    );
    let created = sqlx::query_as::<_, PropertyMatch>(&query)
        .bind(property_match.id)
        .bind(property_match.housing_search_id)
        .bind(property_match.property_id)
        .bind(property_match.status)
        .bind(property_match.match_score)
        .bind(&property_match.notes)
        .bind(property_match.offer_amount)
        .bind(property_match.created_by)
        .bind(property_match.created_at)
        .bind(property_match.updated_at)
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| conflict_on_unique(e, "This property is already matched to the housing search"))?;

    Ok(created)
}

/// Lock a match row and read it with its applicant and property
pub async fn find_match_detail_for_update_tx(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
) -> Result<Option<MatchDetail>> {
    let query = format!("{MATCH_DETAIL_SELECT} WHERE m.id = $1 FOR UPDATE OF m");
    let detail = sqlx::query_as::<_, MatchDetail>(&query)
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?;

    Ok(detail)
}

/// Lock several matches at once; unknown ids are skipped
pub async fn find_match_details_for_update_tx(
    tx: &mut Transaction<'_, Postgres>,
    ids: &[Uuid],
) -> Result<Vec<MatchDetail>> {
    let query = format!("{MATCH_DETAIL_SELECT} WHERE m.id = ANY($1) ORDER BY m.id FOR UPDATE OF m");
    let details = sqlx::query_as::<_, MatchDetail>(&query)
        .bind(ids)
        .fetch_all(&mut **tx)
        .await?;

    Ok(details)
}

pub async fn update_match_tx(
    tx: &mut Transaction<'_, Postgres>,
    property_match: &PropertyMatch,
) -> Result<PropertyMatch> {
    let query = format!(
        "UPDATE property_matches SET \
            status = $2, match_score = $3, notes = $4, offer_amount = $5, updated_at = $6 \
         WHERE id = $1 \
         RETURNING {MATCH_COLUMNS}"
    );
    let updated = sqlx::query_as::<_, PropertyMatch>(&query)
        .bind(property_match.id)
        .bind(property_match.status)
        .bind(property_match.match_score)
        .bind(&property_match.notes)
        .bind(property_match.offer_amount)
        .bind(property_match.updated_at)
        .fetch_one(&mut **tx)
        .await?;

    Ok(updated)
}

/// Hard delete; showings go with it through the foreign key cascade
pub async fn delete_match_tx(tx: &mut Transaction<'_, Postgres>, id: Uuid) -> Result<()> {
    sqlx::query("DELETE FROM property_matches WHERE id = $1")
        .bind(id)
        .execute(&mut **tx)
        .await?;

    Ok(())
}

// ============================================================================
// Showings
// ============================================================================

pub async fn find_showing_for_update_tx(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
) -> Result<Option<Showing>> {
    let query = format!("SELECT {SHOWING_COLUMNS} FROM showings WHERE id = $1 FOR UPDATE");
    let showing = sqlx::query_as::<_, Showing>(&query)
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?;

    Ok(showing)
}

pub async fn insert_showing_tx(
    tx: &mut Transaction<'_, Postgres>,
    showing: &Showing,
) -> Result<Showing> {
    let query = format!(
        "INSERT INTO showings ({SHOWING_COLUMNS}) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
         RETURNING {SHOWING_COLUMNS}"
    );
    let created = sqlx::query_as::<_, Showing>(&query)
        .bind(showing.id)
        .bind(showing.property_match_id)
        .bind(showing.scheduled_at)
        .bind(showing.duration_minutes)
        .bind(showing.status)
        .bind(&showing.notes)
        .bind(&showing.feedback)
        .bind(showing.completed_at)
        .bind(showing.created_by)
        .bind(showing.created_at)
        .bind(showing.updated_at)
        .fetch_one(&mut **tx)
        .await?;

    Ok(created)
}

pub async fn update_showing_tx(
    tx: &mut Transaction<'_, Postgres>,
    showing: &Showing,
) -> Result<Showing> {
    let query = format!(
        "UPDATE showings SET \
            scheduled_at = $2, duration_minutes = $3, status = $4, notes = $5, \
            feedback = $6, completed_at = $7, updated_at = $8 \
         WHERE id = $1 \
         RETURNING {SHOWING_COLUMNS}"
    );
    let updated = sqlx::query_as::<_, Showing>(&query)
        .bind(showing.id)
        .bind(showing.scheduled_at)
        .bind(showing.duration_minutes)
        .bind(showing.status)
        .bind(&showing.notes)
        .bind(&showing.feedback)
        .bind(showing.completed_at)
        .bind(showing.updated_at)
        .fetch_one(&mut **tx)
        .await?;

    Ok(updated)
}
