//! Property listing handlers

use axum::{extract::State, http::StatusCode, Json};
use relocrm_activity::{
    record_activity_tx, record_audit_tx, EntityType, NewActivity, NewAuditEntry,
};
use relocrm_common::{
    parse_optional, Error, PageRequest, PagedResult, Path, Query, Result, ValidatedJson,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::{Postgres, Transaction};
use uuid::Uuid;
use validator::Validate;

use super::photos::photo_views;
use crate::api::middleware::{AuthUser, PropertiesState};
use crate::domain::entities::{ListingStatus, Property, PropertyInfo};
use crate::domain::photos::PhotoView;
use crate::repository::{
    clear_property_distances_tx, find_property_for_update_tx, insert_property_tx,
    update_property_tx, PropertyFilter,
};

/// Query filters for `GET /api/properties`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyQuery {
    pub status: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub min_bedrooms: Option<i32>,
    pub city: Option<String>,
    pub search: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

impl PropertyQuery {
    fn into_filter(self) -> Result<PropertyFilter> {
        if let (Some(min), Some(max)) = (self.min_price, self.max_price) {
            if min > max {
                return Err(Error::validation("minPrice cannot exceed maxPrice"));
            }
        }
        Ok(PropertyFilter {
            status: parse_optional(self.status.as_deref())?,
            min_price: self.min_price,
            max_price: self.max_price,
            min_bedrooms: self.min_bedrooms,
            city: non_blank(self.city),
            search: non_blank(self.search),
        })
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChangeListingStatusRequest {
    /// Target listing status
    #[validate(length(min = 1, message = "Status is required"))]
    pub status: String,
}

/// Property with its photo gallery
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDetail {
    #[serde(flatten)]
    pub property: Property,
    pub photos: Vec<PhotoView>,
}

pub(crate) async fn lock_property(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
    include_deleted: bool,
) -> Result<Property> {
    find_property_for_update_tx(tx, id, include_deleted)
        .await?
        .ok_or_else(|| Error::not_found("Property", id))
}

/// **POST /api/properties**
pub async fn create_property(
    AuthUser(ctx): AuthUser,
    State(state): State<PropertiesState>,
    ValidatedJson(req): ValidatedJson<PropertyInfo>,
) -> Result<(StatusCode, Json<Property>)> {
    let property = Property::new(req, Some(ctx.user_id()))?;

    let mut tx = state.repos.begin().await?;
    let property = insert_property_tx(&mut tx, &property).await?;

    record_audit_tx(
        &mut tx,
        NewAuditEntry::created(EntityType::Property, property.id, &property)?.by(&ctx),
    )
    .await?;
    record_activity_tx(
        &mut tx,
        NewActivity::new(
            EntityType::Property,
            property.id,
            "Created",
            format!("Property listed: {}", property.street()),
        )
        .with_metadata(json!({ "price": property.price, "bedrooms": property.bedrooms }))
        .by(&ctx),
    )
    .await?;
    tx.commit().await?;

    tracing::info!(property_id = %property.id, user_id = %ctx.user_id(), "Property created");
    Ok((StatusCode::CREATED, Json(property)))
}

/// **GET /api/properties**
pub async fn list_properties(
    AuthUser(_ctx): AuthUser,
    State(state): State<PropertiesState>,
    Query(page): Query<PageRequest>,
    Query(query): Query<PropertyQuery>,
) -> Result<Json<PagedResult<Property>>> {
    let filter = query.into_filter()?;
    let (properties, total) = state.repos.properties.list(&filter, &page).await?;
    Ok(Json(PagedResult::new(properties, total, &page)))
}

/// Get a property with presigned photo links
///
/// **GET /api/properties/{id}**
pub async fn get_property(
    AuthUser(_ctx): AuthUser,
    State(state): State<PropertiesState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PropertyDetail>> {
    let property = state
        .repos
        .properties
        .find(id)
        .await?
        .ok_or_else(|| Error::not_found("Property", id))?;

    let photos = state.repos.photos.list_for_property(id).await?;
    let photos = photo_views(state.storage.as_ref(), photos).await?;

    Ok(Json(PropertyDetail { property, photos }))
}

/// Replace the listing details. Moving the coordinates drops cached shul
/// distances.
///
/// **PUT /api/properties/{id}**
pub async fn update_property(
    AuthUser(ctx): AuthUser,
    State(state): State<PropertiesState>,
    Path(id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<PropertyInfo>,
) -> Result<Json<Property>> {
    let mut tx = state.repos.begin().await?;
    let mut property = lock_property(&mut tx, id, false).await?;
    let before = property.clone();

    let moved = property.update_info(req)?;
    let property = update_property_tx(&mut tx, &property).await?;
    if moved {
        let cleared = clear_property_distances_tx(&mut tx, id).await?;
        tracing::debug!(property_id = %id, cleared, "Cleared shul distances after move");
    }

    record_audit_tx(
        &mut tx,
        NewAuditEntry::updated(EntityType::Property, id, &before, &property)?.by(&ctx),
    )
    .await?;
    record_activity_tx(
        &mut tx,
        NewActivity::new(
            EntityType::Property,
            id,
            "Updated",
            format!("Property updated: {}", property.street()),
        )
        .by(&ctx),
    )
    .await?;
    tx.commit().await?;

    Ok(Json(property))
}

/// **PUT /api/properties/{id}/status**
pub async fn change_status(
    AuthUser(ctx): AuthUser,
    State(state): State<PropertiesState>,
    Path(id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<ChangeListingStatusRequest>,
) -> Result<Json<Property>> {
    let next: ListingStatus = req.status.parse()?;

    let mut tx = state.repos.begin().await?;
    let mut property = lock_property(&mut tx, id, false).await?;
    let before = property.clone();

    let previous = property.change_status(next)?;
    let property = update_property_tx(&mut tx, &property).await?;

    record_audit_tx(
        &mut tx,
        NewAuditEntry::updated(EntityType::Property, id, &before, &property)?.by(&ctx),
    )
    .await?;
    record_activity_tx(
        &mut tx,
        NewActivity::new(
            EntityType::Property,
            id,
            "StatusChanged",
            format!(
                "Listing status of {} changed from {} to {}",
                property.street(),
                previous,
                next
            ),
        )
        .with_metadata(json!({ "fromStatus": previous, "toStatus": next }))
        .by(&ctx),
    )
    .await?;
    tx.commit().await?;

    Ok(Json(property))
}

/// Soft delete. Deleting twice is a no-op.
///
/// **DELETE /api/properties/{id}**
pub async fn delete_property(
    AuthUser(ctx): AuthUser,
    State(state): State<PropertiesState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    let mut tx = state.repos.begin().await?;
    let mut property = lock_property(&mut tx, id, true).await?;
    let before = property.clone();

    if !property.soft_delete(ctx.user_id()) {
        return Ok(StatusCode::NO_CONTENT);
    }
    let property = update_property_tx(&mut tx, &property).await?;

    record_audit_tx(
        &mut tx,
        NewAuditEntry::deleted(EntityType::Property, id, &before)?.by(&ctx),
    )
    .await?;
    record_activity_tx(
        &mut tx,
        NewActivity::new(
            EntityType::Property,
            id,
            "Deleted",
            format!("Property removed: {}", property.street()),
        )
        .by(&ctx),
    )
    .await?;
    tx.commit().await?;

    tracing::info!(property_id = %id, user_id = %ctx.user_id(), "Property soft-deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_parses_status_case_insensitively() {
        let filter = PropertyQuery {
            status: Some("undercontract".to_string()),
            city: Some("  ".to_string()),
            ..PropertyQuery::default()
        }
        .into_filter()
        .unwrap();
        assert_eq!(filter.status, Some(ListingStatus::UnderContract));
        assert_eq!(filter.city, None);
    }

    #[test]
    fn test_query_rejects_inverted_price_range() {
        let result = PropertyQuery {
            min_price: Some(Decimal::from(500)),
            max_price: Some(Decimal::from(100)),
            ..PropertyQuery::default()
        }
        .into_filter();
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn test_query_rejects_unknown_status() {
        let result = PropertyQuery {
            status: Some("Demolished".to_string()),
            ..PropertyQuery::default()
        }
        .into_filter();
        assert!(result.is_err());
    }
}
