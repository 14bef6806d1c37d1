//! Property photo handlers
//!
//! The property row is locked for every gallery change so the photo cap and
//! the single-primary rule hold under concurrent requests.

use std::time::Duration;

use axum::{extract::State, http::StatusCode, Json};
use relocrm_activity::{record_activity_tx, EntityType, NewActivity};
use relocrm_common::{Error, MultipartForm, Path, Result, ValidatedJson};
use relocrm_storage::StorageService;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use super::properties::lock_property;
use crate::api::middleware::{AuthUser, PropertiesState};
use crate::domain::photos::{resolve_photo_content_type, PhotoGallery, PhotoView, PropertyPhoto};
use crate::repository::{delete_photo_tx, insert_photo_tx, list_photos_tx, save_photo_order_tx};

/// Lifetime of presigned photo links
pub const PHOTO_URL_TTL: Duration = Duration::from_secs(60 * 60);

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ReorderPhotosRequest {
    /// Every photo of the property, in display order
    #[validate(length(min = 1, message = "photoIds must not be empty"))]
    pub photo_ids: Vec<Uuid>,
}

/// Attach a presigned view link to each photo
pub(crate) async fn photo_views(
    storage: &dyn StorageService,
    photos: Vec<PropertyPhoto>,
) -> Result<Vec<PhotoView>> {
    let mut views = Vec::with_capacity(photos.len());
    for photo in photos {
        let link = storage
            .presigned_get_url(&photo.storage_key, PHOTO_URL_TTL)
            .await?;
        views.push(PhotoView {
            photo,
            url: link.url,
            url_expires_at: link.expires_at,
        });
    }
    Ok(views)
}

/// **GET /api/properties/{id}/photos**
pub async fn list_photos(
    AuthUser(_ctx): AuthUser,
    State(state): State<PropertiesState>,
    Path(property_id): Path<Uuid>,
) -> Result<Json<Vec<PhotoView>>> {
    if state.repos.properties.find(property_id).await?.is_none() {
        return Err(Error::not_found("Property", property_id));
    }
    let photos = state.repos.photos.list_for_property(property_id).await?;
    Ok(Json(photo_views(state.storage.as_ref(), photos).await?))
}

/// Upload a photo.
///
/// **POST /api/properties/{id}/photos**
///
/// Multipart form with a `file` part. The gallery cap is checked before the
/// object is stored.
pub async fn upload_photo(
    AuthUser(ctx): AuthUser,
    State(state): State<PropertiesState>,
    Path(property_id): Path<Uuid>,
    mut form: MultipartForm,
) -> Result<(StatusCode, Json<PhotoView>)> {
    let file = form.require_file()?;
    let content_type = resolve_photo_content_type(file.content_type.as_deref(), &file.file_name)?;

    let mut tx = state.repos.begin().await?;
    let property = lock_property(&mut tx, property_id, false).await?;
    let gallery = PhotoGallery::new(list_photos_tx(&mut tx, property_id).await?);
    let photo =
        gallery.prepare_upload(property_id, &file.file_name, content_type, file.bytes.len())?;

    state
        .storage
        .put_object(&photo.storage_key, file.bytes, content_type)
        .await?;

    let photo = insert_photo_tx(&mut tx, &photo).await?;
    record_activity_tx(
        &mut tx,
        NewActivity::new(
            EntityType::Property,
            property_id,
            "PhotoUploaded",
            format!("Photo added to {}: {}", property.street(), photo.file_name),
        )
        .with_metadata(json!({
            "photoId": photo.id,
            "isPrimary": photo.is_primary,
            "sizeBytes": photo.size_bytes,
        }))
        .by(&ctx),
    )
    .await?;
    tx.commit().await?;

    tracing::info!(
        property_id = %property_id,
        photo_id = %photo.id,
        photo_count = gallery.len() + 1,
        "Property photo uploaded"
    );

    let view = photo_views(state.storage.as_ref(), vec![photo])
        .await?
        .pop()
        .ok_or_else(|| Error::Internal("Photo view was not produced".to_string()))?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// **PUT /api/properties/{id}/photos/{photo_id}/primary**
pub async fn set_primary_photo(
    AuthUser(ctx): AuthUser,
    State(state): State<PropertiesState>,
    Path((property_id, photo_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Vec<PhotoView>>> {
    let mut tx = state.repos.begin().await?;
    let property = lock_property(&mut tx, property_id, false).await?;
    let mut gallery = PhotoGallery::new(list_photos_tx(&mut tx, property_id).await?);

    gallery.set_primary(photo_id)?;
    save_photo_order_tx(&mut tx, gallery.photos()).await?;

    record_activity_tx(
        &mut tx,
        NewActivity::new(
            EntityType::Property,
            property_id,
            "PrimaryPhotoChanged",
            format!("Primary photo changed for {}", property.street()),
        )
        .with_metadata(json!({ "photoId": photo_id }))
        .by(&ctx),
    )
    .await?;
    tx.commit().await?;

    Ok(Json(
        photo_views(state.storage.as_ref(), gallery.into_photos()).await?,
    ))
}

/// **PUT /api/properties/{id}/photos/order**
pub async fn reorder_photos(
    AuthUser(ctx): AuthUser,
    State(state): State<PropertiesState>,
    Path(property_id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<ReorderPhotosRequest>,
) -> Result<Json<Vec<PhotoView>>> {
    let mut tx = state.repos.begin().await?;
    let property = lock_property(&mut tx, property_id, false).await?;
    let mut gallery = PhotoGallery::new(list_photos_tx(&mut tx, property_id).await?);

    gallery.reorder(&req.photo_ids)?;
    save_photo_order_tx(&mut tx, gallery.photos()).await?;

    record_activity_tx(
        &mut tx,
        NewActivity::new(
            EntityType::Property,
            property_id,
            "PhotosReordered",
            format!("Photos reordered for {}", property.street()),
        )
        .by(&ctx),
    )
    .await?;
    tx.commit().await?;

    Ok(Json(
        photo_views(state.storage.as_ref(), gallery.into_photos()).await?,
    ))
}

/// Remove a photo. The stored object is deleted after commit on a
/// best-effort basis.
///
/// **DELETE /api/properties/{id}/photos/{photo_id}**
pub async fn delete_photo(
    AuthUser(ctx): AuthUser,
    State(state): State<PropertiesState>,
    Path((property_id, photo_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode> {
    let mut tx = state.repos.begin().await?;
    let property = lock_property(&mut tx, property_id, false).await?;
    let mut gallery = PhotoGallery::new(list_photos_tx(&mut tx, property_id).await?);

    let removed = gallery.remove(photo_id)?;
    delete_photo_tx(&mut tx, removed.id).await?;
    save_photo_order_tx(&mut tx, gallery.photos()).await?;

    record_activity_tx(
        &mut tx,
        NewActivity::new(
            EntityType::Property,
            property_id,
            "PhotoDeleted",
            format!("Photo removed from {}: {}", property.street(), removed.file_name),
        )
        .with_metadata(json!({ "photoId": removed.id, "wasPrimary": removed.is_primary }))
        .by(&ctx),
    )
    .await?;
    tx.commit().await?;

    if let Err(err) = state.storage.delete_object(&removed.storage_key).await {
        tracing::warn!(
            photo_id = %photo_id,
            storage_key = %removed.storage_key,
            error = %err,
            "Failed to delete stored photo; object is orphaned"
        );
    }

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use relocrm_storage::mock::MockStorageService;

    #[tokio::test]
    async fn test_photo_views_carry_links() {
        let storage = MockStorageService::default();
        let gallery = PhotoGallery::default();
        let photo = gallery
            .prepare_upload(Uuid::new_v4(), "porch.jpg", "image/jpeg", 10)
            .unwrap();
        let key = photo.storage_key.clone();
        storage.put_object(&key, vec![1; 10], "image/jpeg").await.unwrap();

        let views = photo_views(&storage, vec![photo]).await.unwrap();
        assert_eq!(views.len(), 1);
        assert!(views[0].url.contains(&key));
        assert!(views[0].url_expires_at > chrono::Utc::now());
    }
}
