//! Property photos and the per-property gallery rules
//!
//! A gallery holds at most 50 photos. When it is non-empty exactly one photo
//! is primary, and display orders run 0..n after any reorder.

use chrono::{DateTime, Utc};
use relocrm_common::{Error, Result};
use relocrm_storage::sanitize_file_name;
use serde::Serialize;
use uuid::Uuid;

pub const MAX_PHOTOS_PER_PROPERTY: usize = 50;

pub const MAX_PHOTO_SIZE_BYTES: usize = 10 * 1024 * 1024;

const PHOTO_CONTENT_TYPES: &[(&str, &[&str])] = &[
    ("image/jpeg", &["jpg", "jpeg"]),
    ("image/png", &["png"]),
    ("image/webp", &["webp"]),
    ("image/heic", &["heic"]),
];

/// Resolve the stored content type of a photo upload from the declared type
/// or, failing that, the file extension
pub fn resolve_photo_content_type(declared: Option<&str>, file_name: &str) -> Result<&'static str> {
    if let Some(declared) = declared {
        let declared = declared.trim().to_ascii_lowercase();
        if let Some((ct, _)) = PHOTO_CONTENT_TYPES.iter().find(|(ct, _)| *ct == declared) {
            return Ok(*ct);
        }
    }

    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    PHOTO_CONTENT_TYPES
        .iter()
        .find(|(_, exts)| exts.contains(&extension.as_str()))
        .map(|(ct, _)| *ct)
        .ok_or_else(|| {
            Error::validation(format!(
                "File type of '{}' is not allowed. Allowed types: jpeg, png, webp, heic",
                file_name
            ))
        })
}

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PropertyPhoto {
    pub id: Uuid,
    pub property_id: Uuid,
    #[serde(skip_serializing)]
    pub storage_key: String,
    pub file_name: String,
    pub content_type: String,
    pub size_bytes: i64,
    pub display_order: i32,
    pub is_primary: bool,
    pub uploaded_at: DateTime<Utc>,
}

/// Photo with a time-limited view link
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoView {
    #[serde(flatten)]
    pub photo: PropertyPhoto,
    pub url: String,
    pub url_expires_at: DateTime<Utc>,
}

/// All photos of one property, ordered by display order
#[derive(Debug, Clone, Default)]
pub struct PhotoGallery {
    photos: Vec<PropertyPhoto>,
}

impl PhotoGallery {
    pub fn new(mut photos: Vec<PropertyPhoto>) -> Self {
        photos.sort_by_key(|p| (p.display_order, p.uploaded_at));
        Self { photos }
    }

    pub fn photos(&self) -> &[PropertyPhoto] {
        &self.photos
    }

    pub fn into_photos(self) -> Vec<PropertyPhoto> {
        self.photos
    }

    pub fn len(&self) -> usize {
        self.photos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.photos.is_empty()
    }

    /// Build the next photo for this gallery. Fails before anything is
    /// stored when the gallery is full or the file is unusable.
    pub fn prepare_upload(
        &self,
        property_id: Uuid,
        file_name: &str,
        content_type: &str,
        size_bytes: usize,
    ) -> Result<PropertyPhoto> {
        if self.photos.len() >= MAX_PHOTOS_PER_PROPERTY {
            return Err(Error::validation(format!(
                "A property can have at most {} photos",
                MAX_PHOTOS_PER_PROPERTY
            )));
        }
        if size_bytes == 0 {
            return Err(Error::validation("File is empty"));
        }
        if size_bytes > MAX_PHOTO_SIZE_BYTES {
            return Err(Error::validation(format!(
                "File exceeds the maximum size of {} MB",
                MAX_PHOTO_SIZE_BYTES / (1024 * 1024)
            )));
        }

        let id = Uuid::new_v4();
        let display_order = self
            .photos
            .iter()
            .map(|p| p.display_order + 1)
            .max()
            .unwrap_or(0);
        Ok(PropertyPhoto {
            id,
            property_id,
            storage_key: format!(
                "properties/{}/photos/{}/{}",
                property_id,
                id,
                sanitize_file_name(file_name)
            ),
            file_name: file_name.trim().to_string(),
            content_type: content_type.to_string(),
            size_bytes: size_bytes as i64,
            display_order,
            is_primary: !self.photos.iter().any(|p| p.is_primary),
            uploaded_at: Utc::now(),
        })
    }

    /// Make one photo the primary
    pub fn set_primary(&mut self, photo_id: Uuid) -> Result<()> {
        if !self.photos.iter().any(|p| p.id == photo_id) {
            return Err(Error::not_found("PropertyPhoto", photo_id));
        }
        for photo in &mut self.photos {
            photo.is_primary = photo.id == photo_id;
        }
        Ok(())
    }

    /// Apply a new order. `ordered_ids` must list every photo exactly once.
    pub fn reorder(&mut self, ordered_ids: &[Uuid]) -> Result<()> {
        let mut seen = std::collections::HashSet::with_capacity(ordered_ids.len());
        let is_permutation = ordered_ids.len() == self.photos.len()
            && ordered_ids
                .iter()
                .all(|id| seen.insert(*id) && self.photos.iter().any(|p| p.id == *id));
        if !is_permutation {
            return Err(Error::validation(
                "Photo order must list every photo of the property exactly once",
            ));
        }

        for photo in &mut self.photos {
            if let Some(index) = ordered_ids.iter().position(|id| *id == photo.id) {
                photo.display_order = index as i32;
            }
        }
        self.photos.sort_by_key(|p| p.display_order);
        Ok(())
    }

    /// Remove a photo. When it was primary the lowest-ordered remaining photo
    /// takes over.
    pub fn remove(&mut self, photo_id: Uuid) -> Result<PropertyPhoto> {
        let index = self
            .photos
            .iter()
            .position(|p| p.id == photo_id)
            .ok_or_else(|| Error::not_found("PropertyPhoto", photo_id))?;
        let removed = self.photos.remove(index);

        if removed.is_primary {
            if let Some(next) = self.photos.iter_mut().min_by_key(|p| p.display_order) {
                next.is_primary = true;
            }
        }
        Ok(removed)
    }
}
