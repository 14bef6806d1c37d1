//! Multipart upload parsing shared by document and photo uploads

use std::collections::HashMap;

use axum::extract::{FromRequest, Multipart, Request};

use crate::{Error, Result};

/// A file part read fully into memory
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Text fields plus the `file` part of a multipart form
#[derive(Debug, Default)]
pub struct MultipartForm {
    pub fields: HashMap<String, String>,
    pub file: Option<UploadedFile>,
}

impl<S> FromRequest<S> for MultipartForm
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request(req: Request, state: &S) -> Result<Self> {
        let multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| Error::validation(e.body_text()))?;
        Self::read(multipart).await
    }
}

impl MultipartForm {
    /// Read every part. The part named `file` becomes the upload; other parts
    /// are read as text.
    pub async fn read(mut multipart: Multipart) -> Result<Self> {
        let mut form = MultipartForm::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| Error::validation(e.body_text()))?
        {
            let name = field.name().unwrap_or_default().to_string();
            if name == "file" {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| Error::validation(e.body_text()))?;
                form.file = Some(UploadedFile {
                    file_name,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            } else {
                let value = field
                    .text()
                    .await
                    .map_err(|e| Error::validation(e.body_text()))?;
                form.fields.insert(name, value);
            }
        }

        Ok(form)
    }

    /// The uploaded file, or a validation error naming the missing part
    pub fn require_file(&mut self) -> Result<UploadedFile> {
        self.file
            .take()
            .ok_or_else(|| Error::validation("A 'file' part is required"))
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }
}
