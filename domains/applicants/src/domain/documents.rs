//! Document configuration and uploaded applicant documents

use chrono::{DateTime, Utc};
use relocrm_common::{Error, Result};
use relocrm_storage::sanitize_file_name;
use serde::Serialize;
use uuid::Uuid;

use super::housing::HousingSearchStage;

/// Maximum document upload size (25MB)
pub const MAX_DOCUMENT_SIZE_BYTES: usize = 25 * 1024 * 1024;

/// Accepted document content types and the extensions that imply them
const DOCUMENT_CONTENT_TYPES: &[(&str, &[&str])] = &[
    ("application/pdf", &["pdf"]),
    ("image/jpeg", &["jpg", "jpeg"]),
    ("image/png", &["png"]),
    ("image/heic", &["heic"]),
    ("application/msword", &["doc"]),
    (
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        &["docx"],
    ),
];

/// Resolve the stored content type of an upload.
///
/// A recognised declared type wins; otherwise the extension decides
/// (browsers send `application/octet-stream` for HEIC and Word files).
pub fn resolve_document_content_type(
    declared: Option<&str>,
    file_name: &str,
) -> Result<&'static str> {
    if let Some(declared) = declared {
        let declared = declared.trim().to_ascii_lowercase();
        if let Some((ct, _)) = DOCUMENT_CONTENT_TYPES.iter().find(|(ct, _)| *ct == declared) {
            return Ok(*ct);
        }
    }

    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    DOCUMENT_CONTENT_TYPES
        .iter()
        .find(|(_, exts)| exts.contains(&extension.as_str()))
        .map(|(ct, _)| *ct)
        .ok_or_else(|| {
            Error::validation(format!(
                "File type of '{}' is not allowed. Allowed types: pdf, jpeg, png, heic, doc, docx",
                file_name
            ))
        })
}

/// Configured kind of document (lease, pay stub, ...)
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DocumentType {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DocumentType {
    pub fn new(name: &str, description: Option<String>, display_order: i32) -> Result<Self> {
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            name: Self::validate_name(name)?,
            description,
            is_active: true,
            display_order,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn update(
        &mut self,
        name: &str,
        description: Option<String>,
        display_order: i32,
        is_active: bool,
    ) -> Result<()> {
        self.name = Self::validate_name(name)?;
        self.description = description;
        self.display_order = display_order;
        self.is_active = is_active;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Returns false when already inactive
    pub fn deactivate(&mut self) -> bool {
        if !self.is_active {
            return false;
        }
        self.is_active = false;
        self.updated_at = Utc::now();
        true
    }

    fn validate_name(name: &str) -> Result<String> {
        let trimmed = name.trim();
        if trimmed.is_empty() || trimmed.chars().count() > 100 {
            return Err(Error::validation(
                "Document type name must be between 1 and 100 characters",
            ));
        }
        Ok(trimmed.to_string())
    }
}

/// Document prerequisite for moving a housing search between two stages
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct StageTransitionRequirement {
    pub id: Uuid,
    pub from_stage: HousingSearchStage,
    pub to_stage: HousingSearchStage,
    pub document_type_id: Uuid,
    pub is_required: bool,
    pub created_at: DateTime<Utc>,
}

impl StageTransitionRequirement {
    pub fn new(
        from_stage: HousingSearchStage,
        to_stage: HousingSearchStage,
        document_type_id: Uuid,
        is_required: bool,
    ) -> Result<Self> {
        if from_stage == to_stage {
            return Err(Error::validation(
                "From stage and to stage must be different",
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            from_stage,
            to_stage,
            document_type_id,
            is_required,
            created_at: Utc::now(),
        })
    }
}

/// Uploaded file metadata; the bytes live in object storage
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ApplicantDocument {
    pub id: Uuid,
    pub applicant_id: Uuid,
    pub document_type_id: Uuid,
    pub file_name: String,
    #[serde(skip_serializing)]
    pub storage_key: String,
    pub content_type: String,
    pub size_bytes: i64,
    pub uploaded_by: Option<Uuid>,
    pub uploaded_at: DateTime<Utc>,
}

impl ApplicantDocument {
    pub fn new(
        applicant_id: Uuid,
        document_type_id: Uuid,
        file_name: &str,
        content_type: &str,
        size_bytes: usize,
        uploaded_by: Option<Uuid>,
    ) -> Result<Self> {
        if size_bytes == 0 {
            return Err(Error::validation("File is empty"));
        }
        if size_bytes > MAX_DOCUMENT_SIZE_BYTES {
            return Err(Error::validation(format!(
                "File exceeds the maximum size of {} MB",
                MAX_DOCUMENT_SIZE_BYTES / (1024 * 1024)
            )));
        }

        let id = Uuid::new_v4();
        let safe_name = sanitize_file_name(file_name);
        Ok(Self {
            id,
            applicant_id,
            document_type_id,
            storage_key: format!("applicants/{}/documents/{}/{}", applicant_id, id, safe_name),
            file_name: file_name.trim().to_string(),
            content_type: content_type.to_string(),
            size_bytes: size_bytes as i64,
            uploaded_by,
            uploaded_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declared_content_type_accepted() {
        assert_eq!(
            resolve_document_content_type(Some("application/PDF"), "x.bin").unwrap(),
            "application/pdf"
        );
    }

    #[test]
    fn test_content_type_falls_back_to_extension() {
        assert_eq!(
            resolve_document_content_type(Some("application/octet-stream"), "scan.HEIC").unwrap(),
            "image/heic"
        );
        assert_eq!(
            resolve_document_content_type(None, "letter.docx").unwrap(),
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        );
    }

    #[test]
    fn test_disallowed_content_type() {
        assert!(resolve_document_content_type(Some("text/plain"), "notes.txt").is_err());
        assert!(resolve_document_content_type(None, "noextension").is_err());
    }

    #[test]
    fn test_requirement_same_stage_rejected() {
        let result = StageTransitionRequirement::new(
            HousingSearchStage::Searching,
            HousingSearchStage::Searching,
            Uuid::new_v4(),
            true,
        );
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn test_requirement_distinct_stages() {
        let req = StageTransitionRequirement::new(
            HousingSearchStage::AwaitingAgreements,
            HousingSearchStage::Searching,
            Uuid::new_v4(),
            false,
        )
        .unwrap();
        assert!(!req.is_required);
    }

    #[test]
    fn test_document_type_name_rules() {
        assert!(DocumentType::new("  ", None, 0).is_err());
        assert!(DocumentType::new(&"x".repeat(101), None, 0).is_err());
        let dt = DocumentType::new(" Lease ", None, 3).unwrap();
        assert_eq!(dt.name, "Lease");
        assert!(dt.is_active);
    }

    #[test]
    fn test_document_type_deactivate_idempotent() {
        let mut dt = DocumentType::new("Lease", None, 0).unwrap();
        assert!(dt.deactivate());
        assert!(!dt.deactivate());
    }

    #[test]
    fn test_document_storage_key() {
        let applicant = Uuid::new_v4();
        let doc = ApplicantDocument::new(
            applicant,
            Uuid::new_v4(),
            "Pay stub (March).pdf",
            "application/pdf",
            1024,
            None,
        )
        .unwrap();
        assert_eq!(
            doc.storage_key,
            format!(
                "applicants/{}/documents/{}/Pay_stub__March_.pdf",
                applicant, doc.id
            )
        );
        assert_eq!(doc.file_name, "Pay stub (March).pdf");
    }

    #[test]
    fn test_document_size_limits() {
        let too_big = ApplicantDocument::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            "big.pdf",
            "application/pdf",
            MAX_DOCUMENT_SIZE_BYTES + 1,
            None,
        );
        assert!(too_big.is_err());
        let empty = ApplicantDocument::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            "empty.pdf",
            "application/pdf",
            0,
            None,
        );
        assert!(empty.is_err());
    }
}
