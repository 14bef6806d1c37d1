//! Domain entities for the Activity domain

use chrono::{DateTime, Utc};
use relocrm_auth::AuthContext;
use relocrm_common::{string_enum, Result};
use serde::Serialize;
use uuid::Uuid;

string_enum! {
    /// Kind of entity a log row refers to
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, sqlx::Type)]
    #[sqlx(type_name = "entity_type", rename_all = "PascalCase")]
    pub enum EntityType {
        Applicant,
        HousingSearch,
        Property,
        PropertyMatch,
        Showing,
        Shul,
        DocumentType,
        StageTransitionRequirement,
        ApplicantDocument,
        FollowUpReminder,
    }
}

string_enum! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, sqlx::Type)]
    #[sqlx(type_name = "audit_action", rename_all = "PascalCase")]
    pub enum AuditAction {
        Created,
        Updated,
        Deleted,
        Restored,
    }
}

/// Human-readable timeline entry
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLog {
    pub id: Uuid,
    pub entity_type: EntityType,
    pub entity_id: Uuid,
    pub applicant_id: Option<Uuid>,
    pub action: String,
    pub description: String,
    pub user_id: Option<Uuid>,
    pub user_name: Option<String>,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// Field-level change record
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogEntry {
    pub id: Uuid,
    pub entity_type: EntityType,
    pub entity_id: Uuid,
    pub action: AuditAction,
    pub old_values: Option<serde_json::Value>,
    pub new_values: Option<serde_json::Value>,
    pub changed_fields: Vec<String>,
    pub user_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Activity row to be appended
#[derive(Debug, Clone)]
pub struct NewActivity {
    pub entity_type: EntityType,
    pub entity_id: Uuid,
    pub applicant_id: Option<Uuid>,
    pub action: String,
    pub description: String,
    pub user_id: Option<Uuid>,
    pub user_name: Option<String>,
    pub metadata: serde_json::Value,
}

impl NewActivity {
    pub fn new(
        entity_type: EntityType,
        entity_id: Uuid,
        action: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            entity_type,
            entity_id,
            applicant_id: None,
            action: action.into(),
            description: description.into(),
            user_id: None,
            user_name: None,
            metadata: serde_json::json!({}),
        }
    }

    /// Attach the entry to an applicant's timeline
    pub fn for_applicant(mut self, applicant_id: Option<Uuid>) -> Self {
        self.applicant_id = applicant_id;
        self
    }

    pub fn by(mut self, ctx: &AuthContext) -> Self {
        self.user_id = Some(ctx.user_id());
        self.user_name = Some(ctx.display_name().to_string());
        self
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Audit row to be appended; snapshots are diffed on write
#[derive(Debug, Clone)]
pub struct NewAuditEntry {
    pub entity_type: EntityType,
    pub entity_id: Uuid,
    pub action: AuditAction,
    pub before: Option<serde_json::Value>,
    pub after: Option<serde_json::Value>,
    pub user_id: Option<Uuid>,
}

impl NewAuditEntry {
    pub fn created<T: Serialize>(
        entity_type: EntityType,
        entity_id: Uuid,
        after: &T,
    ) -> Result<Self> {
        Ok(Self {
            entity_type,
            entity_id,
            action: AuditAction::Created,
            before: None,
            after: Some(serde_json::to_value(after)?),
            user_id: None,
        })
    }

    pub fn updated<T: Serialize>(
        entity_type: EntityType,
        entity_id: Uuid,
        before: &T,
        after: &T,
    ) -> Result<Self> {
        Ok(Self {
            entity_type,
            entity_id,
            action: AuditAction::Updated,
            before: Some(serde_json::to_value(before)?),
            after: Some(serde_json::to_value(after)?),
            user_id: None,
        })
    }

    pub fn deleted<T: Serialize>(
        entity_type: EntityType,
        entity_id: Uuid,
        before: &T,
    ) -> Result<Self> {
        Ok(Self {
            entity_type,
            entity_id,
            action: AuditAction::Deleted,
            before: Some(serde_json::to_value(before)?),
            after: None,
            user_id: None,
        })
    }

    pub fn restored<T: Serialize>(
        entity_type: EntityType,
        entity_id: Uuid,
        before: &T,
        after: &T,
    ) -> Result<Self> {
        Ok(Self {
            action: AuditAction::Restored,
            ..Self::updated(entity_type, entity_id, before, after)?
        })
    }

    pub fn by(mut self, ctx: &AuthContext) -> Self {
        self.user_id = Some(ctx.user_id());
        self
    }
}
