//! Staff user read-model types

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Identity of the staff member behind a request
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct StaffIdentity {
    pub id: Uuid,
    pub cognito_sub: String,
    pub email: String,
    pub name: Option<String>,
    pub role: StaffRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StaffIdentity {
    /// Name shown in activity descriptions
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.email)
    }
}

/// Staff role for authorization decisions
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize)]
#[sqlx(type_name = "staff_role", rename_all = "lowercase")]
pub enum StaffRole {
    Admin,
    Coordinator,
}

impl StaffRole {
    pub fn can_configure(&self) -> bool {
        matches!(self, StaffRole::Admin)
    }
}

impl std::fmt::Display for StaffRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StaffRole::Admin => write!(f, "admin"),
            StaffRole::Coordinator => write!(f, "coordinator"),
        }
    }
}
