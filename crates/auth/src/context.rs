//! Authorization context for authenticated staff

use relocrm_common::Error;
use uuid::Uuid;

use crate::types::{StaffIdentity, StaffRole};

/// Represents an authenticated staff member
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user: StaffIdentity,
}

impl AuthContext {
    pub fn new(user: StaffIdentity) -> Self {
        Self { user }
    }

    pub fn user_id(&self) -> Uuid {
        self.user.id
    }

    pub fn display_name(&self) -> &str {
        self.user.display_name()
    }

    pub fn is_admin(&self) -> bool {
        self.user.role == StaffRole::Admin
    }

    /// Fail with 403 unless the caller is an admin or one of `owners`
    pub fn require_admin_or(&self, owners: &[Option<Uuid>]) -> Result<(), Error> {
        if self.is_admin() || owners.iter().flatten().any(|id| *id == self.user.id) {
            return Ok(());
        }
        Err(Error::Unauthorized(
            "You do not have access to this resource".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn identity(role: StaffRole) -> StaffIdentity {
        StaffIdentity {
            id: Uuid::new_v4(),
            cognito_sub: "sub".to_string(),
            email: "staff@example.org".to_string(),
            name: None,
            role,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_display_name_falls_back_to_email() {
        let ctx = AuthContext::new(identity(StaffRole::Coordinator));
        assert_eq!(ctx.display_name(), "staff@example.org");
    }

    #[test]
    fn test_admin_passes_ownership_check() {
        let ctx = AuthContext::new(identity(StaffRole::Admin));
        assert!(ctx.require_admin_or(&[Some(Uuid::new_v4())]).is_ok());
    }

    #[test]
    fn test_owner_passes_ownership_check() {
        let ctx = AuthContext::new(identity(StaffRole::Coordinator));
        assert!(ctx.require_admin_or(&[None, Some(ctx.user_id())]).is_ok());
    }

    #[test]
    fn test_stranger_is_forbidden() {
        let ctx = AuthContext::new(identity(StaffRole::Coordinator));
        let result = ctx.require_admin_or(&[Some(Uuid::new_v4()), None]);
        assert!(matches!(result, Err(Error::Unauthorized(_))));
    }
}
