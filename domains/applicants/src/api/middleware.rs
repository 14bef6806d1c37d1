//! Applicants domain state and auth backend integration

use std::sync::Arc;

use crate::ApplicantsRepositories;
use axum::extract::FromRef;
use relocrm_auth::AuthBackend;
use relocrm_storage::StorageService;

pub use relocrm_auth::{AdminUser, AuthUser};

/// Application state for the Applicants domain
#[derive(Clone)]
pub struct ApplicantsState {
    pub repos: ApplicantsRepositories,
    pub auth: AuthBackend,
    pub storage: Arc<dyn StorageService>,
}

impl FromRef<ApplicantsState> for AuthBackend {
    fn from_ref(state: &ApplicantsState) -> Self {
        state.auth.clone()
    }
}
