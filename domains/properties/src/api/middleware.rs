//! Properties domain state and auth backend integration

use std::sync::Arc;

use crate::PropertiesRepositories;
use axum::extract::FromRef;
use relocrm_auth::AuthBackend;
use relocrm_storage::StorageService;

pub use relocrm_auth::AuthUser;

/// Application state for the Properties domain
#[derive(Clone)]
pub struct PropertiesState {
    pub repos: PropertiesRepositories,
    pub auth: AuthBackend,
    pub storage: Arc<dyn StorageService>,
}

impl FromRef<PropertiesState> for AuthBackend {
    fn from_ref(state: &PropertiesState) -> Self {
        state.auth.clone()
    }
}
