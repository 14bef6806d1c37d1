//! Activity domain state and auth backend integration

use crate::ActivityRepositories;
use axum::extract::FromRef;
use relocrm_auth::AuthBackend;

pub use relocrm_auth::AuthUser;

/// Application state for the Activity domain
#[derive(Clone)]
pub struct ActivityState {
    pub repos: ActivityRepositories,
    pub auth: AuthBackend,
}

impl FromRef<ActivityState> for AuthBackend {
    fn from_ref(state: &ActivityState) -> Self {
        state.auth.clone()
    }
}
