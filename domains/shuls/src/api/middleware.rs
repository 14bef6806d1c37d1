//! Shuls domain state and auth backend integration

use crate::ShulsRepositories;
use axum::extract::FromRef;
use relocrm_auth::AuthBackend;

pub use relocrm_auth::AuthUser;

/// Application state for the Shuls domain
#[derive(Clone)]
pub struct ShulsState {
    pub repos: ShulsRepositories,
    pub auth: AuthBackend,
}

impl FromRef<ShulsState> for AuthBackend {
    fn from_ref(state: &ShulsState) -> Self {
        state.auth.clone()
    }
}
