//! Reminders domain state and auth backend integration

use crate::RemindersRepositories;
use axum::extract::FromRef;
use relocrm_auth::AuthBackend;

pub use relocrm_auth::AuthUser;

/// Application state for the Reminders domain
#[derive(Clone)]
pub struct RemindersState {
    pub repos: RemindersRepositories,
    pub auth: AuthBackend,
}

impl FromRef<RemindersState> for AuthBackend {
    fn from_ref(state: &RemindersState) -> Self {
        state.auth.clone()
    }
}
