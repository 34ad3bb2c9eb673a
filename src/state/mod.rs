//! Application state shared across handlers

use std::sync::Arc;

use axum::extract::FromRef;

use crate::auth::AuthService;
use crate::store::IdentityStore;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<AuthService>,
    pub store: Arc<dyn IdentityStore>,
}

impl AppState {
    pub fn new(auth_service: Arc<AuthService>, store: Arc<dyn IdentityStore>) -> Self {
        Self {
            auth_service,
            store,
        }
    }
}

impl FromRef<AppState> for Arc<AuthService> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.auth_service.clone()
    }
}
