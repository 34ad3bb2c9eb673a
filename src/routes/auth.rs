//! Authentication routes

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::auth;
use crate::state::AppState;

/// Create authentication routes
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/nonce", post(auth::request_nonce))
        .route("/authorize", post(auth::authorize))
        .route("/me", get(auth::get_current_identity))
}
