//! Authentication HTTP handlers
//!
//! Endpoints for wallet-based authentication.

use axum::{extract::State, Json};

use super::AuthenticatedWallet;
use crate::error::ApiError;
use crate::models::{
    AuthorizeRequest, IdentityResponse, NonceRequest, NonceResponse, TokenResponse,
};
use crate::state::AppState;

/// POST /nonce - Request a challenge nonce for a wallet address
///
/// Creates the identity record on first sight; until an authentication
/// succeeds, repeated calls return the same nonce.
pub async fn request_nonce(
    State(state): State<AppState>,
    Json(req): Json<NonceRequest>,
) -> Result<Json<NonceResponse>, ApiError> {
    let nonce = state
        .auth_service
        .request_challenge(&req.wallet_address, &req.wallet_type)
        .await?;

    Ok(Json(NonceResponse { nonce }))
}

/// POST /authorize - Exchange a signed challenge for a session token
///
/// The signature must cover the canonical message for the stored nonce;
/// verification dispatches on the stored wallet type, not the request body's.
pub async fn authorize(
    State(state): State<AppState>,
    Json(req): Json<AuthorizeRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let token = state
        .auth_service
        .authorize(
            &req.wallet_address,
            req.wallet_type.as_deref(),
            &req.signature,
        )
        .await?;

    Ok(Json(TokenResponse { token }))
}

/// GET /me - Identity record of the authenticated wallet
pub async fn get_current_identity(
    State(state): State<AppState>,
    wallet: AuthenticatedWallet,
) -> Result<Json<IdentityResponse>, ApiError> {
    let identity = state
        .auth_service
        .find_identity(&wallet.address)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(identity.into()))
}
