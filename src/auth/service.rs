//! Authentication service
//!
//! Orchestrates the two-step wallet authentication protocol: challenge
//! issuance, then verify-and-authorize. Composes the nonce manager, the
//! signature verifier and the token issuer over an identity store.

use std::sync::Arc;
use thiserror::Error;

use crate::models::{Identity, WalletType};
use crate::store::{IdentityStore, StoreError};

use super::crypto::{verify_wallet_signature, SignatureError};
use super::jwt::{Claims, TokenError, TokenIssuer};
use super::nonce::NonceManager;

/// Auth service errors
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid wallet type: {0}")]
    InvalidWalletType(String),

    #[error("Invalid wallet address: {0}")]
    InvalidWalletAddress(String),

    #[error("Malformed signature payload: {0}")]
    MalformedSignature(String),

    #[error("User not found")]
    UserNotFound,

    // Fixed message: verification internals are not surfaced to callers.
    #[error("Signature verification failed")]
    AuthenticationFailed,

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Token error: {0}")]
    Token(#[from] TokenError),
}

impl From<SignatureError> for AuthError {
    fn from(e: SignatureError) -> Self {
        match e {
            SignatureError::MalformedInput(detail) => AuthError::MalformedSignature(detail),
            SignatureError::VerificationFailed => AuthError::AuthenticationFailed,
        }
    }
}

/// Wallet authentication orchestrator
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn IdentityStore>,
    nonces: NonceManager,
    tokens: TokenIssuer,
}

impl AuthService {
    pub fn new(store: Arc<dyn IdentityStore>, tokens: TokenIssuer) -> Self {
        Self {
            nonces: NonceManager::new(store.clone()),
            store,
            tokens,
        }
    }

    /// Issue (or re-issue) the current challenge nonce for a wallet address.
    ///
    /// Creates the identity record on first sight of the address; repeated
    /// calls return the same nonce until an authentication succeeds.
    pub async fn request_challenge(
        &self,
        wallet_address: &str,
        wallet_type: &str,
    ) -> Result<i64, AuthError> {
        let wallet_type: WalletType = wallet_type
            .parse()
            .map_err(|_| AuthError::InvalidWalletType(wallet_type.to_string()))?;
        let address = canonicalize_address(wallet_type, wallet_address)?;

        let identity = self.nonces.get_or_create(&address, wallet_type).await?;
        Ok(identity.nonce)
    }

    /// Verify a signed challenge and exchange it for a session token.
    ///
    /// The verification scheme comes from the stored identity record; a
    /// client-declared wallet type is never trusted for dispatch. On failure
    /// the stored nonce is left untouched, so the outstanding challenge
    /// survives for retry. On success the nonce is rotated before the token
    /// is returned; if issuance then fails, the old challenge is already
    /// spent and the client must request a fresh one.
    pub async fn authorize(
        &self,
        wallet_address: &str,
        declared_wallet_type: Option<&str>,
        signature: &str,
    ) -> Result<String, AuthError> {
        let identity = self
            .store
            .find_by_address(&lookup_key(wallet_address))
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if let Some(declared) = declared_wallet_type {
            if declared != identity.wallet_type.as_str() {
                tracing::debug!(
                    address = %identity.address,
                    declared,
                    stored = %identity.wallet_type,
                    "ignoring client-declared wallet type"
                );
            }
        }

        verify_wallet_signature(
            identity.wallet_type,
            &identity.address,
            identity.nonce,
            signature,
        )
        .map_err(|e| {
            tracing::warn!(address = %identity.address, "signature verification failed");
            AuthError::from(e)
        })?;

        // A lost swap means a concurrent request consumed this nonce first;
        // the signature is a replay from this request's point of view.
        if self
            .nonces
            .rotate(&identity.address, identity.nonce)
            .await?
            .is_none()
        {
            tracing::warn!(address = %identity.address, "nonce consumed concurrently");
            return Err(AuthError::AuthenticationFailed);
        }

        let token = self.tokens.issue(&identity.address)?;
        tracing::info!(address = %identity.address, "wallet authenticated");
        Ok(token)
    }

    /// Validate a session token (for the bearer middleware).
    pub fn verify_token(&self, token: &str) -> Result<Claims, TokenError> {
        self.tokens.verify(token)
    }

    /// Look up an identity record by address.
    pub async fn find_identity(&self, wallet_address: &str) -> Result<Option<Identity>, AuthError> {
        Ok(self
            .store
            .find_by_address(&lookup_key(wallet_address))
            .await?)
    }
}

/// Validate an address for its scheme and put it in canonical form.
///
/// Account addresses are hex and compared case-insensitively, so they are
/// stored lowercased; base58 keys are case-sensitive and kept verbatim.
fn canonicalize_address(wallet_type: WalletType, address: &str) -> Result<String, AuthError> {
    match wallet_type {
        WalletType::EcdsaRecoverable => {
            let hex_part = address
                .strip_prefix("0x")
                .filter(|rest| rest.len() == 40 && rest.chars().all(|c| c.is_ascii_hexdigit()));
            match hex_part {
                Some(_) => Ok(address.to_lowercase()),
                None => Err(AuthError::InvalidWalletAddress(
                    "expected a 0x-prefixed 20-byte hex address".to_string(),
                )),
            }
        }
        WalletType::Ed25519 => {
            let decoded = bs58::decode(address).into_vec().map_err(|_| {
                AuthError::InvalidWalletAddress("expected a base58 public key".to_string())
            })?;
            if decoded.len() != 32 {
                return Err(AuthError::InvalidWalletAddress(
                    "public key must be 32 bytes".to_string(),
                ));
            }
            Ok(address.to_string())
        }
    }
}

/// Canonical store key for an incoming address, before the wallet type is
/// known. Hex account addresses are case-insensitive; base58 keys never start
/// with `0x`.
fn lookup_key(address: &str) -> String {
    if address.starts_with("0x") || address.starts_with("0X") {
        address.to_lowercase()
    } else {
        address.to_string()
    }
}
