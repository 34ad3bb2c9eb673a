//! Challenge nonce lifecycle
//!
//! Issues one single-use nonce per wallet address and rotates it after every
//! successful authentication. Generation uses the thread-local CSPRNG over
//! the full non-negative `i64` range, so guessing an unobserved nonce is
//! infeasible at any realistic request rate.

use rand::Rng;
use std::sync::Arc;

use crate::models::{Identity, WalletType};
use crate::store::{IdentityStore, StoreError};

/// Issues and rotates challenge nonces through the identity store.
#[derive(Clone)]
pub struct NonceManager {
    store: Arc<dyn IdentityStore>,
}

impl NonceManager {
    pub fn new(store: Arc<dyn IdentityStore>) -> Self {
        Self { store }
    }

    /// Return the current nonce for `address`, creating the identity record
    /// with a fresh nonce if none exists.
    ///
    /// Creation is idempotent under concurrency: a request that loses the
    /// insert race re-reads the winner's record, so N concurrent first
    /// requests produce exactly one record and one nonce.
    pub async fn get_or_create(
        &self,
        address: &str,
        wallet_type: WalletType,
    ) -> Result<Identity, StoreError> {
        if let Some(identity) = self.store.find_by_address(address).await? {
            return Ok(identity);
        }

        match self.store.create(address, wallet_type, generate_nonce()).await {
            Ok(identity) => {
                tracing::info!(address, wallet_type = %wallet_type, "created identity record");
                Ok(identity)
            }
            Err(StoreError::DuplicateAddress) => self
                .store
                .find_by_address(address)
                .await?
                .ok_or_else(|| {
                    StoreError::Database("identity vanished after duplicate insert".to_string())
                }),
            Err(e) => Err(e),
        }
    }

    /// Atomically replace a consumed nonce with a fresh one.
    ///
    /// Must only be called after successful signature verification, and the
    /// new value is persisted before any response is returned. Returns the
    /// new nonce, or `None` if `current` was already consumed by a concurrent
    /// authorization.
    pub async fn rotate(&self, address: &str, current: i64) -> Result<Option<i64>, StoreError> {
        let new_nonce = generate_nonce();
        if self.store.rotate_nonce(address, current, new_nonce).await? {
            Ok(Some(new_nonce))
        } else {
            Ok(None)
        }
    }
}

/// Generate a fresh challenge value, uniform in `[0, i64::MAX)`.
fn generate_nonce() -> i64 {
    rand::thread_rng().gen_range(0..i64::MAX)
}
