//! In-memory identity store
//!
//! Used by the test suite in place of Postgres. The single mutex gives the
//! same atomicity the database provides: creation is insert-if-absent and
//! rotation is compare-and-swap under one lock.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use super::{IdentityStore, StoreError};
use crate::models::{Identity, WalletType};

#[derive(Default)]
pub struct InMemoryIdentityStore {
    identities: Mutex<HashMap<String, Identity>>,
}

impl InMemoryIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored identities.
    pub fn len(&self) -> usize {
        self.identities.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl IdentityStore for InMemoryIdentityStore {
    async fn find_by_address(&self, address: &str) -> Result<Option<Identity>, StoreError> {
        Ok(self.identities.lock().unwrap().get(address).cloned())
    }

    async fn create(
        &self,
        address: &str,
        wallet_type: WalletType,
        nonce: i64,
    ) -> Result<Identity, StoreError> {
        let mut identities = self.identities.lock().unwrap();
        if identities.contains_key(address) {
            return Err(StoreError::DuplicateAddress);
        }
        let identity = Identity {
            address: address.to_string(),
            wallet_type,
            nonce,
        };
        identities.insert(address.to_string(), identity.clone());
        Ok(identity)
    }

    async fn rotate_nonce(
        &self,
        address: &str,
        expected: i64,
        new_nonce: i64,
    ) -> Result<bool, StoreError> {
        let mut identities = self.identities.lock().unwrap();
        match identities.get_mut(address) {
            Some(identity) if identity.nonce == expected => {
                identity.nonce = new_nonce;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_is_unique_per_address() {
        let store = InMemoryIdentityStore::new();
        store
            .create("0xabc", WalletType::EcdsaRecoverable, 1)
            .await
            .unwrap();

        let err = store
            .create("0xabc", WalletType::Ed25519, 2)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateAddress));
        assert_eq!(store.len(), 1);

        // Original record is untouched by the failed insert
        let identity = store.find_by_address("0xabc").await.unwrap().unwrap();
        assert_eq!(identity.wallet_type, WalletType::EcdsaRecoverable);
        assert_eq!(identity.nonce, 1);
    }

    #[tokio::test]
    async fn test_rotate_nonce_is_compare_and_swap() {
        let store = InMemoryIdentityStore::new();
        store
            .create("0xabc", WalletType::EcdsaRecoverable, 41)
            .await
            .unwrap();

        assert!(store.rotate_nonce("0xabc", 41, 42).await.unwrap());
        // Stale expectation loses
        assert!(!store.rotate_nonce("0xabc", 41, 43).await.unwrap());
        // Unknown address loses
        assert!(!store.rotate_nonce("0xdef", 42, 43).await.unwrap());

        let identity = store.find_by_address("0xabc").await.unwrap().unwrap();
        assert_eq!(identity.nonce, 42);
    }
}
