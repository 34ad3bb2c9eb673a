//! Identity persistence for WalletGate
//!
//! The authentication core only ever touches storage through the
//! [`IdentityStore`] trait: a key-value view keyed by wallet address. The
//! Postgres implementation backs the server; the in-memory implementation
//! backs the test suite.

mod memory;
mod postgres;

pub use memory::InMemoryIdentityStore;
pub use postgres::PgIdentityStore;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Identity, WalletType};

/// Store errors
#[derive(Error, Debug)]
pub enum StoreError {
    /// An identity already exists for this address (lost a creation race).
    #[error("Identity already exists for this address")]
    DuplicateAddress,

    #[error("Database error: {0}")]
    Database(String),
}

/// Key-value view of identity records, keyed by canonical wallet address.
///
/// Implementations must enforce address uniqueness at the storage boundary and
/// make nonce rotation a single atomic compare-and-swap, not a read-then-write
/// pair: concurrent `authorize` calls for the same address must not both
/// observe the same nonce as current.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    async fn find_by_address(&self, address: &str) -> Result<Option<Identity>, StoreError>;

    /// Insert a new identity. Fails with [`StoreError::DuplicateAddress`] if
    /// the address is already present; callers recover by re-reading.
    async fn create(
        &self,
        address: &str,
        wallet_type: WalletType,
        nonce: i64,
    ) -> Result<Identity, StoreError>;

    /// Atomically replace `expected` with `new_nonce` for `address`.
    ///
    /// Returns `false` when the stored nonce no longer equals `expected`,
    /// meaning another request consumed the challenge first.
    async fn rotate_nonce(
        &self,
        address: &str,
        expected: i64,
        new_nonce: i64,
    ) -> Result<bool, StoreError>;

    /// Connectivity probe for health checks.
    async fn ping(&self) -> Result<(), StoreError>;
}
