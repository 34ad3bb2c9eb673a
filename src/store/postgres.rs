//! Postgres-backed identity store

use async_trait::async_trait;
use sqlx::PgPool;

use super::{IdentityStore, StoreError};
use crate::models::{Identity, WalletType};

/// Identity store backed by the `identities` table.
///
/// Address uniqueness comes from the primary key; rotation is a conditional
/// `UPDATE` so concurrent authorizations cannot both consume one nonce.
#[derive(Clone)]
pub struct PgIdentityStore {
    pool: PgPool,
}

impl PgIdentityStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        if e.as_database_error()
            .is_some_and(|db| db.is_unique_violation())
        {
            StoreError::DuplicateAddress
        } else {
            StoreError::Database(e.to_string())
        }
    }
}

#[async_trait]
impl IdentityStore for PgIdentityStore {
    async fn find_by_address(&self, address: &str) -> Result<Option<Identity>, StoreError> {
        let identity: Option<Identity> = sqlx::query_as(
            r#"
            SELECT address, wallet_type, nonce
            FROM identities
            WHERE address = $1
            "#,
        )
        .bind(address)
        .fetch_optional(&self.pool)
        .await?;

        Ok(identity)
    }

    async fn create(
        &self,
        address: &str,
        wallet_type: WalletType,
        nonce: i64,
    ) -> Result<Identity, StoreError> {
        sqlx::query(
            r#"
            INSERT INTO identities (address, wallet_type, nonce)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(address)
        .bind(wallet_type)
        .bind(nonce)
        .execute(&self.pool)
        .await?;

        Ok(Identity {
            address: address.to_string(),
            wallet_type,
            nonce,
        })
    }

    async fn rotate_nonce(
        &self,
        address: &str,
        expected: i64,
        new_nonce: i64,
    ) -> Result<bool, StoreError> {
        let rows_affected = sqlx::query(
            r#"
            UPDATE identities
            SET nonce = $1, updated_at = NOW()
            WHERE address = $2 AND nonce = $3
            "#,
        )
        .bind(new_nonce)
        .bind(address)
        .bind(expected)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(rows_affected == 1)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
