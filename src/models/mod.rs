//! Data models for the WalletGate backend

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Signature scheme a wallet authenticates with.
///
/// The stored value is authoritative: verification always dispatches on the
/// wallet type recorded at challenge creation, never on a client-supplied tag.
#[derive(Debug, Serialize, Deserialize, sqlx::Type, Clone, Copy, PartialEq, Eq)]
#[sqlx(type_name = "wallet_type", rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum WalletType {
    /// EIP-191 personal-sign over secp256k1 with public key recovery.
    EcdsaRecoverable,
    /// Detached Ed25519 signature against a base58 public key.
    Ed25519,
}

impl WalletType {
    pub fn as_str(&self) -> &'static str {
        match self {
            WalletType::EcdsaRecoverable => "ecdsa-recoverable",
            WalletType::Ed25519 => "ed25519",
        }
    }
}

impl fmt::Display for WalletType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WalletType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ecdsa-recoverable" => Ok(WalletType::EcdsaRecoverable),
            "ed25519" => Ok(WalletType::Ed25519),
            _ => Err(()),
        }
    }
}

/// Identity record, one per wallet address.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct Identity {
    pub address: String,
    pub wallet_type: WalletType,
    /// Single-use challenge value; rotated after every successful authentication.
    pub nonce: i64,
}

// ============================================================================
// Request/Response DTOs
// ============================================================================

/// Request for an authentication challenge
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NonceRequest {
    pub wallet_address: String,
    pub wallet_type: String,
}

/// Response containing the challenge nonce
#[derive(Debug, Serialize, Deserialize)]
pub struct NonceResponse {
    pub nonce: i64,
}

/// Request to exchange a signed challenge for a session token
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizeRequest {
    pub wallet_address: String,
    /// Accepted for wire compatibility; scheme selection uses the stored record.
    #[serde(default)]
    pub wallet_type: Option<String>,
    pub signature: String,
}

/// Session token response
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Identity response (sanitized for API; the live nonce is never echoed here)
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityResponse {
    pub address: String,
    pub wallet_type: WalletType,
}

impl From<Identity> for IdentityResponse {
    fn from(identity: Identity) -> Self {
        Self {
            address: identity.address,
            wallet_type: identity.wallet_type,
        }
    }
}
