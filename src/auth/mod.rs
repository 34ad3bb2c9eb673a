//! Authentication module for WalletGate
//!
//! Wallet-based challenge-response authentication:
//! - single-use nonce challenges per wallet address
//! - multi-scheme signature verification (ECDSA recovery, Ed25519)
//! - JWT session token issuance

mod crypto;
mod jwt;
mod nonce;
mod service;

pub use crypto::{
    challenge_message, eip191_hash, ethereum_address, verify_wallet_signature, SignatureError,
};
pub use jwt::{Claims, TokenError, TokenIssuer};
pub use nonce::NonceManager;
pub use service::{AuthError, AuthService};
