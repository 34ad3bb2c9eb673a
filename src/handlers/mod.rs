//! API handlers for the WalletGate backend

pub mod auth;

pub use auth::*;

// Re-export AuthenticatedWallet from middleware for handler use
pub use crate::middleware::auth::AuthenticatedWallet;
