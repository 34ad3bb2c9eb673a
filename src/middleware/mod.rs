//! Middleware for the WalletGate API

pub mod auth;

pub use auth::AuthenticatedWallet;
