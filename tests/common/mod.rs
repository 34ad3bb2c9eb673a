//! Shared helpers for integration tests: signing keys for both wallet types.
#![allow(dead_code)]

use ed25519_dalek::{Signer, SigningKey as Ed25519SigningKey};
use k256::ecdsa::SigningKey as EcdsaSigningKey;
use rand::rngs::OsRng;

use walletgate_server::auth::{challenge_message, eip191_hash, ethereum_address};

/// Fresh secp256k1 key and its lowercase account address.
pub fn ecdsa_keypair() -> (EcdsaSigningKey, String) {
    let key = EcdsaSigningKey::random(&mut OsRng);
    let address = ethereum_address(key.verifying_key());
    (key, address)
}

/// Sign the canonical challenge message for `nonce` as a wallet would:
/// EIP-191 prefix, 65-byte `r || s || v` hex payload.
pub fn ecdsa_sign(key: &EcdsaSigningKey, nonce: i64) -> String {
    let hash = eip191_hash(&challenge_message(nonce));
    let (sig, recovery_id) = key.sign_prehash_recoverable(&hash).expect("signing");
    let mut bytes = sig.to_bytes().to_vec();
    bytes.push(recovery_id.to_byte() + 27);
    format!("0x{}", hex::encode(bytes))
}

/// Fresh Ed25519 key and its base58 address.
pub fn ed25519_keypair() -> (Ed25519SigningKey, String) {
    let key = Ed25519SigningKey::generate(&mut OsRng);
    let address = bs58::encode(key.verifying_key().to_bytes()).into_string();
    (key, address)
}

/// Detached Ed25519 signature over the raw challenge message, base58 encoded.
pub fn ed25519_sign(key: &Ed25519SigningKey, nonce: i64) -> String {
    let sig = key.sign(challenge_message(nonce).as_bytes());
    bs58::encode(sig.to_bytes()).into_string()
}
