//! Wallet signature verification
//!
//! Two schemes are supported: EIP-191 personal-sign over secp256k1 with
//! public key recovery (account-based chains) and detached Ed25519 against a
//! base58 public key (Solana-style chains). Dispatch happens once, on the
//! wallet type stored with the identity record.

use ed25519_dalek::{Signature as Ed25519Signature, Verifier, VerifyingKey as Ed25519VerifyingKey};
use k256::ecdsa::{RecoveryId, Signature as EcdsaSignature, VerifyingKey as EcdsaVerifyingKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use sha3::{Digest, Keccak256};
use thiserror::Error;

use crate::models::WalletType;

/// Errors that can occur during signature verification
///
/// Malformed client input is an expected case, never a panic: every decode
/// failure comes back as a typed error.
#[derive(Error, Debug)]
pub enum SignatureError {
    #[error("Malformed signature payload: {0}")]
    MalformedInput(String),

    #[error("Signature verification failed")]
    VerificationFailed,
}

/// Canonical challenge message for a stored nonce.
///
/// The nonce is always the server-stored value at the time verification
/// begins, which binds the signature to server state.
pub fn challenge_message(nonce: i64) -> String {
    format!("Sign this message: {}", nonce)
}

/// Verify a signature over the canonical challenge message for `nonce`.
///
/// `address` is the claimed wallet address; for `ecdsa-recoverable` it is an
/// `0x` hex account address compared case-insensitively against the recovered
/// signer, for `ed25519` it is the base58 verifying key itself.
pub fn verify_wallet_signature(
    wallet_type: WalletType,
    address: &str,
    nonce: i64,
    signature: &str,
) -> Result<(), SignatureError> {
    let message = challenge_message(nonce);
    match wallet_type {
        WalletType::EcdsaRecoverable => verify_ecdsa_recoverable(address, &message, signature),
        WalletType::Ed25519 => verify_ed25519(address, &message, signature),
    }
}

/// Recover the signer from a 65-byte `r || s || v` signature over the EIP-191
/// prefixed hash of `message` and compare it to the claimed address.
fn verify_ecdsa_recoverable(
    address: &str,
    message: &str,
    signature: &str,
) -> Result<(), SignatureError> {
    let sig_hex = signature.strip_prefix("0x").unwrap_or(signature);
    let sig_bytes = hex::decode(sig_hex)
        .map_err(|e| SignatureError::MalformedInput(format!("invalid hex: {}", e)))?;

    if sig_bytes.len() != 65 {
        return Err(SignatureError::MalformedInput(format!(
            "expected 65 signature bytes, got {}",
            sig_bytes.len()
        )));
    }

    let sig = EcdsaSignature::from_slice(&sig_bytes[..64])
        .map_err(|e| SignatureError::MalformedInput(format!("invalid signature: {}", e)))?;

    // Wallets emit v as 27/28; raw recovery ids are 0/1
    let v = sig_bytes[64];
    let recovery_id = RecoveryId::from_byte(if v >= 27 { v - 27 } else { v })
        .ok_or_else(|| SignatureError::MalformedInput(format!("invalid recovery id: {}", v)))?;

    let prehash = eip191_hash(message);
    let recovered_key = EcdsaVerifyingKey::recover_from_prehash(&prehash, &sig, recovery_id)
        .map_err(|_| SignatureError::VerificationFailed)?;

    if ethereum_address(&recovered_key).eq_ignore_ascii_case(address) {
        Ok(())
    } else {
        Err(SignatureError::VerificationFailed)
    }
}

/// Verify a detached Ed25519 signature over the raw message bytes.
fn verify_ed25519(address: &str, message: &str, signature: &str) -> Result<(), SignatureError> {
    let key_bytes: [u8; 32] = bs58::decode(address)
        .into_vec()
        .map_err(|e| SignatureError::MalformedInput(format!("invalid base58 address: {}", e)))?
        .try_into()
        .map_err(|_| SignatureError::MalformedInput("public key must be 32 bytes".to_string()))?;

    let sig_bytes: [u8; 64] = bs58::decode(signature)
        .into_vec()
        .map_err(|e| SignatureError::MalformedInput(format!("invalid base58 signature: {}", e)))?
        .try_into()
        .map_err(|_| SignatureError::MalformedInput("signature must be 64 bytes".to_string()))?;

    let verifying_key = Ed25519VerifyingKey::from_bytes(&key_bytes)
        .map_err(|e| SignatureError::MalformedInput(format!("invalid public key: {}", e)))?;
    let sig = Ed25519Signature::from_bytes(&sig_bytes);

    verifying_key
        .verify(message.as_bytes(), &sig)
        .map_err(|_| SignatureError::VerificationFailed)
}

/// EIP-191 personal-sign hash: Keccak-256 over the prefixed message.
pub fn eip191_hash(message: &str) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(format!("\x19Ethereum Signed Message:\n{}", message.len()));
    hasher.update(message.as_bytes());
    hasher.finalize().into()
}

/// Derive the `0x` account address for a secp256k1 verifying key: the last 20
/// bytes of the Keccak-256 hash of the uncompressed point.
pub fn ethereum_address(key: &EcdsaVerifyingKey) -> String {
    let point = key.to_encoded_point(false);
    let hash = Keccak256::digest(&point.as_bytes()[1..]);
    format!("0x{}", hex::encode(&hash[12..]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ed25519_dalek::{Signer, SigningKey as Ed25519SigningKey};
    use k256::ecdsa::SigningKey as EcdsaSigningKey;
    use rand::rngs::OsRng;

    fn ecdsa_sign(key: &EcdsaSigningKey, message: &str) -> String {
        let (sig, recovery_id) = key
            .sign_prehash_recoverable(&eip191_hash(message))
            .expect("signing");
        let mut bytes = sig.to_bytes().to_vec();
        bytes.push(recovery_id.to_byte() + 27);
        format!("0x{}", hex::encode(bytes))
    }

    fn ed25519_keypair() -> (Ed25519SigningKey, String) {
        let key = Ed25519SigningKey::generate(&mut OsRng);
        let address = bs58::encode(key.verifying_key().to_bytes()).into_string();
        (key, address)
    }

    #[test]
    fn test_ethereum_address_known_vector() {
        // Private key 0x...01 has a well-known account address
        let mut key_bytes = [0u8; 32];
        key_bytes[31] = 1;
        let key = EcdsaSigningKey::from_slice(&key_bytes).unwrap();
        assert_eq!(
            ethereum_address(key.verifying_key()),
            "0x7e5f4552091a69125d5dfcb7b8c2659029395bdf"
        );
    }

    #[test]
    fn test_ecdsa_signature_verifies() {
        let key = EcdsaSigningKey::random(&mut OsRng);
        let address = ethereum_address(key.verifying_key());
        let signature = ecdsa_sign(&key, &challenge_message(123_456));

        verify_wallet_signature(WalletType::EcdsaRecoverable, &address, 123_456, &signature)
            .unwrap();
    }

    #[test]
    fn test_ecdsa_address_comparison_ignores_case() {
        let key = EcdsaSigningKey::random(&mut OsRng);
        let address = ethereum_address(key.verifying_key()).to_uppercase();
        let address = format!("0x{}", &address[2..]);
        let signature = ecdsa_sign(&key, &challenge_message(7));

        verify_wallet_signature(WalletType::EcdsaRecoverable, &address, 7, &signature).unwrap();
    }

    #[test]
    fn test_ecdsa_wrong_nonce_fails() {
        let key = EcdsaSigningKey::random(&mut OsRng);
        let address = ethereum_address(key.verifying_key());
        let signature = ecdsa_sign(&key, &challenge_message(1));

        let err = verify_wallet_signature(WalletType::EcdsaRecoverable, &address, 2, &signature)
            .unwrap_err();
        assert!(matches!(err, SignatureError::VerificationFailed));
    }

    #[test]
    fn test_ecdsa_wrong_signer_fails() {
        let key = EcdsaSigningKey::random(&mut OsRng);
        let other = EcdsaSigningKey::random(&mut OsRng);
        let address = ethereum_address(other.verifying_key());
        let signature = ecdsa_sign(&key, &challenge_message(9));

        let err = verify_wallet_signature(WalletType::EcdsaRecoverable, &address, 9, &signature)
            .unwrap_err();
        assert!(matches!(err, SignatureError::VerificationFailed));
    }

    #[test]
    fn test_ecdsa_malformed_payloads() {
        let too_long = format!("0x{}", "00".repeat(66));
        let cases: [&str; 3] = ["not-hex", "0x1234", &too_long];
        for signature in cases {
            let err = verify_wallet_signature(
                WalletType::EcdsaRecoverable,
                "0x7e5f4552091a69125d5dfcb7b8c2659029395bdf",
                1,
                signature,
            )
            .unwrap_err();
            assert!(matches!(err, SignatureError::MalformedInput(_)), "{signature}");
        }
    }

    #[test]
    fn test_ed25519_signature_verifies() {
        let (key, address) = ed25519_keypair();
        let sig = key.sign(challenge_message(654_321).as_bytes());
        let signature = bs58::encode(sig.to_bytes()).into_string();

        verify_wallet_signature(WalletType::Ed25519, &address, 654_321, &signature).unwrap();
    }

    #[test]
    fn test_ed25519_wrong_nonce_fails() {
        let (key, address) = ed25519_keypair();
        let sig = key.sign(challenge_message(1).as_bytes());
        let signature = bs58::encode(sig.to_bytes()).into_string();

        let err =
            verify_wallet_signature(WalletType::Ed25519, &address, 2, &signature).unwrap_err();
        assert!(matches!(err, SignatureError::VerificationFailed));
    }

    #[test]
    fn test_ed25519_malformed_payloads() {
        let (_, address) = ed25519_keypair();
        // 0 and O are not base58 characters
        let err = verify_wallet_signature(WalletType::Ed25519, &address, 1, "0O0O").unwrap_err();
        assert!(matches!(err, SignatureError::MalformedInput(_)));

        // Valid base58 but not 64 bytes
        let short = bs58::encode([1u8; 10]).into_string();
        let err = verify_wallet_signature(WalletType::Ed25519, &address, 1, &short).unwrap_err();
        assert!(matches!(err, SignatureError::MalformedInput(_)));
    }

    #[test]
    fn test_scheme_isolation() {
        // A valid Ed25519 payload must not pass under the ECDSA scheme
        let (key, address) = ed25519_keypair();
        let sig = key.sign(challenge_message(5).as_bytes());
        let signature = bs58::encode(sig.to_bytes()).into_string();
        assert!(
            verify_wallet_signature(WalletType::EcdsaRecoverable, &address, 5, &signature).is_err()
        );

        // And a valid ECDSA payload must not pass under Ed25519
        let key = EcdsaSigningKey::random(&mut OsRng);
        let address = ethereum_address(key.verifying_key());
        let signature = ecdsa_sign(&key, &challenge_message(5));
        assert!(verify_wallet_signature(WalletType::Ed25519, &address, 5, &signature).is_err());
    }
}
