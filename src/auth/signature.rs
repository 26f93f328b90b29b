//! Signed proof of key ownership for the token exchange.
//!
//! The backend recomputes `sha256("{address}-{timestamp}")` and verifies the
//! signature against the supplied public key. Any change to the message
//! layout yields a valid-looking but rejected signature.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::blockchain::types::BlockchainResult;
use crate::blockchain::wallet::Wallet;

#[derive(Clone, PartialEq, Eq)]
pub struct SignaturePayload {
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
    pub address: String,
    pub public_key: String,
    pub signature: String,
}

impl fmt::Debug for SignaturePayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignaturePayload")
            .field("timestamp", &self.timestamp)
            .field("address", &self.address)
            .field("public_key", &self.public_key)
            .field("signature", &"[REDACTED]")
            .finish()
    }
}

/// The exact text whose SHA-256 digest gets signed.
pub fn auth_message(address: &str, timestamp: u64) -> String {
    format!("{}-{}", address, timestamp)
}

pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

/// Build the auth payload for `private_key`. `timestamp` defaults to now.
pub fn build_auth_payload(private_key: &str, timestamp: Option<u64>) -> BlockchainResult<SignaturePayload> {
    let wallet = Wallet::from_private_key(private_key)?;
    let timestamp = timestamp.unwrap_or_else(now_millis);
    let message = auth_message(wallet.address(), timestamp);
    let signature = wallet.sign_message(message.as_bytes())?;

    Ok(SignaturePayload {
        timestamp,
        address: wallet.address().to_string(),
        public_key: wallet.public_key().to_string(),
        signature,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::wallet::sha256;

    const KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    #[test]
    fn test_payload_is_deterministic_for_fixed_timestamp() {
        let a = build_auth_payload(KEY, Some(1_700_000_000_000)).unwrap();
        let b = build_auth_payload(&format!("0x{}", KEY), Some(1_700_000_000_000)).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.signature.len(), 130);
        assert_eq!(a.timestamp, 1_700_000_000_000);
    }

    #[test]
    fn test_signature_covers_address_and_timestamp() {
        let payload = build_auth_payload(KEY, Some(42)).unwrap();
        let wallet = Wallet::from_private_key(KEY).unwrap();
        let expected = wallet
            .sign_digest(sha256(format!("{}-42", wallet.address()).as_bytes()))
            .unwrap();
        assert_eq!(payload.signature, expected);

        let later = build_auth_payload(KEY, Some(43)).unwrap();
        assert_ne!(payload.signature, later.signature);
    }

    #[test]
    fn test_invalid_key_rejected() {
        let err = build_auth_payload("1234", None).unwrap_err();
        assert_eq!(err.code(), "INVALID_PRIVATE_KEY");
    }

    #[test]
    fn test_default_timestamp_is_now() {
        let before = now_millis();
        let payload = build_auth_payload(KEY, None).unwrap();
        assert!(payload.timestamp >= before);
        assert!(!format!("{:?}", payload).contains(&payload.signature));
    }
}
