//! Wallet identity and signing.
//!
//! # Security
//! - Private keys come from configuration or a per-call override only
//! - Keys are never logged or serialized
//! - `Debug` output carries the address, nothing else

use alloy::primitives::B256;
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::SignerSync;
use sha2::{Digest, Sha256};

use crate::blockchain::types::{BlockchainError, BlockchainResult};

/// Environment variable name for the private key.
pub const PRIVATE_KEY_ENV_VAR: &str = "TMRW_PRIVATE_KEY";

/// A secp256k1 key with its chain address.
#[derive(Clone)]
pub struct Wallet {
    signer: PrivateKeySigner,
    address: String,
    public_key: String,
}

impl Wallet {
    /// Create a wallet from a hex-encoded private key string.
    ///
    /// The key must be exactly 32 bytes; an optional `0x` prefix is stripped.
    pub fn from_private_key(private_key_hex: &str) -> BlockchainResult<Self> {
        let key_hex = private_key_hex.trim();
        let key_hex = key_hex.strip_prefix("0x").unwrap_or(key_hex);
        if key_hex.len() != 64 {
            return Err(BlockchainError::InvalidKey(
                "expected 64 hex characters".to_string(),
            ));
        }

        let signer: PrivateKeySigner = key_hex
            .parse()
            .map_err(|_| BlockchainError::InvalidKey("not a valid secp256k1 scalar".to_string()))?;

        Ok(Self::from_signer(signer))
    }

    /// Throwaway wallet for read-only calls.
    pub fn random() -> Self {
        Self::from_signer(PrivateKeySigner::random())
    }

    fn from_signer(signer: PrivateKeySigner) -> Self {
        let point = signer.credential().verifying_key().to_encoded_point(false);
        let public_key_bytes = point.as_bytes();
        let address = address_from_public_key(public_key_bytes);
        Self {
            public_key: hex::encode(public_key_bytes),
            signer,
            address,
        }
    }

    /// Base58Check chain address.
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Uncompressed public key, hex encoded (130 characters, `04` prefix).
    pub fn public_key(&self) -> &str {
        &self.public_key
    }

    /// Sign a 32-byte digest.
    ///
    /// Returns `r ‖ s ‖ recovery` as 130 hex characters, each integer
    /// big-endian and zero padded to 32 bytes.
    pub fn sign_digest(&self, digest: [u8; 32]) -> BlockchainResult<String> {
        let signature = self
            .signer
            .sign_hash_sync(&B256::from(digest))
            .map_err(|e| BlockchainError::Sign(e.to_string()))?;

        let mut out = String::with_capacity(130);
        out.push_str(&hex::encode(signature.r().to_be_bytes::<32>()));
        out.push_str(&hex::encode(signature.s().to_be_bytes::<32>()));
        out.push_str(&format!("{:02x}", u8::from(signature.v())));
        Ok(out)
    }

    /// Sign the SHA-256 digest of `message`.
    pub fn sign_message(&self, message: &[u8]) -> BlockchainResult<String> {
        self.sign_digest(sha256(message))
    }
}

impl std::fmt::Debug for Wallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wallet").field("address", &self.address).finish()
    }
}

/// SHA-256 of `data`.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    Sha256::digest(data).into()
}

/// Chain address: Base58Check of the double SHA-256 of the public key.
pub fn address_from_public_key(public_key: &[u8]) -> String {
    let hash = sha256(&sha256(public_key));
    bs58::encode(hash).with_check().into_string()
}
