//! Client-side signing for the companion CLI.
//!
//! # Security
//! - Private keys come from the encrypted keystore or an environment variable
//! - Keys are never logged or serialized
//! - The relay server never holds a key; it only recovers signatures

use alloy::primitives::{Address, B256};
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::SignerSync;

use crate::blockchain::signature::RAW_SIGNATURE_LEN;
use crate::blockchain::types::{ChainError, ChainResult};

/// Environment variable name for the private key.
pub const PRIVATE_KEY_ENV_VAR: &str = "EXPRESS_CLI_PRIVATE_KEY";

/// Offline signer producing detached `r || s` signatures.
#[derive(Debug, Clone)]
pub struct Wallet {
    signer: PrivateKeySigner,
}

impl Wallet {
    /// Create a wallet from a hex-encoded private key string.
    ///
    /// # Arguments
    /// * `private_key_hex` - Hex string (with or without 0x prefix)
    pub fn from_private_key(private_key_hex: &str) -> ChainResult<Self> {
        let key_hex = private_key_hex.strip_prefix("0x").unwrap_or(private_key_hex);

        let signer: PrivateKeySigner = key_hex
            .parse()
            .map_err(|e| ChainError::Wallet(format!("Invalid private key format: {}", e)))?;

        tracing::debug!(address = %signer.address(), "Wallet initialized");

        Ok(Self { signer })
    }

    /// Wrap a signer unlocked from the keystore.
    pub fn from_signer(signer: PrivateKeySigner) -> Self {
        tracing::debug!(address = %signer.address(), "Wallet initialized");
        Self { signer }
    }

    /// Load wallet from environment variable.
    ///
    /// Reads `EXPRESS_CLI_PRIVATE_KEY` from environment.
    pub fn from_env() -> ChainResult<Self> {
        let private_key = std::env::var(PRIVATE_KEY_ENV_VAR).map_err(|_| {
            ChainError::Wallet(format!(
                "Environment variable {} not set",
                PRIVATE_KEY_ENV_VAR
            ))
        })?;

        Self::from_private_key(&private_key)
    }

    /// Get the wallet's address.
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Sign a 32-byte hash and drop the recovery id.
    pub fn sign_detached(&self, hash: &B256) -> ChainResult<[u8; RAW_SIGNATURE_LEN]> {
        let signature = self
            .signer
            .sign_hash_sync(hash)
            .map_err(|e| ChainError::Wallet(format!("Signing failed: {}", e)))?;
        let mut out = [0u8; RAW_SIGNATURE_LEN];
        out.copy_from_slice(&signature.as_bytes()[..RAW_SIGNATURE_LEN]);
        Ok(out)
    }
}
