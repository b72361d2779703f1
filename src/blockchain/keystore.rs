//! Encrypted key files for the companion CLI.
//!
//! # Security
//! - Keys rest only as Web3 secret-storage JSON (scrypt + AES-128-CTR)
//! - Passwords are supplied by the caller and never logged
//! - One file per account, named by its lowercase hex address

use alloy::primitives::{Address, B256};
use alloy::signers::local::{LocalSignerError, PrivateKeySigner};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::blockchain::wallet::Wallet;

/// Password used to unlock or create keystore accounts.
pub const PASSWORD_ENV_VAR: &str = "EXPRESS_CLI_PASSWORD";
/// Replacement password for `account update`.
pub const NEW_PASSWORD_ENV_VAR: &str = "EXPRESS_CLI_NEW_PASSWORD";

/// Read a password from `var`. Empty passwords are refused.
pub fn password_from_env(var: &'static str) -> Result<String, KeystoreError> {
    match std::env::var(var) {
        Ok(password) if !password.is_empty() => Ok(password),
        _ => Err(KeystoreError::MissingPassword(var)),
    }
}

#[derive(Debug, Error)]
pub enum KeystoreError {
    #[error("keystore IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("keystore error: {0}")]
    Signer(#[from] LocalSignerError),

    #[error("invalid private key: {0}")]
    InvalidKey(String),

    #[error("account {0} is not in the keystore")]
    NotFound(Address),

    #[error("account {0} already exists")]
    Exists(Address),

    #[error("environment variable {0} not set")]
    MissingPassword(&'static str),
}

/// A directory of encrypted accounts.
#[derive(Debug, Clone)]
pub struct Keystore {
    dir: PathBuf,
}

impl Keystore {
    /// Open `dir`, creating it if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, KeystoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn file_name(address: Address) -> String {
        format!("{address:x}")
    }

    fn path_for(&self, address: Address) -> PathBuf {
        self.dir.join(Self::file_name(address))
    }

    pub fn contains(&self, address: Address) -> bool {
        self.path_for(address).is_file()
    }

    /// Generate a fresh key and store it under `password`.
    pub fn create(&self, password: &str) -> Result<Address, KeystoreError> {
        self.store(&PrivateKeySigner::random(), password)
    }

    /// Store an existing hex private key (with or without `0x`).
    pub fn import(&self, private_key_hex: &str, password: &str) -> Result<Address, KeystoreError> {
        let key_hex = private_key_hex.trim();
        let key_hex = key_hex
            .strip_prefix("0x")
            .or_else(|| key_hex.strip_prefix("0X"))
            .unwrap_or(key_hex);
        let signer: PrivateKeySigner = key_hex
            .parse()
            .map_err(|e| KeystoreError::InvalidKey(format!("{e}")))?;

        if self.contains(signer.address()) {
            return Err(KeystoreError::Exists(signer.address()));
        }
        self.store(&signer, password)
    }

    fn store(&self, signer: &PrivateKeySigner, password: &str) -> Result<Address, KeystoreError> {
        let address = signer.address();
        let name = Self::file_name(address);
        PrivateKeySigner::encrypt_keystore(
            &self.dir,
            &mut rand::thread_rng(),
            signer.to_bytes(),
            password,
            Some(&name),
        )?;
        tracing::debug!(address = %address, dir = %self.dir.display(), "Account stored");
        Ok(address)
    }

    /// Every account in the directory, sorted. Files that are not named by an
    /// address are ignored.
    pub fn accounts(&self) -> Result<Vec<Address>, KeystoreError> {
        let mut accounts = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            if let Some(address) = entry
                .file_name()
                .to_str()
                .and_then(|name| name.parse::<Address>().ok())
            {
                accounts.push(address);
            }
        }
        accounts.sort();
        Ok(accounts)
    }

    fn decrypt(&self, address: Address, password: &str) -> Result<PrivateKeySigner, KeystoreError> {
        if !self.contains(address) {
            return Err(KeystoreError::NotFound(address));
        }
        Ok(PrivateKeySigner::decrypt_keystore(self.path_for(address), password)?)
    }

    pub fn unlock(&self, address: Address, password: &str) -> Result<Wallet, KeystoreError> {
        Ok(Wallet::from_signer(self.decrypt(address, password)?))
    }

    /// Decrypt and return the raw private key.
    pub fn export(&self, address: Address, password: &str) -> Result<B256, KeystoreError> {
        Ok(self.decrypt(address, password)?.to_bytes())
    }

    /// Re-encrypt an account under a new password.
    pub fn update(&self, address: Address, old: &str, new: &str) -> Result<(), KeystoreError> {
        let signer = self.decrypt(address, old)?;
        self.store(&signer, new)?;
        Ok(())
    }
}
