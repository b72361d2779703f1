//! Local state of the companion CLI.
//!
//! `express-cli info --update` snapshots network parameters and per-account
//! nonces and balances into a TOML file so later commands (and the operator)
//! can read them without another round trip.

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::blockchain::transaction::TRANSFER_GAS_LIMIT;
use crate::relay::BaseInfo;

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Encode error: {0}")]
    Encode(#[from] toml::ser::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct AccountSnapshot {
    pub nonce_latest: u64,
    pub nonce_pending: u64,
    /// Decimal ISAAC.
    pub balance: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ClientProfile {
    pub rpc_url: Option<String>,
    pub chain_id: Option<u64>,
    /// Decimal ISAAC.
    pub gas_price: Option<String>,
    pub gas_limit: Option<u64>,
    /// Keyed by checksummed hex address.
    pub accounts: BTreeMap<String, AccountSnapshot>,
}

impl ClientProfile {
    /// Load `path`, or an empty profile when it does not exist yet.
    pub fn load(path: &Path) -> Result<Self, ProfileError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        Ok(toml::from_str(&fs::read_to_string(path)?)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), ProfileError> {
        fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Record what the relay reported for `address`. Network parameters are
    /// overwritten; the gas limit and URL are only filled when unset.
    pub fn record(&mut self, rpc_url: &str, address: Address, info: &BaseInfo) {
        self.chain_id = Some(info.network_id);
        self.gas_price = Some(info.gas_price.to_string());
        self.gas_limit.get_or_insert(TRANSFER_GAS_LIMIT);
        if self.rpc_url.is_none() {
            self.rpc_url = Some(rpc_url.to_string());
        }
        self.accounts.insert(
            address.to_checksum(None),
            AccountSnapshot {
                nonce_latest: info.nonce_latest.to::<u64>(),
                nonce_pending: info.nonce_pending.to::<u64>(),
                balance: info.balance.to_string(),
            },
        );
    }
}
