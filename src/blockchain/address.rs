//! NewChain address format.
//!
//! `NEW` followed by base58check (version 0) of the chain id's minimal
//! big-endian bytes and the 20-byte address. The same key therefore has a
//! different NEW address on every chain.

use alloy::primitives::Address;
use thiserror::Error;

pub const NEW_ADDRESS_PREFIX: &str = "NEW";

const VERSION: u8 = 0;
const ADDRESS_LEN: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("not a NEW address")]
    MissingPrefix,

    #[error("base58check decode failed: {0}")]
    Decode(String),

    #[error("illegal decoded length")]
    Length,

    #[error("illegal chain id")]
    ChainId,

    #[error("neither a hex nor a NEW address: {0}")]
    Unrecognized(String),
}

fn chain_id_bytes(chain_id: u64) -> Vec<u8> {
    let bytes = chain_id.to_be_bytes();
    let first = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len());
    bytes[first..].to_vec()
}

pub fn to_new_address(chain_id: u64, address: Address) -> String {
    let mut payload = chain_id_bytes(chain_id);
    payload.extend_from_slice(address.as_slice());
    let encoded = bs58::encode(payload).with_check_version(VERSION).into_string();
    format!("{NEW_ADDRESS_PREFIX}{encoded}")
}

pub fn from_new_address(chain_id: u64, new_address: &str) -> Result<Address, AddressError> {
    let encoded = new_address
        .strip_prefix(NEW_ADDRESS_PREFIX)
        .ok_or(AddressError::MissingPrefix)?;
    let decoded = bs58::decode(encoded)
        .with_check(Some(VERSION))
        .into_vec()
        .map_err(|e| AddressError::Decode(e.to_string()))?;

    // The version byte leads the decoded bytes.
    let payload = decoded.split_first().map(|(_, rest)| rest).unwrap_or_default();
    if payload.len() < ADDRESS_LEN {
        return Err(AddressError::Length);
    }
    let (chain, address) = payload.split_at(payload.len() - ADDRESS_LEN);
    if chain != chain_id_bytes(chain_id).as_slice() {
        return Err(AddressError::ChainId);
    }
    Ok(Address::from_slice(address))
}

/// Parse either a `0x` hex address or a NEW address for `chain_id`.
pub fn parse_address(chain_id: u64, input: &str) -> Result<Address, AddressError> {
    if input.starts_with(NEW_ADDRESS_PREFIX) {
        return from_new_address(chain_id, input);
    }
    input
        .parse::<Address>()
        .map_err(|_| AddressError::Unrecognized(input.to_string()))
}
