//! Chain-specific types and error definitions.

use alloy::primitives::{TxHash, U256};
use thiserror::Error;

pub use crate::config::schema::BlockchainConfig;

/// Errors that can occur during blockchain operations.
#[derive(Debug, Error)]
pub enum ChainError {
    /// Could not establish a connection to the node.
    #[error("Dial error: {0}")]
    Dial(String),

    /// RPC connection or request failed.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// RPC request timed out.
    #[error("RPC timeout after {0} seconds")]
    Timeout(u64),

    /// The node rejected a submitted transaction.
    #[error("Transaction rejected: {0}")]
    Rejected(String),

    /// The requested header does not exist.
    #[error("Block {0} not found")]
    BlockNotFound(String),

    /// Invalid private key format or signing failure.
    #[error("Wallet error: {0}")]
    Wallet(String),

    /// Chain configuration mismatch.
    #[error("Chain ID mismatch: expected {expected}, got {actual}")]
    ChainMismatch { expected: u64, actual: u64 },
}

/// Result type for blockchain operations.
pub type ChainResult<T> = Result<T, ChainError>;

/// Which header to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockSelector {
    Latest,
    Number(u64),
}

impl std::fmt::Display for BlockSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BlockSelector::Latest => write!(f, "latest"),
            BlockSelector::Number(n) => write!(f, "{}", n),
        }
    }
}

/// The subset of a block header the relay cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockHeader {
    pub number: u64,
    /// Unix timestamp in seconds.
    pub timestamp: u64,
}

/// A mined transaction receipt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub tx_hash: TxHash,
    pub block_number: Option<u64>,
    /// `false` when execution reverted.
    pub status: bool,
}

/// Per-account state returned by `getBaseInfo`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountState {
    pub nonce_latest: u64,
    pub nonce_pending: u64,
    pub balance: U256,
}
