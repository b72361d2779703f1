//! Blockchain integration subsystem.
//!
//! # Data Flow
//! ```text
//! Request bytes (signed envelope, or unsigned tx + r||s)
//!     → transaction.rs (decode, EIP-155 signing hash)
//!     → signature.rs (canonical s, recovery id search)
//!     → client.rs (dial, submit, receipts, headers)
//!
//! CLI side:
//!     keystore.rs (encrypted accounts) → wallet.rs (detached signing)
//!     address.rs (hex <-> NEW address format)
//!     units.rs (NEW / ISAAC amounts)
//! ```
//!
//! # Security Constraints
//! - The server never holds private keys
//! - Never log private keys or sensitive data
//! - All RPC calls have configurable timeouts

pub mod address;
pub mod client;
pub mod keystore;
pub mod signature;
pub mod transaction;
pub mod types;
pub mod units;
pub mod wallet;

pub use client::{ChainClient, ChainConnector, RpcChainClient, RpcConnector};
pub use types::{BlockchainConfig, ChainError, ChainResult};
pub use keystore::{Keystore, KeystoreError};
pub use wallet::Wallet;
