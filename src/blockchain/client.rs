//! Blockchain RPC client with timeout and error handling.
//!
//! # Responsibilities
//! - Dial a JSON-RPC endpoint (primary, then failovers)
//! - Submit signed transactions
//! - Query chain state (headers, receipts, nonces, balances)
//! - Wait for a transaction to be mined

use alloy::consensus::TxEnvelope;
use alloy::eips::eip2718::Encodable2718;
use alloy::eips::BlockNumberOrTag;
use alloy::primitives::{Address, TxHash};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

use crate::blockchain::types::{
    AccountState, BlockHeader, BlockSelector, BlockchainConfig, ChainError, ChainResult, Receipt,
};

/// Produces connected chain clients.
///
/// The relay dials per operation (broadcast, polling tick) so a node restart
/// never leaves a background loop holding a dead connection.
#[async_trait]
pub trait ChainConnector: Send + Sync {
    async fn dial(&self) -> ChainResult<Arc<dyn ChainClient>>;
}

/// Operations the relay needs from a connected node.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Submit a signed transaction to the node's pool.
    async fn send_transaction(&self, tx: &TxEnvelope) -> ChainResult<()>;

    /// Receipt for `hash`, or `None` when the node does not know it yet.
    async fn transaction_receipt(&self, hash: TxHash) -> ChainResult<Option<Receipt>>;

    async fn header_by_number(&self, block: BlockSelector) -> ChainResult<BlockHeader>;

    async fn chain_id(&self) -> ChainResult<u64>;

    async fn gas_price(&self) -> ChainResult<u128>;

    async fn account_state(&self, address: Address) -> ChainResult<AccountState>;

    /// Block until the transaction has a receipt.
    ///
    /// Query errors are logged and polling continues; the only way out is a
    /// receipt, so callers bound this with their own deadline if needed.
    async fn wait_mined(&self, hash: TxHash, poll: Duration) -> ChainResult<Receipt> {
        let mut ticker = tokio::time::interval(poll);
        loop {
            ticker.tick().await;
            match self.transaction_receipt(hash).await {
                Ok(Some(receipt)) => return Ok(receipt),
                Ok(None) => tracing::trace!(tx_hash = %hash, "Transaction not yet mined"),
                Err(e) => tracing::warn!(tx_hash = %hash, error = %e, "Receipt retrieval failed"),
            }
        }
    }
}

/// Dials `alloy` providers for the configured endpoints.
#[derive(Clone)]
pub struct RpcConnector {
    config: BlockchainConfig,
}

impl RpcConnector {
    pub fn new(config: BlockchainConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BlockchainConfig {
        &self.config
    }
}

#[async_trait]
impl ChainConnector for RpcConnector {
    async fn dial(&self) -> ChainResult<Arc<dyn ChainClient>> {
        let timeout_secs = self.config.rpc_timeout_secs;
        let urls = std::iter::once(&self.config.rpc_url).chain(self.config.failover_urls.iter());

        for (i, url) in urls.enumerate() {
            let fut = ProviderBuilder::new().connect(url);
            match timeout(Duration::from_secs(timeout_secs), fut).await {
                Ok(Ok(provider)) => {
                    return Ok(Arc::new(RpcChainClient::new(provider.erased(), timeout_secs)));
                }
                Ok(Err(e)) => {
                    tracing::warn!(
                        provider_idx = i,
                        url = %url,
                        error = %e,
                        "Dial failed, trying next endpoint"
                    );
                }
                Err(_) => {
                    tracing::warn!(
                        provider_idx = i,
                        url = %url,
                        "Dial timeout, trying next endpoint"
                    );
                }
            }
        }
        Err(ChainError::Dial(format!(
            "All RPC endpoints failed (primary {})",
            self.config.rpc_url
        )))
    }
}

impl std::fmt::Debug for RpcConnector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcConnector")
            .field("rpc_url", &self.config.rpc_url)
            .field("failover_urls", &self.config.failover_urls.len())
            .field("timeout_secs", &self.config.rpc_timeout_secs)
            .finish()
    }
}

/// A connected JSON-RPC node.
#[derive(Clone)]
pub struct RpcChainClient {
    provider: DynProvider,
    timeout_secs: u64,
}

impl RpcChainClient {
    pub fn new(provider: DynProvider, timeout_secs: u64) -> Self {
        Self {
            provider,
            timeout_secs,
        }
    }

    async fn call<T, E, F>(&self, fut: F) -> ChainResult<T>
    where
        F: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        match timeout(Duration::from_secs(self.timeout_secs), fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(ChainError::Rpc(e.to_string())),
            Err(_) => Err(ChainError::Timeout(self.timeout_secs)),
        }
    }
}

#[async_trait]
impl ChainClient for RpcChainClient {
    async fn send_transaction(&self, tx: &TxEnvelope) -> ChainResult<()> {
        let encoded = tx.encoded_2718();
        let fut = async { self.provider.send_raw_transaction(&encoded).await };
        match self.call(fut).await {
            Ok(_pending) => Ok(()),
            Err(ChainError::Rpc(msg)) => Err(ChainError::Rejected(msg)),
            Err(e) => Err(e),
        }
    }

    async fn transaction_receipt(&self, hash: TxHash) -> ChainResult<Option<Receipt>> {
        let receipt = self
            .call(async { self.provider.get_transaction_receipt(hash).await })
            .await?;
        Ok(receipt.map(|r| Receipt {
            tx_hash: r.transaction_hash,
            block_number: r.block_number,
            status: r.status(),
        }))
    }

    async fn header_by_number(&self, block: BlockSelector) -> ChainResult<BlockHeader> {
        let tag = match block {
            BlockSelector::Latest => BlockNumberOrTag::Latest,
            BlockSelector::Number(n) => BlockNumberOrTag::Number(n),
        };
        let fetched = self
            .call(async { self.provider.get_block_by_number(tag).await })
            .await?;
        let block_data = fetched.ok_or_else(|| ChainError::BlockNotFound(block.to_string()))?;
        Ok(BlockHeader {
            number: block_data.header.number,
            timestamp: block_data.header.timestamp,
        })
    }

    async fn chain_id(&self) -> ChainResult<u64> {
        self.call(async { self.provider.get_chain_id().await }).await
    }

    async fn gas_price(&self) -> ChainResult<u128> {
        self.call(async { self.provider.get_gas_price().await }).await
    }

    async fn account_state(&self, address: Address) -> ChainResult<AccountState> {
        let nonce_latest = self
            .call(async { self.provider.get_transaction_count(address).latest().await })
            .await?;
        let nonce_pending = self
            .call(async { self.provider.get_transaction_count(address).pending().await })
            .await?;
        let balance = self
            .call(async { self.provider.get_balance(address).await })
            .await?;
        Ok(AccountState {
            nonce_latest,
            nonce_pending,
            balance,
        })
    }
}

impl std::fmt::Debug for RpcChainClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcChainClient")
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}
