//! Submission entry point.
//!
//! # Responsibilities
//! - Decode signed transactions, or assemble one from an unsigned
//!   transaction plus a detached `r || s` signature
//! - Publish `Received` before anything touches the network
//! - Apply the caller's wait level
//!
//! # Wait levels
//! ```text
//! NoWait               → Received, queue broadcast, return hash
//! WaitForBroadcast     → Received, submit, Broadcast, hand to tracker, return hash
//! WaitForConfirmation  → Received, submit, Broadcast, wait mined, Confirmed, return hash
//! ```

use alloy::consensus::TxEnvelope;
use alloy::primitives::{Address, TxHash, U256, U64};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::blockchain::signature::{recover_signature, SignatureError, RAW_SIGNATURE_LEN};
use crate::blockchain::transaction::{
    attach_signature, decode_signed, decode_unsigned_legacy, envelope_chain_id, sender,
    signing_hash,
};
use crate::blockchain::{ChainConnector, ChainError};
use crate::observability::metrics;
use crate::relay::error::{RelayError, RelayResult};
use crate::relay::events::{LifecycleEvent, RelayEvent, WaitLevel};
use crate::relay::record::TransferRecord;
use crate::relay::router::EventRouter;

/// Network parameters captured once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkInfo {
    pub chain_id: u64,
    pub gas_price: u128,
}

impl NetworkInfo {
    /// Query the node for its chain id and gas price.
    ///
    /// A non-zero `expected_chain_id` must match what the node reports.
    pub async fn discover(
        connector: &dyn ChainConnector,
        expected_chain_id: u64,
    ) -> Result<Self, ChainError> {
        let client = connector.dial().await?;
        let chain_id = client.chain_id().await?;
        if expected_chain_id != 0 && expected_chain_id != chain_id {
            return Err(ChainError::ChainMismatch {
                expected: expected_chain_id,
                actual: chain_id,
            });
        }
        let gas_price = client.gas_price().await?;
        Ok(Self {
            chain_id,
            gas_price,
        })
    }
}

/// Account summary returned by `getBaseInfo`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseInfo {
    pub nonce_latest: U64,
    pub nonce_pending: U64,
    pub gas_price: U256,
    #[serde(rename = "networkID")]
    pub network_id: u64,
    pub balance: U256,
}

pub struct SubmissionGate {
    connector: Arc<dyn ChainConnector>,
    router: EventRouter,
    network: NetworkInfo,
    wait_poll: Duration,
}

impl SubmissionGate {
    pub fn new(
        connector: Arc<dyn ChainConnector>,
        router: EventRouter,
        network: NetworkInfo,
        wait_poll: Duration,
    ) -> Self {
        Self {
            connector,
            router,
            network,
            wait_poll,
        }
    }

    pub fn network(&self) -> NetworkInfo {
        self.network
    }

    /// Relay a fully signed transaction.
    pub async fn send_raw_transaction(&self, raw: &[u8], wait: WaitLevel) -> RelayResult<TxHash> {
        let result = self.accept_signed(raw, wait).await;
        observe(wait, &result);
        result
    }

    /// Relay an unsigned legacy transaction signed offline by `from`.
    pub async fn send_transaction(
        &self,
        from: Address,
        raw: &[u8],
        signature: &[u8],
        wait: WaitLevel,
    ) -> RelayResult<TxHash> {
        let result = self.accept_detached(from, raw, signature, wait).await;
        observe(wait, &result);
        result
    }

    pub async fn get_base_info(&self, address: Address) -> RelayResult<BaseInfo> {
        let client = self.connector.dial().await?;
        let state = client.account_state(address).await?;
        Ok(BaseInfo {
            nonce_latest: U64::from(state.nonce_latest),
            nonce_pending: U64::from(state.nonce_pending),
            gas_price: U256::from(self.network.gas_price),
            network_id: self.network.chain_id,
            balance: state.balance,
        })
    }

    async fn accept_signed(&self, raw: &[u8], wait: WaitLevel) -> RelayResult<TxHash> {
        let envelope = decode_signed(raw)?;
        if let Some(actual) = envelope_chain_id(&envelope) {
            if actual != self.network.chain_id {
                return Err(RelayError::WrongChain {
                    expected: self.network.chain_id,
                    actual,
                });
            }
        }
        let from = sender(&envelope)?;
        self.relay(envelope, from, wait).await
    }

    async fn accept_detached(
        &self,
        from: Address,
        raw: &[u8],
        signature: &[u8],
        wait: WaitLevel,
    ) -> RelayResult<TxHash> {
        if signature.len() != RAW_SIGNATURE_LEN {
            return Err(SignatureError::InvalidSignatureLength(signature.len()).into());
        }

        let tx = decode_unsigned_legacy(raw, self.network.chain_id)?;
        let hash = signing_hash(&tx);
        let recovered = recover_signature(&hash, signature, from)?;
        let envelope = attach_signature(tx, recovered.to_tx_signature()?);

        self.relay(envelope, from, wait).await
    }

    async fn relay(
        &self,
        envelope: TxEnvelope,
        from: Address,
        wait: WaitLevel,
    ) -> RelayResult<TxHash> {
        let record = TransferRecord::from_envelope(&envelope, from);
        let hash = record.hash;
        tracing::info!(tx_hash = %hash, from = %from, wait = wait.as_str(), "Transaction received");

        self.router
            .notify(LifecycleEvent::received(record.clone()))
            .await?;

        if wait == WaitLevel::NoWait {
            self.router
                .send(RelayEvent::Broadcast {
                    envelope: Box::new(envelope),
                    record,
                })
                .await?;
            return Ok(hash);
        }

        let client = self.connector.dial().await?;
        client.send_transaction(&envelope).await?;
        self.router
            .notify(LifecycleEvent::broadcast(record.clone()))
            .await?;

        if wait == WaitLevel::WaitForBroadcast {
            self.router.send(RelayEvent::Watch(record)).await?;
            return Ok(hash);
        }

        let receipt = client.wait_mined(hash, self.wait_poll).await?;
        if !receipt.status {
            metrics::record_reverted_confirmation();
            tracing::warn!(
                tx_hash = %hash,
                block = ?receipt.block_number,
                "Transaction mined but reverted"
            );
        }
        self.router
            .notify(LifecycleEvent::confirmed(record.mined_in(receipt.block_number)))
            .await?;
        Ok(hash)
    }
}

fn observe(wait: WaitLevel, result: &RelayResult<TxHash>) {
    let outcome = match result {
        Ok(_) => "accepted",
        Err(e) => {
            tracing::warn!(wait = wait.as_str(), error = %e, "Submission rejected");
            e.kind()
        }
    };
    metrics::record_submission(wait.as_str(), outcome);
}

impl std::fmt::Debug for SubmissionGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubmissionGate")
            .field("network", &self.network)
            .field("wait_poll", &self.wait_poll)
            .finish()
    }
}
