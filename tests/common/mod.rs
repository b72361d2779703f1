//! Shared utilities for integration tests: a scriptable chain and a
//! recording notification sink.

#![allow(dead_code)]

use alloy::consensus::{SignableTransaction, TxEnvelope, TxLegacy};
use alloy::eips::eip2718::Encodable2718;
use alloy::primitives::{Address, Bytes, TxHash, TxKind, U256};
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::SignerSync;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

use tx_express::blockchain::transaction::{attach_signature, build_transfer};
use tx_express::blockchain::types::{AccountState, BlockHeader, BlockSelector, Receipt};
use tx_express::blockchain::{ChainClient, ChainConnector, ChainError, ChainResult};
use tx_express::config::RelayConfig;
use tx_express::notify::{NotifyError, NotifySink, Notifier, QoS};
use tx_express::relay::{NetworkInfo, Relay, TransferRecord};

pub const CHAIN_ID: u64 = 1007;
pub const GAS_PRICE: u128 = 100;
pub const LATEST_BLOCK: u64 = 100;
pub const MINED_BLOCK: u64 = 7;

// Anvil's first two accounts
pub const SENDER_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
pub const OTHER_KEY: &str = "59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";

#[derive(Default)]
struct ChainState {
    receipts: Mutex<HashMap<TxHash, Receipt>>,
    sent: Mutex<Vec<TxHash>>,
    receipt_queries: Mutex<Vec<TxHash>>,
    failing_dials: AtomicUsize,
    dials: AtomicUsize,
    mine_on_send: AtomicBool,
    reject_sends: AtomicBool,
    fail_receipts: AtomicBool,
    block_period: AtomicU64,
    send_gate: Mutex<Option<Arc<Semaphore>>>,
}

/// In-memory chain node.
#[derive(Clone)]
pub struct MockChain {
    state: Arc<ChainState>,
}

impl MockChain {
    pub fn new() -> Self {
        let state = ChainState::default();
        state.block_period.store(5, Ordering::SeqCst);
        Self {
            state: Arc::new(state),
        }
    }

    /// Every sent transaction gets a receipt immediately.
    pub fn mine_on_send(&self, enabled: bool) {
        self.state.mine_on_send.store(enabled, Ordering::SeqCst);
    }

    pub fn reject_sends(&self, enabled: bool) {
        self.state.reject_sends.store(enabled, Ordering::SeqCst);
    }

    /// Every receipt query errors until switched off.
    pub fn fail_receipts(&self, enabled: bool) {
        self.state.fail_receipts.store(enabled, Ordering::SeqCst);
    }

    /// Fail the next `n` dials.
    pub fn fail_next_dials(&self, n: usize) {
        self.state.failing_dials.store(n, Ordering::SeqCst);
    }

    pub fn set_block_period(&self, secs: u64) {
        self.state.block_period.store(secs, Ordering::SeqCst);
    }

    /// Block every send until [`MockChain::release_sends`] is called.
    pub fn hold_sends(&self) {
        *self.state.send_gate.lock() = Some(Arc::new(Semaphore::new(0)));
    }

    pub fn release_sends(&self, n: usize) {
        if let Some(gate) = self.state.send_gate.lock().as_ref() {
            gate.add_permits(n);
        }
    }

    pub fn mine(&self, hash: TxHash) {
        self.insert_receipt(hash, true);
    }

    /// Mine `hash` with a failed execution status.
    pub fn mine_reverted(&self, hash: TxHash) {
        self.insert_receipt(hash, false);
    }

    fn insert_receipt(&self, hash: TxHash, status: bool) {
        self.state.receipts.lock().insert(
            hash,
            Receipt {
                tx_hash: hash,
                block_number: Some(MINED_BLOCK),
                status,
            },
        );
    }

    pub fn sent(&self) -> Vec<TxHash> {
        self.state.sent.lock().clone()
    }

    pub fn receipt_queries(&self, hash: TxHash) -> usize {
        self.state
            .receipt_queries
            .lock()
            .iter()
            .filter(|h| **h == hash)
            .count()
    }

    pub fn dial_count(&self) -> usize {
        self.state.dials.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChainConnector for MockChain {
    async fn dial(&self) -> ChainResult<Arc<dyn ChainClient>> {
        self.state.dials.fetch_add(1, Ordering::SeqCst);
        let failing = self.state.failing_dials.load(Ordering::SeqCst);
        if failing > 0 {
            self.state.failing_dials.store(failing - 1, Ordering::SeqCst);
            return Err(ChainError::Dial("connection refused".to_string()));
        }
        Ok(Arc::new(self.clone()))
    }
}

#[async_trait]
impl ChainClient for MockChain {
    async fn send_transaction(&self, tx: &TxEnvelope) -> ChainResult<()> {
        let gate = self.state.send_gate.lock().clone();
        if let Some(gate) = gate {
            let permit = gate
                .acquire()
                .await
                .map_err(|e| ChainError::Rpc(e.to_string()))?;
            permit.forget();
        }

        if self.state.reject_sends.load(Ordering::SeqCst) {
            return Err(ChainError::Rejected("nonce too low".to_string()));
        }

        let hash = *tx.tx_hash();
        self.state.sent.lock().push(hash);
        if self.state.mine_on_send.load(Ordering::SeqCst) {
            self.mine(hash);
        }
        Ok(())
    }

    async fn transaction_receipt(&self, hash: TxHash) -> ChainResult<Option<Receipt>> {
        self.state.receipt_queries.lock().push(hash);
        if self.state.fail_receipts.load(Ordering::SeqCst) {
            return Err(ChainError::Timeout(10));
        }
        Ok(self.state.receipts.lock().get(&hash).cloned())
    }

    async fn header_by_number(&self, block: BlockSelector) -> ChainResult<BlockHeader> {
        let period = self.state.block_period.load(Ordering::SeqCst);
        let number = match block {
            BlockSelector::Latest => LATEST_BLOCK,
            BlockSelector::Number(n) => n,
        };
        Ok(BlockHeader {
            number,
            timestamp: 1_000_000 + number * period,
        })
    }

    async fn chain_id(&self) -> ChainResult<u64> {
        Ok(CHAIN_ID)
    }

    async fn gas_price(&self) -> ChainResult<u128> {
        Ok(GAS_PRICE)
    }

    async fn account_state(&self, _address: Address) -> ChainResult<AccountState> {
        Ok(AccountState {
            nonce_latest: 3,
            nonce_pending: 4,
            balance: U256::from(10u64).pow(U256::from(18u64)),
        })
    }
}

/// One captured publish.
#[derive(Debug, Clone)]
pub struct Published {
    pub topic: String,
    pub record: TransferRecord,
    pub qos: QoS,
}

/// Sink that keeps everything it is given.
#[derive(Default)]
pub struct RecordingSink {
    published: Mutex<Vec<Published>>,
}

impl RecordingSink {
    pub fn published(&self) -> Vec<Published> {
        self.published.lock().clone()
    }

    pub fn for_hash(&self, hash: TxHash) -> Vec<Published> {
        self.published()
            .into_iter()
            .filter(|p| p.record.hash == hash)
            .collect()
    }

    /// Wait until at least `count` notifications for `hash` arrived.
    pub async fn wait_for(&self, hash: TxHash, count: usize, timeout: Duration) -> Vec<Published> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let seen = self.for_hash(hash);
            if seen.len() >= count || tokio::time::Instant::now() >= deadline {
                return seen;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }
}

#[async_trait]
impl NotifySink for RecordingSink {
    async fn publish(&self, topic: &str, payload: &str, qos: QoS) -> Result<(), NotifyError> {
        let record: TransferRecord = serde_json::from_str(payload)?;
        self.published.lock().push(Published {
            topic: topic.to_string(),
            record,
            qos,
        });
        Ok(())
    }
}

pub fn signer(key: &str) -> PrivateKeySigner {
    key.parse().unwrap()
}

pub fn sign(tx: TxLegacy, key: &str) -> TxEnvelope {
    let signature = signer(key).sign_hash_sync(&tx.signature_hash()).unwrap();
    attach_signature(tx, signature)
}

/// A signed value transfer, returned as raw bytes and the envelope.
pub fn signed_transfer(to: Address, value: u64, nonce: u64) -> (Bytes, TxEnvelope) {
    let tx = build_transfer(CHAIN_ID, nonce, to, U256::from(value), 21_000, GAS_PRICE);
    let envelope = sign(tx, SENDER_KEY);
    (Bytes::from(envelope.encoded_2718()), envelope)
}

pub fn signed_contract_creation(nonce: u64) -> (Bytes, TxEnvelope) {
    let tx = TxLegacy {
        chain_id: Some(CHAIN_ID),
        nonce,
        gas_price: GAS_PRICE,
        gas_limit: 100_000,
        to: TxKind::Create,
        value: U256::ZERO,
        input: Bytes::from_static(&[0x60, 0x80, 0x60, 0x40]),
    };
    let envelope = sign(tx, SENDER_KEY);
    (Bytes::from(envelope.encoded_2718()), envelope)
}

pub fn recipient() -> Address {
    "0xabcdabcdabcdabcdabcdabcdabcdabcdabcdabcd".parse().unwrap()
}

pub fn network() -> NetworkInfo {
    NetworkInfo {
        chain_id: CHAIN_ID,
        gas_price: GAS_PRICE,
    }
}

/// Relay config suited to tests: one-second polling, fast receipt waits.
pub fn relay_config() -> RelayConfig {
    RelayConfig {
        queue_capacity: 64,
        retry_delay_ms: 10,
        block_period_secs: Some(1),
        wait_mined_poll_ms: 20,
        rpc_namespace: "newton".to_string(),
    }
}

pub fn spawn_relay(chain: &MockChain, sink: Arc<dyn NotifySink>, prefix: &str) -> Relay {
    let notifier = Notifier::new(sink, prefix, QoS::AtLeastOnce);
    Relay::spawn(Arc::new(chain.clone()), notifier, network(), &relay_config())
}

/// The `-1` / `0` / `1` marker at the end of a transfer topic.
pub fn marker(topic: &str) -> &str {
    topic.rsplit('/').next().unwrap_or_default()
}
