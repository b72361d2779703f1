//! Confirmation tracking.
//!
//! # Responsibilities
//! - Own the set of broadcast transactions still waiting for a receipt
//! - Measure the chain's block period once at startup
//! - Poll receipts once per block period and publish `Confirmed`
//!
//! A record leaves the pending set only when its receipt is found. Query
//! errors and dial failures put the record back for the next tick.

use alloy::primitives::TxHash;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval_at, sleep, Instant, MissedTickBehavior};

use crate::blockchain::types::BlockSelector;
use crate::blockchain::{ChainConnector, ChainError, ChainResult};
use crate::config::RelayConfig;
use crate::observability::metrics;
use crate::relay::events::LifecycleEvent;
use crate::relay::record::TransferRecord;
use crate::relay::router::EventRouter;

/// Transactions awaiting a receipt. Each hash appears at most once.
#[derive(Debug, Default)]
pub struct PendingSet {
    records: Mutex<Vec<TransferRecord>>,
}

impl PendingSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `record` unless its hash is already tracked. Returns whether it was added.
    pub fn push(&self, record: TransferRecord) -> bool {
        let mut records = self.records.lock();
        if records.iter().any(|r| r.hash == record.hash) {
            return false;
        }
        records.push(record);
        metrics::set_pending_confirmations(records.len());
        true
    }

    /// Take every record, leaving the set empty.
    pub fn drain(&self) -> Vec<TransferRecord> {
        let mut records = self.records.lock();
        let drained = std::mem::take(&mut *records);
        metrics::set_pending_confirmations(0);
        drained
    }

    pub fn requeue(&self, batch: Vec<TransferRecord>) {
        for record in batch {
            self.push(record);
        }
    }

    pub fn contains(&self, hash: &TxHash) -> bool {
        self.records.lock().iter().any(|r| &r.hash == hash)
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    pub fn snapshot(&self) -> Vec<TransferRecord> {
        self.records.lock().clone()
    }
}

/// Timing knobs for the tracker.
#[derive(Debug, Clone, Copy)]
pub struct TrackerConfig {
    /// Sleep between failed block-period measurements.
    pub retry_delay: Duration,
    /// Skip measurement and poll at this period.
    pub block_period: Option<Duration>,
}

impl From<&RelayConfig> for TrackerConfig {
    fn from(config: &RelayConfig) -> Self {
        Self {
            retry_delay: Duration::from_millis(config.retry_delay_ms),
            block_period: config.block_period_secs.map(Duration::from_secs),
        }
    }
}

/// What one polling pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub confirmed: usize,
    pub requeued: usize,
    /// Confirmed with a failed execution status. Included in `confirmed`.
    pub reverted: usize,
}

pub struct ConfirmationTracker {
    connector: Arc<dyn ChainConnector>,
    pending: Arc<PendingSet>,
    router: EventRouter,
    config: TrackerConfig,
}

impl ConfirmationTracker {
    pub fn new(
        connector: Arc<dyn ChainConnector>,
        pending: Arc<PendingSet>,
        router: EventRouter,
        config: TrackerConfig,
    ) -> Self {
        Self {
            connector,
            pending,
            router,
            config,
        }
    }

    /// Measure and poll forever.
    pub async fn run(self) {
        let period = match self.config.block_period {
            Some(period) => period,
            None => self.measure_block_period().await,
        };
        tracing::info!(block_period_secs = period.as_secs(), "Confirmation tracker started");

        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let report = self.tick().await;
            if report.confirmed > 0 || report.requeued > 0 {
                tracing::debug!(
                    confirmed = report.confirmed,
                    requeued = report.requeued,
                    "Confirmation tick"
                );
            }
        }
    }

    /// Time between the latest block and its parent, retried until positive.
    pub async fn measure_block_period(&self) -> Duration {
        loop {
            match self.try_measure().await {
                Ok(secs) if secs > 0 => return Duration::from_secs(secs),
                Ok(secs) => {
                    tracing::error!(block_period = secs, "Non-positive block period, retrying");
                }
                Err(e) => tracing::error!(error = %e, "Block period measurement failed"),
            }
            sleep(self.config.retry_delay).await;
        }
    }

    async fn try_measure(&self) -> ChainResult<u64> {
        let client = self.connector.dial().await?;
        let latest = client.header_by_number(BlockSelector::Latest).await?;
        let parent_number = latest
            .number
            .checked_sub(1)
            .ok_or_else(|| ChainError::BlockNotFound("parent of genesis".to_string()))?;
        let parent = client
            .header_by_number(BlockSelector::Number(parent_number))
            .await?;
        Ok(latest.timestamp.saturating_sub(parent.timestamp))
    }

    /// One polling pass over everything pending.
    pub async fn tick(&self) -> TickReport {
        let batch = self.pending.drain();
        if batch.is_empty() {
            return TickReport::default();
        }

        let client = match self.connector.dial().await {
            Ok(client) => client,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    pending = batch.len(),
                    "Confirmation dial failed, requeueing"
                );
                let requeued = batch.len();
                self.pending.requeue(batch);
                return TickReport {
                    requeued,
                    ..TickReport::default()
                };
            }
        };

        let mut report = TickReport::default();
        for record in batch {
            match client.transaction_receipt(record.hash).await {
                Ok(Some(receipt)) => {
                    report.confirmed += 1;
                    if !receipt.status {
                        report.reverted += 1;
                        metrics::record_reverted_confirmation();
                        tracing::warn!(
                            tx_hash = %record.hash,
                            block = ?receipt.block_number,
                            "Transaction mined but reverted"
                        );
                    }
                    let event = LifecycleEvent::confirmed(record.mined_in(receipt.block_number));
                    if let Err(e) = self.router.notify(event).await {
                        tracing::warn!(tx_hash = %record.hash, error = %e, "Dropped confirmation");
                    }
                }
                Ok(None) => {
                    report.requeued += 1;
                    self.pending.push(record);
                }
                Err(e) => {
                    tracing::warn!(tx_hash = %record.hash, error = %e, "Receipt query failed");
                    report.requeued += 1;
                    self.pending.push(record);
                }
            }
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{Address, Bytes, U256};

    fn record(byte: u8) -> TransferRecord {
        TransferRecord {
            from: Address::repeat_byte(0x01),
            to: Some(Address::repeat_byte(0x02)),
            value: U256::from(1),
            hash: TxHash::repeat_byte(byte),
            data: Bytes::new(),
            block_number: None,
        }
    }

    #[test]
    fn test_push_deduplicates_by_hash() {
        let set = PendingSet::new();
        assert!(set.push(record(1)));
        assert!(!set.push(record(1)));
        assert!(set.push(record(2)));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_drain_empties_set() {
        let set = PendingSet::new();
        set.push(record(1));
        set.push(record(2));

        let drained = set.drain();
        assert_eq!(drained.len(), 2);
        assert!(set.is_empty());

        set.requeue(drained);
        assert!(set.contains(&TxHash::repeat_byte(1)));
        assert_eq!(set.snapshot().len(), 2);
    }

    #[test]
    fn test_tracker_config_from_relay_config() {
        let mut relay = RelayConfig::default();
        let config = TrackerConfig::from(&relay);
        assert_eq!(config.retry_delay, Duration::from_secs(3));
        assert_eq!(config.block_period, None);

        relay.block_period_secs = Some(5);
        assert_eq!(
            TrackerConfig::from(&relay).block_period,
            Some(Duration::from_secs(5))
        );
    }
}
