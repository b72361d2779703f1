//! Background submission for `NoWait` transactions.

use alloy::consensus::TxEnvelope;
use std::sync::Arc;

use crate::blockchain::ChainConnector;
use crate::notify::Notifier;
use crate::relay::events::LifecycleEvent;
use crate::relay::record::TransferRecord;
use crate::relay::tracker::PendingSet;

/// Submits queued transactions on the router's consumer task.
///
/// The submitter has already been answered, so failures are logged and the
/// transaction is dropped. The `Broadcast` notification is published
/// directly rather than re-enqueued: the consumer must never wait on its own
/// queue.
#[derive(Clone)]
pub struct Broadcaster {
    connector: Arc<dyn ChainConnector>,
    notifier: Notifier,
    pending: Arc<PendingSet>,
}

impl Broadcaster {
    pub fn new(
        connector: Arc<dyn ChainConnector>,
        notifier: Notifier,
        pending: Arc<PendingSet>,
    ) -> Self {
        Self {
            connector,
            notifier,
            pending,
        }
    }

    pub async fn broadcast(&self, envelope: &TxEnvelope, record: TransferRecord) {
        let client = match self.connector.dial().await {
            Ok(client) => client,
            Err(e) => {
                tracing::error!(tx_hash = %record.hash, error = %e, "Broadcast dial failed");
                return;
            }
        };

        if let Err(e) = client.send_transaction(envelope).await {
            tracing::error!(tx_hash = %record.hash, error = %e, "Broadcast submission failed");
            return;
        }

        tracing::debug!(tx_hash = %record.hash, "Transaction broadcast");
        self.notifier
            .publish(&LifecycleEvent::broadcast(record.clone()))
            .await;
        self.pending.push(record);
    }
}
