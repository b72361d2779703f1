//! The single ordered event queue and its consumer.
//!
//! Producers (submission gate, tracker) push onto a bounded channel and wait
//! when it is full, so a stalled consumer slows request handling instead of
//! growing memory. One consumer task handles every message in order.

use std::sync::Arc;
use tokio::sync::mpsc;

use crate::notify::Notifier;
use crate::relay::broadcaster::Broadcaster;
use crate::relay::error::{RelayError, RelayResult};
use crate::relay::events::{LifecycleEvent, RelayEvent};
use crate::relay::tracker::PendingSet;

/// Producer handle. Cheap to clone.
#[derive(Debug, Clone)]
pub struct EventRouter {
    tx: mpsc::Sender<RelayEvent>,
}

impl EventRouter {
    /// Create a router with room for `capacity` queued messages.
    pub fn bounded(capacity: usize) -> (Self, mpsc::Receiver<RelayEvent>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }

    /// Enqueue `event`, waiting for space if the queue is full.
    pub async fn send(&self, event: RelayEvent) -> RelayResult<()> {
        self.tx.send(event).await.map_err(|_| RelayError::QueueClosed)
    }

    pub async fn notify(&self, event: LifecycleEvent) -> RelayResult<()> {
        self.send(RelayEvent::Notify(event)).await
    }

    /// Free slots left in the queue.
    pub fn capacity(&self) -> usize {
        self.tx.capacity()
    }
}

/// Consumer side of the router.
pub struct EventLoop {
    rx: mpsc::Receiver<RelayEvent>,
    broadcaster: Broadcaster,
    notifier: Notifier,
    pending: Arc<PendingSet>,
}

impl EventLoop {
    pub fn new(
        rx: mpsc::Receiver<RelayEvent>,
        broadcaster: Broadcaster,
        notifier: Notifier,
        pending: Arc<PendingSet>,
    ) -> Self {
        Self {
            rx,
            broadcaster,
            notifier,
            pending,
        }
    }

    /// Handle messages until every producer handle is dropped.
    pub async fn run(mut self) {
        tracing::info!("Event router started");
        while let Some(event) = self.rx.recv().await {
            self.handle(event).await;
        }
        tracing::info!("Event router closed");
    }

    async fn handle(&self, event: RelayEvent) {
        match event {
            RelayEvent::Broadcast { envelope, record } => {
                self.broadcaster.broadcast(&envelope, record).await;
            }
            RelayEvent::Watch(record) => {
                tracing::debug!(tx_hash = %record.hash, "Watching for confirmation");
                self.pending.push(record);
            }
            RelayEvent::Notify(event) => self.notifier.publish(&event).await,
        }
    }
}
