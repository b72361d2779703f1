//! Transaction lifecycle orchestration.
//!
//! # Data Flow
//! ```text
//! HTTP handler
//!     → gate.rs (decode / recover, Received, wait level)
//!     → router.rs (bounded queue, single consumer)
//!         → broadcaster.rs (NoWait submissions → Broadcast, pending set)
//!         → notifier (Received / Broadcast / Confirmed)
//!     tracker.rs (per block period: receipts → Confirmed via router)
//! ```
//!
//! # Concurrency
//! - One consumer task drains the router; one task runs the tracker timer
//! - Requests run the gate on their own tasks
//! - The pending set is the only shared mutable state, behind one lock that
//!   is never held across an await

pub mod broadcaster;
pub mod error;
pub mod events;
pub mod gate;
pub mod record;
pub mod router;
pub mod tracker;

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::blockchain::ChainConnector;
use crate::config::RelayConfig;
use crate::notify::Notifier;

pub use broadcaster::Broadcaster;
pub use error::{RelayError, RelayResult};
pub use events::{LifecycleEvent, LifecycleKind, RelayEvent, WaitLevel};
pub use gate::{BaseInfo, NetworkInfo, SubmissionGate};
pub use record::TransferRecord;
pub use router::{EventLoop, EventRouter};
pub use tracker::{ConfirmationTracker, PendingSet, TickReport, TrackerConfig};

/// A running relay: the gate plus its background tasks.
pub struct Relay {
    pub gate: Arc<SubmissionGate>,
    pub pending: Arc<PendingSet>,
    pub router: EventRouter,
    tasks: Vec<JoinHandle<()>>,
}

impl Relay {
    /// Spawn the router consumer and the confirmation tracker.
    ///
    /// Must be called inside a Tokio runtime.
    pub fn spawn(
        connector: Arc<dyn ChainConnector>,
        notifier: Notifier,
        network: NetworkInfo,
        config: &RelayConfig,
    ) -> Self {
        let pending = Arc::new(PendingSet::new());
        let (router, rx) = EventRouter::bounded(config.queue_capacity);

        let broadcaster = Broadcaster::new(connector.clone(), notifier.clone(), pending.clone());
        let event_loop = EventLoop::new(rx, broadcaster, notifier, pending.clone());
        let tracker = ConfirmationTracker::new(
            connector.clone(),
            pending.clone(),
            router.clone(),
            TrackerConfig::from(config),
        );
        let gate = SubmissionGate::new(
            connector,
            router.clone(),
            network,
            Duration::from_millis(config.wait_mined_poll_ms),
        );

        let tasks = vec![tokio::spawn(event_loop.run()), tokio::spawn(tracker.run())];

        Self {
            gate: Arc::new(gate),
            pending,
            router,
            tasks,
        }
    }

    /// Stop the background tasks. In-flight notifications are dropped.
    pub fn abort(&self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}
