//! Messages carried by the event router.

use alloy::consensus::TxEnvelope;

use crate::relay::record::TransferRecord;

/// How long a submission blocks before returning the hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WaitLevel {
    #[default]
    NoWait,
    WaitForBroadcast,
    WaitForConfirmation,
}

impl WaitLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            WaitLevel::NoWait => "no_wait",
            WaitLevel::WaitForBroadcast => "broadcast",
            WaitLevel::WaitForConfirmation => "confirmation",
        }
    }
}

/// Anything outside `0..=2` silently becomes `NoWait`.
impl From<u64> for WaitLevel {
    fn from(level: u64) -> Self {
        match level {
            1 => WaitLevel::WaitForBroadcast,
            2 => WaitLevel::WaitForConfirmation,
            _ => WaitLevel::NoWait,
        }
    }
}

impl From<WaitLevel> for u64 {
    fn from(level: WaitLevel) -> Self {
        match level {
            WaitLevel::NoWait => 0,
            WaitLevel::WaitForBroadcast => 1,
            WaitLevel::WaitForConfirmation => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleKind {
    Received,
    Broadcast,
    Confirmed,
}

impl LifecycleKind {
    /// Confirmation marker embedded in the notification topic.
    pub fn marker(&self) -> i8 {
        match self {
            LifecycleKind::Received => -1,
            LifecycleKind::Broadcast => 0,
            LifecycleKind::Confirmed => 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleKind::Received => "received",
            LifecycleKind::Broadcast => "broadcast",
            LifecycleKind::Confirmed => "confirmed",
        }
    }
}

/// A state change to publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleEvent {
    pub kind: LifecycleKind,
    pub record: TransferRecord,
}

impl LifecycleEvent {
    pub fn received(record: TransferRecord) -> Self {
        Self {
            kind: LifecycleKind::Received,
            record,
        }
    }

    pub fn broadcast(record: TransferRecord) -> Self {
        Self {
            kind: LifecycleKind::Broadcast,
            record,
        }
    }

    pub fn confirmed(record: TransferRecord) -> Self {
        Self {
            kind: LifecycleKind::Confirmed,
            record,
        }
    }
}

/// One message on the router queue.
#[derive(Debug, Clone)]
pub enum RelayEvent {
    /// Submit `envelope` in the background (`NoWait` submissions).
    Broadcast {
        envelope: Box<TxEnvelope>,
        record: TransferRecord,
    },
    /// Track a transaction that was already broadcast synchronously.
    Watch(TransferRecord),
    /// Publish a lifecycle notification.
    Notify(LifecycleEvent),
}
