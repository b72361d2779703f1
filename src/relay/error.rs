//! Errors returned to submitters.

use thiserror::Error;

use crate::blockchain::signature::SignatureError;
use crate::blockchain::transaction::TxDecodeError;
use crate::blockchain::ChainError;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error(transparent)]
    Decode(#[from] TxDecodeError),

    #[error(transparent)]
    Signature(#[from] SignatureError),

    #[error(transparent)]
    Chain(#[from] ChainError),

    #[error("transaction signed for chain {actual}, relay serves chain {expected}")]
    WrongChain { expected: u64, actual: u64 },

    /// The router consumer is gone; only happens during shutdown.
    #[error("event queue closed")]
    QueueClosed,
}

impl RelayError {
    /// Label used for the `outcome` metric.
    pub fn kind(&self) -> &'static str {
        match self {
            RelayError::Decode(_) | RelayError::WrongChain { .. } => "invalid_tx",
            RelayError::Signature(_) => "invalid_signature",
            RelayError::Chain(_) => "chain_error",
            RelayError::QueueClosed => "queue_closed",
        }
    }
}

pub type RelayResult<T> = Result<T, RelayError>;
