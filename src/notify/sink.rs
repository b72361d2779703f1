//! The publish capability notifications are delivered through.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Delivery guarantee requested from the sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum QoS {
    #[default]
    AtMostOnce,
    AtLeastOnce,
    ExactlyOnce,
}

impl From<QoS> for u8 {
    fn from(qos: QoS) -> Self {
        match qos {
            QoS::AtMostOnce => 0,
            QoS::AtLeastOnce => 1,
            QoS::ExactlyOnce => 2,
        }
    }
}

impl TryFrom<u8> for QoS {
    type Error = NotifyError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(QoS::AtMostOnce),
            1 => Ok(QoS::AtLeastOnce),
            2 => Ok(QoS::ExactlyOnce),
            other => Err(NotifyError::InvalidQoS(other)),
        }
    }
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("qos only 0, 1, 2 (got {0})")]
    InvalidQoS(u8),

    #[error("payload encoding failed: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("webhook request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("webhook returned status {0}")]
    Status(u16),

    #[error("invalid sink url: {0}")]
    Url(#[from] url::ParseError),

    #[error("mqtt broker: {0}")]
    Broker(String),

    #[error("mqtt publish failed: {0}")]
    Publish(#[from] rumqttc::ClientError),
}

/// Fire-and-forget publishing. Delivery is at most once from the relay's
/// point of view; errors are reported but never retried.
#[async_trait]
pub trait NotifySink: Send + Sync {
    async fn publish(&self, topic: &str, payload: &str, qos: QoS) -> Result<(), NotifyError>;
}
