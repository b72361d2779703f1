//! In-process notification fan-out for WebSocket subscribers.
//!
//! Each published notification is framed as `{topic, qos, payload}` and sent
//! to every connected subscriber. A subscriber that falls more than
//! `capacity` frames behind skips the missed frames.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::notify::sink::{NotifyError, NotifySink, QoS};

/// Wire frame pushed to WebSocket subscribers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationFrame {
    pub topic: String,
    pub qos: QoS,
    pub payload: serde_json::Value,
}

#[derive(Clone)]
pub struct WsHub {
    tx: broadcast::Sender<Arc<str>>,
}

impl WsHub {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Arc<str>> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

#[async_trait]
impl NotifySink for WsHub {
    async fn publish(&self, topic: &str, payload: &str, qos: QoS) -> Result<(), NotifyError> {
        let frame = NotificationFrame {
            topic: topic.to_string(),
            qos,
            payload: serde_json::from_str(payload)?,
        };
        let text: Arc<str> = serde_json::to_string(&frame)?.into();

        // No subscribers is not a failure; the frame is simply dropped.
        if self.tx.send(text).is_err() {
            tracing::trace!(topic, "No websocket subscribers");
        }
        Ok(())
    }
}

impl std::fmt::Debug for WsHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WsHub")
            .field("subscribers", &self.tx.receiver_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscribers_receive_frames() {
        let hub = WsHub::new(8);
        let mut rx = hub.subscribe();

        hub.publish("p/ContractCreate", r#"{"hash":"0x01"}"#, QoS::AtLeastOnce)
            .await
            .unwrap();

        let text = rx.recv().await.unwrap();
        let frame: NotificationFrame = serde_json::from_str(&text).unwrap();
        assert_eq!(frame.topic, "p/ContractCreate");
        assert_eq!(frame.qos, QoS::AtLeastOnce);
        assert_eq!(frame.payload["hash"], "0x01");
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_succeeds() {
        let hub = WsHub::new(8);
        assert_eq!(hub.subscriber_count(), 0);
        assert!(hub.publish("t", "{}", QoS::AtMostOnce).await.is_ok());
    }

    #[tokio::test]
    async fn test_invalid_payload_is_an_error() {
        let hub = WsHub::new(8);
        let result = hub.publish("t", "not json", QoS::AtMostOnce).await;
        assert!(matches!(result, Err(NotifyError::Encode(_))));
    }
}
