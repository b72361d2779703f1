//! Publishes lifecycle events to the configured sink.

use std::sync::Arc;
use std::time::Duration;

use crate::config::{NotifyConfig, SinkKind};
use crate::notify::mqtt::{broker_options, MqttSink};
use crate::notify::sink::{NotifyError, NotifySink, QoS};
use crate::notify::topic::topic_for;
use crate::notify::webhook::WebhookSink;
use crate::notify::websocket::WsHub;
use crate::observability::metrics;
use crate::relay::events::LifecycleEvent;

/// Turns lifecycle events into topic + JSON payload and hands them to a sink.
///
/// Failures are logged and counted; they never reach the submitter.
#[derive(Clone)]
pub struct Notifier {
    sink: Arc<dyn NotifySink>,
    prefix_topic: String,
    qos: QoS,
}

impl Notifier {
    pub fn new(sink: Arc<dyn NotifySink>, prefix_topic: impl Into<String>, qos: QoS) -> Self {
        Self {
            sink,
            prefix_topic: prefix_topic.into(),
            qos,
        }
    }

    /// Build the configured sink. The websocket hub is also returned so the
    /// HTTP server can serve `/notify/ws`.
    ///
    /// The MQTT sink starts its connection task, so this must run inside a
    /// tokio runtime.
    pub fn from_config(config: &NotifyConfig) -> Result<(Self, Option<WsHub>), NotifyError> {
        let qos = QoS::try_from(config.qos)?;
        let (sink, hub): (Arc<dyn NotifySink>, Option<WsHub>) = match config.sink {
            SinkKind::Mqtt => {
                let options = broker_options(
                    config.mqtt_url.as_deref().unwrap_or_default(),
                    &config.client_id,
                    config.username.as_deref(),
                    config.password.as_deref(),
                )?;
                (Arc::new(MqttSink::connect(options)), None)
            }
            SinkKind::Websocket => {
                let hub = WsHub::new(config.ws_buffer);
                (Arc::new(hub.clone()), Some(hub))
            }
            SinkKind::Webhook => {
                let sink = WebhookSink::new(
                    config.webhook_url.as_deref().unwrap_or_default(),
                    &config.client_id,
                    Duration::from_secs(config.webhook_timeout_secs),
                )?;
                (Arc::new(sink), None)
            }
        };
        Ok((Self::new(sink, config.prefix_topic.clone(), qos), hub))
    }

    pub fn topic(&self, event: &LifecycleEvent) -> String {
        topic_for(&self.prefix_topic, event.record.to, event.kind.marker())
    }

    pub async fn publish(&self, event: &LifecycleEvent) {
        let topic = self.topic(event);
        let payload = match serde_json::to_string(&event.record) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::error!(
                    tx_hash = %event.record.hash,
                    error = %e,
                    "Failed to encode notification"
                );
                metrics::record_publish_failure();
                return;
            }
        };

        tracing::info!(publish = %topic, kind = event.kind.as_str(), "{}", payload);
        metrics::record_lifecycle_event(event.kind.as_str());

        if let Err(e) = self.sink.publish(&topic, &payload, self.qos).await {
            tracing::warn!(publish = %topic, error = %e, "Notification publish failed");
            metrics::record_publish_failure();
        }
    }
}

impl std::fmt::Debug for Notifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifier")
            .field("prefix_topic", &self.prefix_topic)
            .field("qos", &self.qos)
            .finish()
    }
}
