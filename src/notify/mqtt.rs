//! MQTT broker notification sink.
//!
//! # Design Decisions
//! - The rumqttc event loop runs on its own task and reconnects on error
//! - Publishing only enqueues into the client's request channel, so a slow
//!   or unreachable broker never stalls the router consumer
//! - A full request channel is a publish error, not back-pressure

use async_trait::async_trait;
use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Packet};
use std::time::Duration;
use tokio::task::JoinHandle;
use url::Url;

use crate::notify::sink::{NotifyError, NotifySink, QoS};

pub const DEFAULT_BROKER_PORT: u16 = 1883;

/// Requests buffered while the broker is unreachable.
const REQUEST_CAPACITY: usize = 256;
const KEEP_ALIVE: Duration = Duration::from_secs(30);
const RECONNECT_DELAY: Duration = Duration::from_secs(1);

impl From<QoS> for rumqttc::QoS {
    fn from(qos: QoS) -> Self {
        match qos {
            QoS::AtMostOnce => rumqttc::QoS::AtMostOnce,
            QoS::AtLeastOnce => rumqttc::QoS::AtLeastOnce,
            QoS::ExactlyOnce => rumqttc::QoS::ExactlyOnce,
        }
    }
}

/// Build connection options from `tcp://host[:port]` (or `mqtt://`).
///
/// Credentials are sent only when a non-empty username is given.
pub fn broker_options(
    broker_url: &str,
    client_id: &str,
    username: Option<&str>,
    password: Option<&str>,
) -> Result<MqttOptions, NotifyError> {
    let url = Url::parse(broker_url)?;
    if !matches!(url.scheme(), "tcp" | "mqtt") {
        return Err(NotifyError::Broker(format!(
            "unsupported scheme {} (expected tcp or mqtt)",
            url.scheme()
        )));
    }
    let host = url
        .host_str()
        .ok_or_else(|| NotifyError::Broker(format!("missing host in {broker_url}")))?;
    let port = url.port().unwrap_or(DEFAULT_BROKER_PORT);

    let mut options = MqttOptions::new(client_id, host, port);
    options.set_keep_alive(KEEP_ALIVE);
    if let Some(user) = username.filter(|u| !u.is_empty()) {
        options.set_credentials(user, password.unwrap_or_default());
    }
    Ok(options)
}

/// Publishes each notification to an MQTT broker, retain off.
#[derive(Debug)]
pub struct MqttSink {
    client: AsyncClient,
    driver: JoinHandle<()>,
}

impl MqttSink {
    /// Start the connection task. Must be called inside a tokio runtime.
    pub fn connect(options: MqttOptions) -> Self {
        let (host, port) = options.broker_address();
        tracing::info!(
            host = %host,
            port,
            client_id = %options.client_id(),
            "Connecting to MQTT broker"
        );

        let (client, eventloop) = AsyncClient::new(options, REQUEST_CAPACITY);
        let driver = tokio::spawn(drive(eventloop));
        Self { client, driver }
    }
}

async fn drive(mut eventloop: EventLoop) {
    loop {
        match eventloop.poll().await {
            Ok(Event::Incoming(Packet::ConnAck(ack))) => {
                tracing::info!(code = ?ack.code, "MQTT broker connected");
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(error = %e, "MQTT connection error, reconnecting");
                tokio::time::sleep(RECONNECT_DELAY).await;
            }
        }
    }
}

impl Drop for MqttSink {
    fn drop(&mut self) {
        self.driver.abort();
    }
}

#[async_trait]
impl NotifySink for MqttSink {
    async fn publish(&self, topic: &str, payload: &str, qos: QoS) -> Result<(), NotifyError> {
        self.client.try_publish(topic, qos.into(), false, payload.as_bytes().to_vec())?;
        Ok(())
    }
}
