//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the relay.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the relay service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ExpressConfig {
    /// Listener configuration (bind address, request limits).
    pub listener: ListenerConfig,

    /// Blockchain node settings.
    pub blockchain: BlockchainConfig,

    /// Lifecycle orchestration settings.
    pub relay: RelayConfig,

    /// Notification publishing settings.
    pub notify: NotifyConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "127.0.0.1:8888").
    pub bind_address: String,

    /// Maximum JSON-RPC request body in bytes.
    pub max_body_bytes: usize,

    /// Upper bound on a single request, including wait-for-confirmation calls.
    pub request_timeout_secs: u64,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8888".to_string(),
            max_body_bytes: 128 * 1024,
            request_timeout_secs: 600,
        }
    }
}

/// Blockchain node configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BlockchainConfig {
    /// JSON-RPC endpoint URL (http, ws or ipc).
    pub rpc_url: String,

    /// Failover JSON-RPC endpoint URLs, tried in order when dialing.
    #[serde(default)]
    pub failover_urls: Vec<String>,

    /// Expected chain ID; 0 accepts whatever the node reports.
    pub chain_id: u64,

    /// RPC request timeout in seconds.
    pub rpc_timeout_secs: u64,
}

impl Default for BlockchainConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://localhost:8545".to_string(),
            failover_urls: Vec::new(),
            chain_id: 0,
            rpc_timeout_secs: 10,
        }
    }
}

/// Transaction lifecycle configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Capacity of the lifecycle event queue. Producers wait when it is full.
    pub queue_capacity: usize,

    /// Delay between block-period measurement attempts, in milliseconds.
    pub retry_delay_ms: u64,

    /// Fixed confirmation polling period; measured from the chain when unset.
    pub block_period_secs: Option<u64>,

    /// Receipt polling interval for wait-for-confirmation submissions.
    pub wait_mined_poll_ms: u64,

    /// JSON-RPC method namespace (`<namespace>_sendRawTransaction`).
    pub rpc_namespace: String,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 1024,
            retry_delay_ms: 3000,
            block_period_secs: None,
            wait_mined_poll_ms: 1000,
            rpc_namespace: "newton".to_string(),
        }
    }
}

/// Where notifications are published.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    /// Publish to an MQTT broker at `mqtt_url`.
    Mqtt,
    /// In-process fan-out served at `/notify/ws`.
    Websocket,
    /// HTTP POST to `<webhook_url>/<topic>`.
    Webhook,
}

/// Notification configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NotifyConfig {
    pub sink: SinkKind,

    /// Broker address for the MQTT sink (`tcp://host:1883`).
    pub mqtt_url: Option<String>,

    /// Broker username; credentials are sent only when set.
    pub username: Option<String>,

    pub password: Option<String>,

    /// Base URL for the webhook sink.
    pub webhook_url: Option<String>,

    /// Per-request timeout of the webhook sink, in seconds.
    pub webhook_timeout_secs: u64,

    /// Delivery quality of service (0, 1 or 2), forwarded to the sink.
    pub qos: u8,

    /// Topic prefix: `<prefix>/<recipient>/<marker>`.
    pub prefix_topic: String,

    /// Identifies this publisher to the sink.
    pub client_id: String,

    /// Per-subscriber buffer of the websocket hub.
    pub ws_buffer: usize,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            sink: SinkKind::Websocket,
            mqtt_url: None,
            username: None,
            password: None,
            webhook_url: None,
            webhook_timeout_secs: 10,
            qos: 0,
            prefix_topic: "newchain/tx".to_string(),
            client_id: "NewChainAPIExpress".to_string(),
            ws_buffer: 256,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
