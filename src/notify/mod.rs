//! Lifecycle notification subsystem.
//!
//! # Data Flow
//! ```text
//! LifecycleEvent (from the router consumer)
//!     → notifier.rs (topic + JSON payload, logging, metrics)
//!     → NotifySink (sink.rs)
//!         → mqtt.rs (broker publish, the production sink)
//!         → websocket.rs (in-process fan-out at /notify/ws)
//!         → webhook.rs (HTTP POST per notification)
//! ```

pub mod mqtt;
pub mod notifier;
pub mod sink;
pub mod topic;
pub mod webhook;
pub mod websocket;

pub use mqtt::{broker_options, MqttSink};
pub use notifier::Notifier;
pub use sink::{NotifyError, NotifySink, QoS};
pub use webhook::WebhookSink;
pub use websocket::{NotificationFrame, WsHub};
