//! Transaction relay with lifecycle notifications.

pub mod blockchain;
pub mod client;
pub mod config;
pub mod http;
pub mod notify;
pub mod observability;
pub mod profile;
pub mod relay;

pub use config::schema::ExpressConfig;
pub use http::HttpServer;
pub use relay::{Relay, SubmissionGate};
