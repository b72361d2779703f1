//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID, tracing span)
//!     → rpc.rs (JSON-RPC envelope, argument decoding)
//!     → SubmissionGate
//!
//! GET /notify/ws
//!     → websocket.rs (stream of notification frames)
//! ```

pub mod request;
pub mod rpc;
pub mod server;
pub mod websocket;

pub use request::X_REQUEST_ID;
pub use server::{AppState, HttpServer};
