//! WebSocket notification stream.
//!
//! # Data Flow
//! ```text
//! Notifier → WsHub (broadcast channel) → one task per socket → client
//! ```
//!
//! # Design Decisions
//! - Server-to-client only; client text frames are ignored
//! - A lagging subscriber skips missed frames (at-most-once delivery)
//! - Close frames from the client end the stream

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast::error::RecvError;

use crate::http::server::AppState;
use crate::notify::WsHub;

pub async fn notify_ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    match state.hub.clone() {
        Some(hub) => ws.on_upgrade(move |socket| stream_notifications(socket, hub)),
        None => (StatusCode::NOT_FOUND, "websocket notifications are disabled").into_response(),
    }
}

async fn stream_notifications(socket: WebSocket, hub: WsHub) {
    let mut frames = hub.subscribe();
    let (mut sender, mut receiver) = socket.split();
    tracing::debug!(subscribers = hub.subscriber_count(), "Notification subscriber connected");

    loop {
        tokio::select! {
            frame = frames.recv() => match frame {
                Ok(text) => {
                    if sender.send(Message::Text(text.as_ref().into())).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Notification subscriber lagging, frames dropped");
                }
                Err(RecvError::Closed) => break,
            },
            incoming = receiver.next() => match incoming {
                Some(Ok(Message::Close(_))) | None | Some(Err(_)) => break,
                Some(Ok(_)) => {}
            },
        }
    }

    tracing::debug!("Notification subscriber disconnected");
}
