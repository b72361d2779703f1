//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (request ID, tracing, body limit, timeout)
//! - Dispatch JSON-RPC calls to the submission gate
//! - Serve the WebSocket notification stream
//! - Observability (metrics, correlation IDs)

use alloy::primitives::Address;
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{limit::RequestBodyLimitLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::ListenerConfig;
use crate::http::request::{make_request_span, propagate_request_id_layer, set_request_id_layer};
use crate::http::rpc::{
    single_param, BaseInfoArgs, RpcError, RpcMethod, RpcRequest, RpcResponse, SendRawTxArgs,
    SendTxArgs, INVALID_REQUEST, METHOD_NOT_FOUND, PARSE_ERROR, SERVER_ERROR,
};
use crate::http::websocket::notify_ws_handler;
use crate::notify::WsHub;
use crate::observability::metrics;
use crate::relay::{PendingSet, RelayError, SubmissionGate, WaitLevel};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub gate: Arc<SubmissionGate>,
    pub pending: Arc<PendingSet>,
    /// Present when notifications go to the in-process hub.
    pub hub: Option<WsHub>,
    pub namespace: Arc<str>,
}

/// HTTP server for the relay API.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    pub fn new(config: &ListenerConfig, state: AppState) -> Self {
        Self {
            router: Self::build_router(config, state),
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ListenerConfig, state: AppState) -> Router {
        Router::new()
            .route("/", post(rpc_handler))
            .route("/health", get(health_handler))
            .route("/notify/ws", get(notify_ws_handler))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(set_request_id_layer())
                    .layer(propagate_request_id_layer())
                    .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
                    .layer(RequestBodyLimitLayer::new(config.max_body_bytes))
                    .layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout_secs))),
            )
    }

    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until Ctrl+C.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        self.run_until(listener, shutdown_signal()).await
    }

    /// Run the server until `shutdown` resolves.
    pub async fn run_until<F>(
        self,
        listener: TcpListener,
        shutdown: F,
    ) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "networkID": state.gate.network().chain_id,
        "pending": state.pending.len(),
    }))
}

async fn rpc_handler(State(state): State<AppState>, body: Bytes) -> Response {
    let start = Instant::now();

    let request: RpcRequest = match serde_json::from_slice::<Value>(&body) {
        Ok(Value::Array(_)) => {
            return reply(RpcResponse::failure(
                Value::Null,
                RpcError::new(INVALID_REQUEST, "batch requests are not supported"),
            ))
        }
        Ok(value) => match serde_json::from_value(value) {
            Ok(request) => request,
            Err(e) => {
                return reply(RpcResponse::failure(
                    Value::Null,
                    RpcError::new(INVALID_REQUEST, e.to_string()),
                ))
            }
        },
        Err(e) => {
            return reply(RpcResponse::failure(
                Value::Null,
                RpcError::new(PARSE_ERROR, e.to_string()),
            ))
        }
    };

    let method = RpcMethod::resolve(&state.namespace, &request.method);
    let response = match dispatch(&state, method, &request).await {
        Ok(result) => {
            metrics::record_rpc_request(method.as_str(), "ok", start);
            RpcResponse::success(request.id, result)
        }
        Err(error) => {
            metrics::record_rpc_request(method.as_str(), "error", start);
            tracing::debug!(
                method = %request.method,
                code = error.code,
                error = %error.message,
                "RPC call failed"
            );
            RpcResponse::failure(request.id, error)
        }
    };
    reply(response)
}

fn reply(response: RpcResponse) -> Response {
    (StatusCode::OK, Json(response)).into_response()
}

async fn dispatch(
    state: &AppState,
    method: RpcMethod,
    request: &RpcRequest,
) -> Result<Value, RpcError> {
    match method {
        RpcMethod::SendRawTransaction => {
            let args: SendRawTxArgs = single_param(&request.params)?;
            let hash = state
                .gate
                .send_raw_transaction(&args.tx, WaitLevel::from(args.wait))
                .await
                .map_err(relay_error)?;
            Ok(json!(hash))
        }
        RpcMethod::SendTransaction => {
            let args: SendTxArgs = single_param(&request.params)?;
            let hash = state
                .gate
                .send_transaction(args.from, &args.tx, &args.signature, WaitLevel::from(args.wait))
                .await
                .map_err(relay_error)?;
            Ok(json!(hash))
        }
        RpcMethod::GetBaseInfo => {
            let args: BaseInfoArgs = single_param(&request.params)?;
            base_info(state, args.address).await
        }
        RpcMethod::Unknown => Err(RpcError::new(
            METHOD_NOT_FOUND,
            format!("the method {} does not exist/is not available", request.method),
        )),
    }
}

async fn base_info(state: &AppState, address: Address) -> Result<Value, RpcError> {
    let info = state.gate.get_base_info(address).await.map_err(relay_error)?;
    serde_json::to_value(info).map_err(|e| RpcError::new(SERVER_ERROR, e.to_string()))
}

fn relay_error(e: RelayError) -> RpcError {
    RpcError::new(SERVER_ERROR, e.to_string())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
