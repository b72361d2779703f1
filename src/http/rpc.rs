//! JSON-RPC 2.0 envelope and parameter types.

use alloy::primitives::{Address, Bytes};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const PARSE_ERROR: i64 = -32700;
pub const INVALID_REQUEST: i64 = -32600;
pub const METHOD_NOT_FOUND: i64 = -32601;
pub const INVALID_PARAMS: i64 = -32602;
/// Relay and chain errors.
pub const SERVER_ERROR: i64 = -32000;

/// The methods served under the configured namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RpcMethod {
    SendRawTransaction,
    SendTransaction,
    GetBaseInfo,
    Unknown,
}

impl RpcMethod {
    /// Resolve `<namespace>_<name>`; anything else is [`RpcMethod::Unknown`].
    pub fn resolve(namespace: &str, method: &str) -> Self {
        let name = method
            .strip_prefix(namespace)
            .and_then(|m| m.strip_prefix('_'));
        match name {
            Some("sendRawTransaction") => RpcMethod::SendRawTransaction,
            Some("sendTransaction") => RpcMethod::SendTransaction,
            Some("getBaseInfo") => RpcMethod::GetBaseInfo,
            _ => RpcMethod::Unknown,
        }
    }

    /// Metric label. Caller-chosen method names never become labels.
    pub fn as_str(&self) -> &'static str {
        match self {
            RpcMethod::SendRawTransaction => "sendRawTransaction",
            RpcMethod::SendTransaction => "sendTransaction",
            RpcMethod::GetBaseInfo => "getBaseInfo",
            RpcMethod::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RpcRequest {
    #[serde(default)]
    pub jsonrpc: String,
    #[serde(default)]
    pub id: Value,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

impl RpcError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RpcResponse {
    pub jsonrpc: String,
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

impl RpcResponse {
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(id: Value, error: RpcError) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(error),
        }
    }
}

/// `sendRawTransaction` arguments.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SendRawTxArgs {
    pub tx: Bytes,
    #[serde(default)]
    pub wait: u64,
}

/// `sendTransaction` arguments: unsigned transaction plus detached `r || s`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SendTxArgs {
    pub from: Address,
    pub tx: Bytes,
    pub signature: Bytes,
    #[serde(default)]
    pub wait: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BaseInfoArgs {
    pub address: Address,
}

/// Decode the single argument object.
///
/// Accepts positional form `[{...}]` and, for convenience, a bare object.
pub fn single_param<T: DeserializeOwned>(params: &Value) -> Result<T, RpcError> {
    let arg = match params {
        Value::Array(items) if items.len() == 1 => &items[0],
        Value::Array(items) => {
            return Err(RpcError::new(
                INVALID_PARAMS,
                format!("expected 1 argument, got {}", items.len()),
            ))
        }
        Value::Object(_) => params,
        _ => return Err(RpcError::new(INVALID_PARAMS, "missing value for required argument 0")),
    };
    serde_json::from_value(arg.clone())
        .map_err(|e| RpcError::new(INVALID_PARAMS, format!("invalid argument 0: {e}")))
}
