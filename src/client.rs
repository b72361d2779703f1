//! JSON-RPC client for the relay API.

use alloy::primitives::{Address, Bytes, TxHash};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;

use crate::http::rpc::{BaseInfoArgs, RpcError, RpcResponse, SendRawTxArgs, SendTxArgs};
use crate::relay::{BaseInfo, WaitLevel};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("relay returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("rpc error {}: {}", .0.code, .0.message)]
    Rpc(RpcError),

    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("response has neither result nor error")]
    EmptyResponse,
}

/// Talks to a running relay over HTTP.
pub struct ExpressClient {
    client: Client,
    url: String,
    namespace: String,
    next_id: AtomicU64,
}

impl ExpressClient {
    pub fn new(url: &str, namespace: &str) -> Self {
        Self {
            client: Client::new(),
            url: url.trim_end_matches('/').to_string(),
            namespace: namespace.to_string(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Submit a signed transaction.
    pub async fn send_raw_transaction(
        &self,
        tx: Bytes,
        wait: WaitLevel,
    ) -> Result<TxHash, ClientError> {
        let args = SendRawTxArgs {
            tx,
            wait: wait.into(),
        };
        self.call("sendRawTransaction", args).await
    }

    /// Submit an unsigned legacy transaction with its detached `r || s`.
    pub async fn send_transaction(
        &self,
        from: Address,
        tx: Bytes,
        signature: Bytes,
        wait: WaitLevel,
    ) -> Result<TxHash, ClientError> {
        let args = SendTxArgs {
            from,
            tx,
            signature,
            wait: wait.into(),
        };
        self.call("sendTransaction", args).await
    }

    pub async fn get_base_info(&self, address: Address) -> Result<BaseInfo, ClientError> {
        self.call("getBaseInfo", BaseInfoArgs { address }).await
    }

    async fn call<A, T>(&self, method: &str, arg: A) -> Result<T, ClientError>
    where
        A: Serialize,
        T: DeserializeOwned,
    {
        let body = json!({
            "jsonrpc": "2.0",
            "id": self.next_id.fetch_add(1, Ordering::Relaxed),
            "method": format!("{}_{}", self.namespace, method),
            "params": [arg],
        });

        let resp = self.client.post(&self.url).json(&body).send().await?;

        let status = resp.status();
        let text = resp.text().await?;

        if !status.is_success() {
            return Err(ClientError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        let response: RpcResponse = serde_json::from_str(&text)?;
        if let Some(error) = response.error {
            return Err(ClientError::Rpc(error));
        }
        let result: Value = response.result.ok_or(ClientError::EmptyResponse)?;
        Ok(serde_json::from_value(result)?)
    }
}

impl std::fmt::Debug for ExpressClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExpressClient")
            .field("url", &self.url)
            .field("namespace", &self.namespace)
            .finish()
    }
}
