//! JSON-RPC and WebSocket surface tests against a live server.

use alloy::primitives::Address;
use futures_util::StreamExt;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

use tx_express::client::{ClientError, ExpressClient};
use tx_express::config::ListenerConfig;
use tx_express::http::{AppState, HttpServer, X_REQUEST_ID};
use tx_express::notify::{NotificationFrame, NotifySink, WsHub};
use tx_express::relay::{Relay, WaitLevel};

mod common;
use common::{MockChain, RecordingSink};

struct Harness {
    addr: SocketAddr,
    relay: Relay,
    http: reqwest::Client,
}

impl Harness {
    fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    async fn call(&self, method: &str, params: Value) -> Value {
        self.http
            .post(self.url())
            .json(&json!({"jsonrpc": "2.0", "id": 1, "method": method, "params": params}))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap()
    }
}

async fn start(chain: &MockChain, sink: Arc<dyn NotifySink>, hub: Option<WsHub>) -> Harness {
    let relay = common::spawn_relay(chain, sink, "test");
    let state = AppState {
        gate: relay.gate.clone(),
        pending: relay.pending.clone(),
        hub,
        namespace: "newton".into(),
    };

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = HttpServer::new(&ListenerConfig::default(), state);
    tokio::spawn(server.run_until(listener, std::future::pending()));

    Harness {
        addr,
        relay,
        http: reqwest::Client::new(),
    }
}

#[tokio::test]
async fn test_send_raw_transaction_returns_hash() {
    let chain = MockChain::new();
    let h = start(&chain, Arc::new(RecordingSink::default()), None).await;

    let (raw, envelope) = common::signed_transfer(common::recipient(), 1000, 0);
    let resp = h
        .call("newton_sendRawTransaction", json!([{"tx": raw, "wait": 1}]))
        .await;

    assert_eq!(resp["jsonrpc"], "2.0");
    assert_eq!(resp["id"], 1);
    assert_eq!(resp["result"], json!(envelope.tx_hash()));
    assert_eq!(chain.sent(), vec![*envelope.tx_hash()]);
    h.relay.abort();
}

#[tokio::test]
async fn test_unknown_method() {
    let chain = MockChain::new();
    let h = start(&chain, Arc::new(RecordingSink::default()), None).await;

    let resp = h.call("newton_doesNotExist", json!([])).await;
    assert_eq!(resp["error"]["code"], -32601);

    let resp = h.call("eth_sendRawTransaction", json!([{"tx": "0x"}])).await;
    assert_eq!(resp["error"]["code"], -32601);
    h.relay.abort();
}

#[tokio::test]
async fn test_malformed_params() {
    let chain = MockChain::new();
    let h = start(&chain, Arc::new(RecordingSink::default()), None).await;

    let resp = h.call("newton_sendRawTransaction", json!([{"tx": "zz"}])).await;
    assert_eq!(resp["error"]["code"], -32602);

    let resp = h.call("newton_getBaseInfo", json!([])).await;
    assert_eq!(resp["error"]["code"], -32602);
    h.relay.abort();
}

#[tokio::test]
async fn test_relay_errors_map_to_server_error() {
    let chain = MockChain::new();
    let h = start(&chain, Arc::new(RecordingSink::default()), None).await;

    let resp = h
        .call("newton_sendRawTransaction", json!([{"tx": "0x1234"}]))
        .await;
    assert_eq!(resp["error"]["code"], -32000);

    let resp = h
        .call(
            "newton_sendTransaction",
            json!([{"from": Address::ZERO, "tx": "0xc0", "signature": "0x00", "wait": 0}]),
        )
        .await;
    assert_eq!(resp["error"]["code"], -32000);
    assert!(resp["error"]["message"]
        .as_str()
        .unwrap()
        .contains("invalid signature length"));
    h.relay.abort();
}

#[tokio::test]
async fn test_parse_error_and_batch() {
    let chain = MockChain::new();
    let h = start(&chain, Arc::new(RecordingSink::default()), None).await;

    let resp: Value = h
        .http
        .post(h.url())
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(resp["error"]["code"], -32700);

    let resp: Value = h
        .http
        .post(h.url())
        .json(&json!([{"jsonrpc": "2.0", "id": 1, "method": "newton_getBaseInfo"}]))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(resp["error"]["code"], -32600);
    h.relay.abort();
}

#[tokio::test]
async fn test_get_base_info() {
    let chain = MockChain::new();
    let h = start(&chain, Arc::new(RecordingSink::default()), None).await;

    let resp = h
        .call("newton_getBaseInfo", json!([{"address": common::recipient()}]))
        .await;
    let result = &resp["result"];
    assert_eq!(result["nonceLatest"], "0x3");
    assert_eq!(result["noncePending"], "0x4");
    assert_eq!(result["gasPrice"], "0x64");
    assert_eq!(result["networkID"], common::CHAIN_ID);
    assert_eq!(result["balance"], "0xde0b6b3a7640000");
    h.relay.abort();
}

#[tokio::test]
async fn test_health_and_request_id() {
    let chain = MockChain::new();
    let h = start(&chain, Arc::new(RecordingSink::default()), None).await;

    let resp = h
        .http
        .get(format!("{}/health", h.url()))
        .header(X_REQUEST_ID, "trace-me")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.headers()[X_REQUEST_ID], "trace-me");
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["pending"], 0);

    let resp = h.http.get(format!("{}/health", h.url())).send().await.unwrap();
    assert!(resp.headers().contains_key(X_REQUEST_ID));
    h.relay.abort();
}

#[tokio::test]
async fn test_oversized_body_rejected() {
    let chain = MockChain::new();
    let h = start(&chain, Arc::new(RecordingSink::default()), None).await;

    let big = "0".repeat(ListenerConfig::default().max_body_bytes + 1);
    let resp = h.http.post(h.url()).body(big).send().await.unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::PAYLOAD_TOO_LARGE);
    h.relay.abort();
}

#[tokio::test]
async fn test_ws_disabled_without_hub() {
    let chain = MockChain::new();
    let h = start(&chain, Arc::new(RecordingSink::default()), None).await;

    let result = tokio_tungstenite::connect_async(format!("ws://{}/notify/ws", h.addr)).await;
    assert!(result.is_err());
    h.relay.abort();
}

#[tokio::test]
async fn test_websocket_receives_lifecycle_frames() {
    let chain = MockChain::new();
    chain.mine_on_send(true);
    let hub = WsHub::new(16);
    let h = start(&chain, Arc::new(hub.clone()), Some(hub)).await;

    let (mut ws, _) = tokio_tungstenite::connect_async(format!("ws://{}/notify/ws", h.addr))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;

    let (raw, envelope) = common::signed_transfer(common::recipient(), 42, 0);
    let resp = h
        .call("newton_sendRawTransaction", json!([{"tx": raw, "wait": 0}]))
        .await;
    assert_eq!(resp["result"], json!(envelope.tx_hash()));

    let mut markers = Vec::new();
    while markers.len() < 3 {
        let msg = tokio::time::timeout(Duration::from_secs(5), ws.next())
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        let text = msg.into_text().unwrap();
        let frame: NotificationFrame = serde_json::from_str(text.as_str()).unwrap();
        assert_eq!(frame.payload["hash"], json!(envelope.tx_hash()));
        assert_eq!(frame.payload["value"], "0x2a");
        markers.push(common::marker(&frame.topic).to_string());
    }
    assert_eq!(markers, vec!["-1", "0", "1"]);
    h.relay.abort();
}

#[tokio::test]
async fn test_express_client_round_trip() {
    let chain = MockChain::new();
    let h = start(&chain, Arc::new(RecordingSink::default()), None).await;
    let client = ExpressClient::new(&h.url(), "newton");

    let info = client.get_base_info(common::recipient()).await.unwrap();
    assert_eq!(info.network_id, common::CHAIN_ID);

    let (raw, envelope) = common::signed_transfer(common::recipient(), 1, 0);
    let hash = client
        .send_raw_transaction(raw, WaitLevel::WaitForBroadcast)
        .await
        .unwrap();
    assert_eq!(hash, *envelope.tx_hash());

    let err = client
        .send_raw_transaction(vec![0x12u8].into(), WaitLevel::NoWait)
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Rpc(ref e) if e.code == -32000));
    h.relay.abort();
}
