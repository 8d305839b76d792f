//! WsTransport Tests: JSON-RPC over a local WebSocket
//!
//! A throwaway tokio-tungstenite server on 127.0.0.1 plays the node. Tests
//! cover id correlation, error propagation, disconnect handling, and the
//! session manager running end to end over the socket.

#![cfg(feature = "native")]

use futures_util::{SinkExt, StreamExt};
use launchpad_wallet::core::methods::rpc;
use launchpad_wallet::{
    ChainId, NetworkTarget, RecordingNotifier, SessionConfig, SessionManager, Transport, WalletTransport, WsTransport,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_tungstenite::{accept_async, tungstenite::Message};

const NODE_ACCOUNT: &str = "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266";

/// Minimal node: fixed account, chain 137, knows 137 and 80001.
fn answer(request: &Value) -> Value {
    let id = request["id"].clone();
    let method = request["method"].as_str().unwrap_or_default();
    match method {
        rpc::CHAIN_ID => json!({"jsonrpc": "2.0", "id": id, "result": "0x89"}),
        rpc::ACCOUNTS | rpc::REQUEST_ACCOUNTS => json!({"jsonrpc": "2.0", "id": id, "result": [NODE_ACCOUNT]}),
        rpc::SWITCH_CHAIN => match request["params"][0]["chainId"].as_str() {
            Some("0x89") | Some("0x13881") => json!({"jsonrpc": "2.0", "id": id, "result": null}),
            _ => json!({"jsonrpc": "2.0", "id": id, "error": {"code": 4902, "message": "Unrecognized chain ID"}}),
        },
        other => json!({"jsonrpc": "2.0", "id": id, "error": {"code": 4200, "message": format!("Unsupported method: {other}")}}),
    }
}

/// Serve one connection, answering each request as it arrives.
async fn spawn_node() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.expect("accept");
        let mut ws = accept_async(stream).await.expect("handshake");
        while let Some(Ok(msg)) = ws.next().await {
            if let Message::Text(txt) = msg {
                let request: Value = serde_json::from_str(&txt).expect("json request");
                let reply = answer(&request).to_string();
                if ws.send(Message::Text(reply)).await.is_err() {
                    break;
                }
            }
        }
    });
    format!("ws://{addr}")
}

/// Test: request/response round trip
#[tokio::test]
async fn request_returns_result() {
    let url = spawn_node().await;
    let ws = WsTransport::connect(url.clone()).await.expect("connect");

    assert!(ws.is_connected());
    assert_eq!(ws.url(), url);
    assert_eq!(ws.request(rpc::CHAIN_ID, json!([])).await.unwrap(), json!("0x89"));
    assert_eq!(ws.request(rpc::ACCOUNTS, Value::Null).await.unwrap(), json!([NODE_ACCOUNT]));
}

/// Test: error objects become ProviderError with their code
#[tokio::test]
async fn request_error_is_propagated() {
    let url = spawn_node().await;
    let ws = WsTransport::connect(url).await.expect("connect");

    let err = ws.request("eth_sendTransaction", json!([])).await.unwrap_err();
    assert_eq!(err.code, 4200);

    let err = ws.request(rpc::SWITCH_CHAIN, json!([{"chainId": "0x5"}])).await.unwrap_err();
    assert!(err.is_unrecognized_chain());
}

/// Test: replies arriving out of order still reach the right caller
#[tokio::test]
async fn responses_are_correlated_by_id() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.expect("accept");
        let mut ws = accept_async(stream).await.expect("handshake");
        let mut held = Vec::new();
        while held.len() < 2 {
            match ws.next().await {
                Some(Ok(Message::Text(txt))) => held.push(serde_json::from_str::<Value>(&txt).expect("json")),
                Some(Ok(_)) => continue,
                _ => return,
            }
        }
        for request in held.iter().rev() {
            let reply = answer(request).to_string();
            ws.send(Message::Text(reply)).await.expect("send");
        }
        while ws.next().await.is_some() {}
    });

    let ws = WsTransport::connect(format!("ws://{addr}")).await.expect("connect");
    let (chain, accounts) = tokio::join!(ws.request(rpc::CHAIN_ID, json!([])), ws.request(rpc::ACCOUNTS, json!([])));

    assert_eq!(chain.unwrap(), json!("0x89"));
    assert_eq!(accounts.unwrap(), json!([NODE_ACCOUNT]));
}

/// Test: pending requests fail with 4900 when the node hangs up
#[tokio::test]
async fn server_close_fails_pending_requests() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.expect("accept");
        let mut ws = accept_async(stream).await.expect("handshake");
        // read one request, then hang up without answering
        let _ = ws.next().await;
        let _ = ws.close(None).await;
    });

    let ws = WsTransport::connect(format!("ws://{addr}")).await.expect("connect");
    let err = ws.request(rpc::CHAIN_ID, json!([])).await.unwrap_err();

    assert_eq!(err.code, 4900);
    assert!(!ws.is_connected());

    // later requests are refused at once instead of waiting on a dead socket
    let later = tokio::time::timeout(Duration::from_secs(1), ws.request(rpc::ACCOUNTS, json!([])))
        .await
        .expect("request on a closed socket must not hang");
    assert_eq!(later.unwrap_err().code, 4900);
}

/// Test: session manager end to end over the socket
#[tokio::test]
async fn manager_runs_over_websocket() {
    let url = spawn_node().await;
    let transport: Transport = Arc::new(WsTransport::connect(url.clone()).await.expect("connect"));
    let notices = RecordingNotifier::new();
    let manager = SessionManager::new(Some(transport), notices.clone(), SessionConfig::default());

    let session = manager.connect().await;

    assert!(session.is_connected());
    assert_eq!(session.account().unwrap().as_str(), NODE_ACCOUNT);
    assert_eq!(session.chain_id(), Some(ChainId::POLYGON));
    assert_eq!(session.provider().unwrap().name(), url);

    assert!(manager.switch_network(NetworkTarget::polygon(), true).await);
    assert!(notices.notices().is_empty());
}
