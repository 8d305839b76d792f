//! WsTransport - JSON-RPC 2.0 over tokio-tungstenite WebSocket
//!
//! Talks to development nodes (anvil, hardhat, geth `--ws`) that answer the
//! account and chain methods directly. Requests are correlated to responses
//! by id; a writer task owns the sink and a reader task resolves waiters.

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::{mpsc, oneshot};
use tokio_tungstenite::{connect_async, tungstenite::Message};

use super::{ProviderError, TransportResult, WalletTransport};

type Reply = oneshot::Sender<TransportResult<Value>>;

/// Open flag and outstanding requests. Both change under one lock so a
/// request can never register after the close drain.
#[derive(Default)]
struct Pending {
    open: bool,
    waiters: HashMap<u64, Reply>,
}

type Shared = Arc<Mutex<Pending>>;

fn lock(shared: &Shared) -> MutexGuard<'_, Pending> {
    shared.lock().unwrap_or_else(|p| p.into_inner())
}

/// Register a waiter for `id`, refusing once the socket is closed.
fn register(shared: &Shared, id: u64) -> TransportResult<oneshot::Receiver<TransportResult<Value>>> {
    let mut pending = lock(shared);
    if !pending.open {
        return Err(ProviderError::disconnected("not connected"));
    }
    let (tx, rx) = oneshot::channel();
    pending.waiters.insert(id, tx);
    Ok(rx)
}

/// Mark closed and fail every outstanding request.
fn close(shared: &Shared, reason: &str) {
    let drained: Vec<Reply> = {
        let mut pending = lock(shared);
        pending.open = false;
        pending.waiters.drain().map(|(_, w)| w).collect()
    };
    for waiter in drained {
        let _ = waiter.send(Err(ProviderError::disconnected(reason)));
    }
}

pub struct WsTransport {
    url: String,
    next_id: AtomicU64,
    pending: Shared,
    tx: mpsc::Sender<String>,
}

impl WsTransport {
    /// Connect and spawn the reader/writer tasks.
    pub async fn connect(url: impl Into<String>) -> anyhow::Result<Self> {
        let url = url.into();
        let (ws, _) = connect_async(url.as_str()).await?;
        let (mut write, mut read) = ws.split();

        let (out_tx, mut out_rx) = mpsc::channel::<String>(32);
        let pending: Shared = Arc::new(Mutex::new(Pending { open: true, waiters: HashMap::new() }));

        let pending_w = pending.clone();
        tokio::spawn(async move {
            while let Some(msg) = out_rx.recv().await {
                if write.send(Message::Text(msg)).await.is_err() {
                    break;
                }
            }
            close(&pending_w, "writer closed");
        });

        let pending_r = pending.clone();
        let label = url.clone();
        tokio::spawn(async move {
            while let Some(Ok(msg)) = read.next().await {
                if let Message::Text(txt) = msg {
                    dispatch(&pending_r, &txt);
                }
            }
            tracing::warn!(url = %label, "wallet socket closed");
            close(&pending_r, "socket closed");
        });

        tracing::info!(url = %url, "wallet socket connected");
        Ok(Self { url, next_id: AtomicU64::new(1), pending, tx: out_tx })
    }

    pub fn url(&self) -> &str { &self.url }

    pub fn is_connected(&self) -> bool { lock(&self.pending).open }
}

/// Resolve the waiter a response belongs to. Messages without an id are
/// subscription notifications and are only logged.
fn dispatch(shared: &Shared, txt: &str) {
    let value: Value = match serde_json::from_str(txt) {
        Ok(v) => v,
        Err(e) => {
            tracing::debug!("ignoring non-json frame: {}", e);
            return;
        }
    };
    let Some(id) = value.get("id").and_then(Value::as_u64) else {
        tracing::debug!(method = ?value.get("method"), "notification");
        return;
    };
    let Some(waiter) = lock(shared).waiters.remove(&id) else {
        tracing::debug!(id, "response for unknown request");
        return;
    };
    let result = match value.get("error") {
        Some(err) if !err.is_null() => Err(ProviderError::from_json(err)),
        _ => Ok(value.get("result").cloned().unwrap_or(Value::Null)),
    };
    let _ = waiter.send(result);
}

#[async_trait]
impl WalletTransport for WsTransport {
    fn name(&self) -> &str { &self.url }

    async fn request(&self, method: &str, params: Value) -> TransportResult<Value> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let params = if params.is_null() { json!([]) } else { params };
        let frame = json!({"jsonrpc": "2.0", "id": id, "method": method, "params": params}).to_string();

        let rx = register(&self.pending, id)?;
        if self.tx.send(frame).await.is_err() {
            lock(&self.pending).waiters.remove(&id);
            return Err(ProviderError::disconnected("writer closed"));
        }
        tracing::debug!(id, method, "sent");
        rx.await.unwrap_or_else(|_| Err(ProviderError::disconnected("socket closed")))
    }
}
