//! Notices - user-visible outcomes the UI layer renders (toasts, banners)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

use crate::core::ChainId;
use crate::transport::MaybeSend;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notice {
    NotInstalled,
    ConnectionRejected,
    RequestPending,
    ConnectionFailed { reason: String },
    SwitchFailed { chain_id: ChainId },
    AddNetworkFailed { chain_id: ChainId },
}

impl Notice {
    pub fn severity(&self) -> Severity {
        match self {
            Notice::RequestPending => Severity::Info,
            _ => Severity::Error,
        }
    }

    pub fn message(&self) -> String {
        match self {
            Notice::NotInstalled => "Please install MetaMask to use this dApp".into(),
            Notice::ConnectionRejected => "Wallet connection was rejected".into(),
            Notice::RequestPending => "Check your wallet: a connection request is already open".into(),
            Notice::ConnectionFailed { reason } => format!("Could not connect to your wallet: {reason}"),
            Notice::SwitchFailed { chain_id } => format!("Could not switch to network {chain_id}"),
            Notice::AddNetworkFailed { chain_id } => format!("Could not add network {chain_id} to your wallet"),
        }
    }
}

/// Where notices go. Implementations must not block.
pub trait Notifier: MaybeSend {
    fn notify(&self, notice: &Notice);
}

/// Logs notices through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: &Notice) {
        match notice.severity() {
            Severity::Info => tracing::info!(notice = ?notice, "{}", notice.message()),
            Severity::Error => tracing::warn!(notice = ?notice, "{}", notice.message()),
        }
    }
}

/// A notice with the time it was raised.
#[derive(Debug, Clone, Serialize)]
pub struct Recorded {
    pub at: DateTime<Utc>,
    #[serde(flatten)]
    pub notice: Notice,
}

/// Keeps every notice; clones share the same log.
#[derive(Debug, Default, Clone)]
pub struct RecordingNotifier {
    log: Arc<Mutex<Vec<Recorded>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self { Self::default() }

    pub fn notices(&self) -> Vec<Notice> {
        self.lock().iter().map(|r| r.notice.clone()).collect()
    }

    pub fn recorded(&self) -> Vec<Recorded> { self.lock().clone() }

    /// Drain, for UIs that poll.
    pub fn take(&self) -> Vec<Recorded> { std::mem::take(&mut *self.lock()) }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Recorded>> {
        self.log.lock().unwrap_or_else(|p| p.into_inner())
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: &Notice) {
        self.lock().push(Recorded { at: Utc::now(), notice: notice.clone() });
    }
}

impl<N: Notifier + ?Sized> Notifier for Arc<N> {
    fn notify(&self, notice: &Notice) { (**self).notify(notice) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_distinct_messages() {
        let not_installed = Notice::NotInstalled.message();
        let rejected = Notice::ConnectionRejected.message();
        let switch = Notice::SwitchFailed { chain_id: ChainId(137) }.message();
        let add = Notice::AddNetworkFailed { chain_id: ChainId(137) }.message();
        assert!(not_installed.contains("install"));
        assert!(rejected.contains("rejected"));
        assert_ne!(switch, add);
    }

    #[test]
    fn test_wire_shape() {
        let value = serde_json::to_value(Notice::AddNetworkFailed { chain_id: ChainId(80001) }).unwrap();
        assert_eq!(value, json!({"kind": "add_network_failed", "chain_id": 80001}));
    }

    #[test]
    fn test_recording_take_drains() {
        let rec = RecordingNotifier::new();
        let shared = rec.clone();
        shared.notify(&Notice::ConnectionRejected);
        assert_eq!(rec.notices(), vec![Notice::ConnectionRejected]);
        assert_eq!(rec.take().len(), 1);
        assert!(rec.notices().is_empty());
    }
}
