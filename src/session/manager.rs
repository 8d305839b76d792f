//! SessionManager - owns the one Session and negotiates with the wallet
//!
//! ```text
//!   Unconnected ──connect/initialize──▶ Connecting ──accounts──▶ Connected
//!        ▲                                  │                        │
//!        └────────── rejected / error ──────┘        reconnect ──────┘
//! ```

use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::RwLock;

use super::config::{OverlapPolicy, SessionConfig};
use super::error::{SessionError, SessionResult, SwitchError, SwitchStage};
use super::notify::{Notice, Notifier, TracingNotifier};
use super::state::Session;
use crate::core::methods::rpc;
use crate::core::{Address, ChainId, NetworkTarget};
use crate::transport::{Transport, TransportSource};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Unconnected,
    Connecting,
    Connected,
}

/// How a successful switch came about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchOutcome {
    Switched,
    /// The wallet did not know the chain; it was added (and activated).
    Added,
}

/// Decrements the in-flight count however the operation ends.
struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn enter(count: &'a AtomicUsize) -> Self {
        count.fetch_add(1, Ordering::SeqCst);
        Self(count)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) { self.0.fetch_sub(1, Ordering::SeqCst); }
}

/// The stored session and the ticket of the call that wrote it.
#[derive(Default)]
struct Slot {
    ticket: u64,
    session: Session,
}

pub struct SessionManager {
    source: Box<dyn TransportSource>,
    notifier: Box<dyn Notifier>,
    config: SessionConfig,
    slot: RwLock<Slot>,
    generation: AtomicU64,
    in_flight: AtomicUsize,
}

impl SessionManager {
    pub fn new(source: impl TransportSource + 'static, notifier: impl Notifier + 'static, config: SessionConfig) -> Self {
        Self {
            source: Box::new(source),
            notifier: Box::new(notifier),
            config,
            slot: RwLock::new(Slot::default()),
            generation: AtomicU64::new(0),
            in_flight: AtomicUsize::new(0),
        }
    }

    /// Default config, notices logged through `tracing`.
    pub fn with_source(source: impl TransportSource + 'static) -> Self {
        Self::new(source, TracingNotifier, SessionConfig::default())
    }

    pub fn config(&self) -> &SessionConfig { &self.config }

    /// Snapshot of the stored session.
    pub fn current(&self) -> Session {
        self.slot.read().unwrap_or_else(|p| p.into_inner()).session.clone()
    }

    pub fn phase(&self) -> Phase {
        if self.in_flight.load(Ordering::SeqCst) > 0 {
            Phase::Connecting
        } else if self.current().is_connected() {
            Phase::Connected
        } else {
            Phase::Unconnected
        }
    }

    // -------------------------------------------------------------------------
    // initialize
    // -------------------------------------------------------------------------

    /// Rebuild the session from accounts the wallet has already authorized.
    /// Never prompts. Stores the session only when an account is present.
    pub async fn try_initialize(&self) -> SessionResult<Session> {
        let ticket = self.next_ticket();
        let _flight = InFlight::enter(&self.in_flight);
        let transport = self.source.detect().ok_or(SessionError::NotInstalled)?;
        let session = self.load(transport).await?;
        if session.is_connected() {
            self.commit(ticket, session.clone());
        }
        Ok(session)
    }

    /// Like [`try_initialize`](Self::try_initialize) but degrades every
    /// failure to the empty session. Raises no notices.
    pub async fn initialize(&self) -> Session {
        match self.try_initialize().await {
            Ok(session) => session,
            Err(SessionError::NotInstalled) => {
                tracing::debug!("no wallet transport injected");
                Session::empty()
            }
            Err(e) => {
                tracing::error!("Error initializing wallet session: {}", e);
                Session::empty()
            }
        }
    }

    // -------------------------------------------------------------------------
    // connect
    // -------------------------------------------------------------------------

    /// Prompt for accounts, then rebuild the session. Any failure resets the
    /// stored session to empty.
    pub async fn try_connect(&self) -> SessionResult<Session> {
        let ticket = self.next_ticket();
        let _flight = InFlight::enter(&self.in_flight);
        let result = self.authorize().await;
        match &result {
            Ok(session) => {
                if let Some(account) = session.account() {
                    tracing::info!(account = %account.short(), chain = ?session.chain_id(), "wallet connected");
                }
                self.commit(ticket, session.clone());
            }
            Err(e) => {
                tracing::warn!("wallet connection failed: {}", e);
                self.commit(ticket, Session::empty());
            }
        }
        result
    }

    /// Connected session, or the empty session plus one notice saying why.
    pub async fn connect(&self) -> Session {
        match self.try_connect().await {
            Ok(session) => session,
            Err(e) => {
                self.notifier.notify(&connect_notice(&e));
                Session::empty()
            }
        }
    }

    async fn authorize(&self) -> SessionResult<Session> {
        let transport = self.source.detect().ok_or(SessionError::NotInstalled)?;
        self.call(&transport, rpc::REQUEST_ACCOUNTS, json!([])).await?;
        let session = self.load(transport).await?;
        if !session.is_connected() {
            return Err(SessionError::InvalidResponse("wallet granted no accounts".into()));
        }
        Ok(session)
    }

    /// Chain id then authorized accounts; empty session when there are none.
    async fn load(&self, transport: Transport) -> SessionResult<Session> {
        let raw_chain = self.call(&transport, rpc::CHAIN_ID, json!([])).await?;
        let chain_id = ChainId::from_json(&raw_chain).map_err(|e| SessionError::InvalidResponse(e.to_string()))?;
        let accounts = self.call(&transport, rpc::ACCOUNTS, json!([])).await?;
        Ok(match first_account(&accounts)? {
            Some(account) => Session::connected(transport, account, chain_id),
            None => Session::empty(),
        })
    }

    // -------------------------------------------------------------------------
    // switch network
    // -------------------------------------------------------------------------

    /// Ask the wallet to activate the target chain, adding it from the
    /// configured descriptor when the wallet reports it unknown.
    pub async fn try_switch_network(&self, target: NetworkTarget, use_testnet: bool) -> Result<SwitchOutcome, SwitchError> {
        let chain_id = target.select(use_testnet);
        let fail = |stage, source| SwitchError::new(chain_id, stage, source);
        let transport = self.source.detect().ok_or_else(|| fail(SwitchStage::Switch, SessionError::NotInstalled))?;

        let params = json!([{ "chainId": chain_id.to_hex() }]);
        match self.call(&transport, rpc::SWITCH_CHAIN, params).await.map_err(|e| classify_switch(e, chain_id)) {
            Ok(_) => Ok(SwitchOutcome::Switched),
            Err(SessionError::UnknownChain(_)) => {
                let descriptor = self
                    .config
                    .descriptor(chain_id)
                    .ok_or_else(|| fail(SwitchStage::Add, SessionError::UnsupportedNetwork(chain_id)))?;
                tracing::info!(chain = %chain_id, name = %descriptor.chain_name, "wallet does not know chain, adding");
                let params = json!([descriptor]);
                self.call(&transport, rpc::ADD_CHAIN, params)
                    .await
                    .map(|_| SwitchOutcome::Added)
                    .map_err(|e| fail(SwitchStage::Add, e))
            }
            Err(e) => Err(fail(SwitchStage::Switch, e)),
        }
    }

    /// `true` when the wallet ends up on the target chain; `false` plus one
    /// notice otherwise.
    pub async fn switch_network(&self, target: NetworkTarget, use_testnet: bool) -> bool {
        match self.try_switch_network(target, use_testnet).await {
            Ok(_) => true,
            Err(e) => {
                tracing::error!("Error switching network: {}", e);
                self.notifier.notify(&switch_notice(&e));
                false
            }
        }
    }

    /// [`switch_network`](Self::switch_network) against the configured target.
    pub async fn switch_to_configured(&self, use_testnet: bool) -> bool {
        self.switch_network(self.config.target, use_testnet).await
    }

    // -------------------------------------------------------------------------
    // internals
    // -------------------------------------------------------------------------

    fn next_ticket(&self) -> u64 { self.generation.fetch_add(1, Ordering::SeqCst) + 1 }

    /// Replace the stored session wholesale. Under `LatestCallWins` a write
    /// from a call started before the one that last wrote is dropped; calls
    /// that store nothing never supersede anyone.
    fn commit(&self, ticket: u64, session: Session) -> bool {
        let mut slot = self.slot.write().unwrap_or_else(|p| p.into_inner());
        if self.config.overlap == OverlapPolicy::LatestCallWins && ticket < slot.ticket {
            tracing::debug!(ticket, newer = slot.ticket, "superseded session result discarded");
            return false;
        }
        slot.ticket = slot.ticket.max(ticket);
        slot.session = session;
        true
    }

    async fn call(&self, transport: &Transport, method: &str, params: Value) -> SessionResult<Value> {
        tracing::trace!(method, transport = transport.name(), "request");
        let pending = transport.request(method, params);
        #[cfg(feature = "native")]
        if let Some(limit) = self.config.request_timeout {
            return match tokio::time::timeout(limit, pending).await {
                Ok(result) => result.map_err(SessionError::from),
                Err(_) => Err(SessionError::Timeout),
            };
        }
        pending.await.map_err(SessionError::from)
    }
}

fn first_account(value: &Value) -> SessionResult<Option<Address>> {
    let list = value
        .as_array()
        .ok_or_else(|| SessionError::InvalidResponse(format!("accounts is not a list: {value}")))?;
    match list.first() {
        None => Ok(None),
        Some(Value::String(raw)) => Address::parse(raw)
            .map(Some)
            .map_err(|e| SessionError::InvalidResponse(e.to_string())),
        Some(other) => Err(SessionError::InvalidResponse(format!("account is not a string: {other}"))),
    }
}

fn classify_switch(err: SessionError, chain_id: ChainId) -> SessionError {
    match err {
        SessionError::Transport(ref e) if e.is_unrecognized_chain() => SessionError::UnknownChain(chain_id),
        other => other,
    }
}

fn connect_notice(err: &SessionError) -> Notice {
    match err {
        SessionError::NotInstalled => Notice::NotInstalled,
        SessionError::Rejected => Notice::ConnectionRejected,
        SessionError::RequestPending => Notice::RequestPending,
        other => Notice::ConnectionFailed { reason: other.to_string() },
    }
}

fn switch_notice(err: &SwitchError) -> Notice {
    match (&err.source, err.stage) {
        (SessionError::NotInstalled, _) => Notice::NotInstalled,
        (_, SwitchStage::Switch) => Notice::SwitchFailed { chain_id: err.chain_id },
        (_, SwitchStage::Add) => Notice::AddNetworkFailed { chain_id: err.chain_id },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::ProviderError;

    #[test]
    fn test_first_account_shapes() {
        assert_eq!(first_account(&json!([])).unwrap(), None);
        let addr = first_account(&json!(["0xABCDEF0123456789ABCDEF0123456789ABCD1234", "0x0000000000000000000000000000000000000001"]))
            .unwrap()
            .unwrap();
        assert_eq!(addr.as_str(), "0xabcdef0123456789abcdef0123456789abcd1234");
        assert!(matches!(first_account(&json!("0xabc")), Err(SessionError::InvalidResponse(_))));
        assert!(matches!(first_account(&json!([42])), Err(SessionError::InvalidResponse(_))));
        assert!(matches!(first_account(&json!(["0x12"])), Err(SessionError::InvalidResponse(_))));
    }

    #[test]
    fn test_classify_switch() {
        let unknown = SessionError::from(ProviderError::unrecognized_chain("0x89"));
        assert_eq!(classify_switch(unknown, ChainId(137)), SessionError::UnknownChain(ChainId(137)));
        assert_eq!(classify_switch(SessionError::Rejected, ChainId(137)), SessionError::Rejected);
    }

    #[test]
    fn test_notice_mapping() {
        assert_eq!(connect_notice(&SessionError::Rejected), Notice::ConnectionRejected);
        assert_eq!(connect_notice(&SessionError::NotInstalled), Notice::NotInstalled);
        assert!(matches!(connect_notice(&SessionError::Timeout), Notice::ConnectionFailed { .. }));

        let add = SwitchError::new(ChainId(80001), SwitchStage::Add, SessionError::Rejected);
        assert_eq!(switch_notice(&add), Notice::AddNetworkFailed { chain_id: ChainId(80001) });
        let switch = SwitchError::new(ChainId(137), SwitchStage::Switch, SessionError::Rejected);
        assert_eq!(switch_notice(&switch), Notice::SwitchFailed { chain_id: ChainId(137) });
    }
}
