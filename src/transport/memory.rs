//! MemoryWallet - scripted in-process wallet
//!
//! Behaves like a browser extension from the manager's point of view: holds
//! accounts behind an authorization flag, an active chain, a set of chains it
//! knows, and answers the protocol with the same error codes a real wallet
//! uses. Every request is recorded so callers can assert on the exchange.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::{BTreeSet, HashMap};
use std::sync::Mutex;
#[cfg(feature = "native")]
use std::time::Duration;

use super::{ProviderError, TransportResult, WalletTransport};
use crate::core::methods::{codes, rpc};
use crate::core::{ChainId, NetworkDescriptor};

#[derive(Debug, Default)]
struct State {
    accounts: Vec<String>,
    authorized: bool,
    active_chain: ChainId,
    known_chains: BTreeSet<ChainId>,
    added: Vec<NetworkDescriptor>,
    reject_connect: bool,
    reject_switch: bool,
    reject_add: bool,
    failures: HashMap<String, ProviderError>,
    #[cfg(feature = "native")]
    delays: HashMap<String, Duration>,
    #[cfg(feature = "native")]
    holds: HashMap<String, Duration>,
    calls: Vec<(String, Value)>,
}

pub struct MemoryWallet {
    name: String,
    state: Mutex<State>,
}

impl Default for MemoryWallet {
    fn default() -> Self { Self::new() }
}

impl MemoryWallet {
    /// Empty wallet on chain 1 with no accounts.
    pub fn new() -> Self {
        let mut known_chains = BTreeSet::new();
        known_chains.insert(ChainId(1));
        Self {
            name: "memory".into(),
            state: Mutex::new(State { active_chain: ChainId(1), known_chains, ..Default::default() }),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self { self.name = name.into(); self }

    pub fn with_accounts<I, S>(self, accounts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set_accounts(accounts);
        self
    }

    /// Accounts are visible to `eth_accounts` without a prompt.
    pub fn authorized(self) -> Self { self.set_authorized(true); self }

    /// Active chain; also marks it known.
    pub fn with_chain(self, chain: impl Into<ChainId>) -> Self {
        let chain = chain.into();
        {
            let mut s = self.lock();
            s.active_chain = chain;
            s.known_chains.insert(chain);
        }
        self
    }

    pub fn with_known_chain(self, chain: impl Into<ChainId>) -> Self {
        self.lock().known_chains.insert(chain.into());
        self
    }

    pub fn set_accounts<I, S>(&self, accounts: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lock().accounts = accounts.into_iter().map(Into::into).collect();
    }

    pub fn set_authorized(&self, authorized: bool) { self.lock().authorized = authorized; }
    pub fn reject_connect(&self, reject: bool) { self.lock().reject_connect = reject; }
    pub fn reject_switch(&self, reject: bool) { self.lock().reject_switch = reject; }
    pub fn reject_add(&self, reject: bool) { self.lock().reject_add = reject; }

    /// Every request for `method` fails with `error` until cleared.
    pub fn fail(&self, method: &str, error: ProviderError) {
        self.lock().failures.insert(method.to_string(), error);
    }

    pub fn clear_failures(&self) { self.lock().failures.clear(); }

    /// The next request for `method` answers after `delay`. The answer is
    /// computed when the request arrives, not when it resolves.
    #[cfg(feature = "native")]
    pub fn delay_next(&self, method: &str, delay: Duration) {
        self.lock().delays.insert(method.to_string(), delay);
    }

    /// The next request for `method` waits `delay` before the wallet looks at
    /// it, like a prompt the user takes a while to approve. The answer
    /// reflects the wallet state after the wait.
    #[cfg(feature = "native")]
    pub fn hold_next(&self, method: &str, delay: Duration) {
        self.lock().holds.insert(method.to_string(), delay);
    }

    pub fn active_chain(&self) -> ChainId { self.lock().active_chain }
    pub fn knows_chain(&self, chain: ChainId) -> bool { self.lock().known_chains.contains(&chain) }
    pub fn added_networks(&self) -> Vec<NetworkDescriptor> { self.lock().added.clone() }
    pub fn calls(&self) -> Vec<(String, Value)> { self.lock().calls.clone() }

    pub fn calls_to(&self, method: &str) -> Vec<Value> {
        self.lock().calls.iter().filter(|(m, _)| m == method).map(|(_, p)| p.clone()).collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn answer(&self, method: &str, params: &Value) -> TransportResult<Value> {
        let mut s = self.lock();
        s.calls.push((method.to_string(), params.clone()));
        if let Some(err) = s.failures.get(method) {
            return Err(err.clone());
        }
        match method {
            rpc::REQUEST_ACCOUNTS => {
                if s.reject_connect {
                    return Err(ProviderError::user_rejected());
                }
                s.authorized = true;
                Ok(json!(s.accounts))
            }
            rpc::ACCOUNTS => Ok(if s.authorized { json!(s.accounts) } else { json!([]) }),
            rpc::CHAIN_ID => Ok(json!(s.active_chain.to_hex())),
            rpc::SWITCH_CHAIN => {
                let raw = &params[0]["chainId"];
                let chain = ChainId::from_json(raw)
                    .map_err(|e| ProviderError::new(codes::INTERNAL, e.to_string()))?;
                if !s.known_chains.contains(&chain) {
                    return Err(ProviderError::unrecognized_chain(&chain.to_hex()));
                }
                if s.reject_switch {
                    return Err(ProviderError::user_rejected());
                }
                s.active_chain = chain;
                Ok(Value::Null)
            }
            rpc::ADD_CHAIN => {
                let descriptor: NetworkDescriptor = serde_json::from_value(params[0].clone())
                    .map_err(|e| ProviderError::new(codes::INTERNAL, format!("invalid network: {e}")))?;
                if s.reject_add {
                    return Err(ProviderError::user_rejected());
                }
                s.known_chains.insert(descriptor.chain_id);
                s.active_chain = descriptor.chain_id;
                s.added.push(descriptor);
                Ok(Value::Null)
            }
            rpc::PERSONAL_SIGN => {
                let message = params[0].as_str().unwrap_or_default();
                let signer = params[1].as_str().unwrap_or_default().to_ascii_lowercase();
                let owned = s.authorized && s.accounts.iter().any(|a| a.to_ascii_lowercase() == signer);
                if !owned {
                    return Err(ProviderError::new(codes::UNAUTHORIZED, "Unauthorized account"));
                }
                Ok(json!(simulated_signature(&signer, message)))
            }
            other => Err(ProviderError::new(codes::UNSUPPORTED_METHOD, format!("Unsupported method: {other}"))),
        }
    }
}

/// Deterministic 65-byte stand-in; not a real signature.
fn simulated_signature(signer: &str, message_hex: &str) -> String {
    let seed: Vec<u8> = signer.bytes().chain(message_hex.bytes()).collect();
    let mut sig = [0u8; 65];
    for (i, b) in seed.iter().enumerate() {
        sig[i % 65] = sig[i % 65].wrapping_mul(31).wrapping_add(*b);
    }
    sig[64] = 27 + (sig[64] & 1);
    format!("0x{}", hex::encode(sig))
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl WalletTransport for MemoryWallet {
    fn name(&self) -> &str { &self.name }

    async fn request(&self, method: &str, params: Value) -> TransportResult<Value> {
        #[cfg(feature = "native")]
        {
            let hold = self.lock().holds.remove(method);
            if let Some(hold) = hold {
                tokio::time::sleep(hold).await;
            }
        }
        let result = self.answer(method, &params);
        #[cfg(feature = "native")]
        {
            let delay = self.lock().delays.remove(method);
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
        }
        result
    }
}
