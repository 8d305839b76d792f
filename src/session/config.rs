//! Session configuration - passed from higher layers

use std::time::Duration;
use thiserror::Error;

use crate::core::methods::env;
use crate::core::{known_networks, ChainId, ChainIdError, NetworkDescriptor, NetworkTarget};

/// A `LAUNCHPAD_*` variable is set but unusable.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{var}: {source}")]
    InvalidChain {
        var: &'static str,
        #[source]
        source: ChainIdError,
    },
    #[error("{var}: unknown policy '{value}' (expected last-writer or latest-call)")]
    UnknownPolicy { var: &'static str, value: String },
    #[error("{var}: not a number of milliseconds '{value}'")]
    InvalidTimeout { var: &'static str, value: String },
}

/// What happens when initialize/connect calls overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverlapPolicy {
    /// Whichever call completes last sets the session.
    #[default]
    LastWriterWins,
    /// Among calls that store a session, the most recently started one wins;
    /// results of superseded calls are returned to their caller but not
    /// stored. A call that stores nothing supersedes nobody.
    LatestCallWins,
}

impl OverlapPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            OverlapPolicy::LastWriterWins => "last-writer",
            OverlapPolicy::LatestCallWins => "latest-call",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "last-writer" | "last_writer" | "lww" => Some(OverlapPolicy::LastWriterWins),
            "latest-call" | "latest_call" | "latest" => Some(OverlapPolicy::LatestCallWins),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub target: NetworkTarget,
    pub networks: Vec<NetworkDescriptor>,
    pub overlap: OverlapPolicy,
    /// Per-request bound; `None` waits on the wallet indefinitely.
    /// Only enforced on native builds.
    pub request_timeout: Option<Duration>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            target: NetworkTarget::default(),
            networks: known_networks(),
            overlap: OverlapPolicy::default(),
            request_timeout: None,
        }
    }
}

impl SessionConfig {
    pub fn new() -> Self { Self::default() }
    pub fn with_target(mut self, target: NetworkTarget) -> Self { self.target = target; self }
    pub fn with_overlap_policy(mut self, policy: OverlapPolicy) -> Self { self.overlap = policy; self }
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self { self.request_timeout = Some(timeout); self }

    /// Register (or replace) the descriptor used when a chain must be added.
    pub fn with_network(mut self, descriptor: NetworkDescriptor) -> Self {
        self.networks.retain(|n| n.chain_id != descriptor.chain_id);
        self.networks.push(descriptor);
        self
    }

    pub fn descriptor(&self, chain_id: ChainId) -> Option<&NetworkDescriptor> {
        self.networks.iter().find(|n| n.chain_id == chain_id)
    }

    /// Defaults overridden by `LAUNCHPAD_*` variables. Unparseable values are
    /// reported rather than ignored.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(id) = read_chain(env::MAINNET_ID)? {
            config.target.mainnet_id = id;
        }
        if let Some(id) = read_chain(env::TESTNET_ID)? {
            config.target.testnet_id = id;
        }
        if let Ok(raw) = std::env::var(env::OVERLAP) {
            config.overlap = OverlapPolicy::from_str(&raw)
                .ok_or(ConfigError::UnknownPolicy { var: env::OVERLAP, value: raw })?;
        }
        if let Ok(raw) = std::env::var(env::TIMEOUT_MS) {
            let ms: u64 = raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidTimeout { var: env::TIMEOUT_MS, value: raw.clone() })?;
            config.request_timeout = (ms > 0).then(|| Duration::from_millis(ms));
        }
        Ok(config)
    }
}

fn read_chain(var: &'static str) -> Result<Option<ChainId>, ConfigError> {
    match std::env::var(var) {
        Ok(raw) => ChainId::parse(&raw)
            .map(Some)
            .map_err(|source| ConfigError::InvalidChain { var, source }),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::NativeCurrency;
    use once_cell::sync::Lazy;
    use std::sync::Mutex;

    static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

    fn clear_env() {
        for var in [env::MAINNET_ID, env::TESTNET_ID, env::OVERLAP, env::TIMEOUT_MS] {
            std::env::remove_var(var);
        }
    }

    #[test]
    fn test_defaults() {
        let config = SessionConfig::new();
        assert_eq!(config.target, NetworkTarget::polygon());
        assert!(config.descriptor(ChainId(137)).is_some());
        assert!(config.descriptor(ChainId(80001)).is_some());
        assert_eq!(config.overlap, OverlapPolicy::LastWriterWins);
        assert!(config.request_timeout.is_none());
    }

    #[test]
    fn test_with_network_replaces() {
        let custom = NetworkDescriptor::new(137u64, "Polygon (custom RPC)", NativeCurrency::eighteen("POL", "POL"))
            .with_rpc("https://rpc.example");
        let config = SessionConfig::new().with_network(custom);
        assert_eq!(config.networks.len(), 2);
        assert_eq!(config.descriptor(ChainId(137)).unwrap().native_currency.symbol, "POL");
    }

    #[test]
    fn test_from_env() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|p| p.into_inner());
        clear_env();
        std::env::set_var(env::MAINNET_ID, "0x1");
        std::env::set_var(env::TESTNET_ID, "11155111");
        std::env::set_var(env::OVERLAP, "latest-call");
        std::env::set_var(env::TIMEOUT_MS, "2500");
        let config = SessionConfig::from_env().unwrap();
        clear_env();
        assert_eq!(config.target, NetworkTarget::new(1u64, 11155111u64));
        assert_eq!(config.overlap, OverlapPolicy::LatestCallWins);
        assert_eq!(config.request_timeout, Some(Duration::from_millis(2500)));
    }

    #[test]
    fn test_from_env_rejects_garbage() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|p| p.into_inner());
        clear_env();
        std::env::set_var(env::OVERLAP, "first-wins");
        let err = SessionConfig::from_env().unwrap_err();
        clear_env();
        assert_eq!(err, ConfigError::UnknownPolicy { var: env::OVERLAP, value: "first-wins".into() });
        assert!(err.to_string().starts_with(env::OVERLAP));
    }

    #[test]
    fn test_from_env_typed_errors() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|p| p.into_inner());
        clear_env();
        std::env::set_var(env::MAINNET_ID, "polygon");
        let chain = SessionConfig::from_env().unwrap_err();
        clear_env();
        std::env::set_var(env::TIMEOUT_MS, "soon");
        let timeout = SessionConfig::from_env().unwrap_err();
        clear_env();
        assert!(matches!(chain, ConfigError::InvalidChain { var, .. } if var == env::MAINNET_ID));
        assert_eq!(timeout, ConfigError::InvalidTimeout { var: env::TIMEOUT_MS, value: "soon".into() });
    }

    #[test]
    fn test_overlap_names_roundtrip() {
        for policy in [OverlapPolicy::LastWriterWins, OverlapPolicy::LatestCallWins] {
            assert_eq!(OverlapPolicy::from_str(policy.as_str()), Some(policy));
        }
    }
}
