//! Session errors - tagged reasons behind the degraded `initialize` / `connect` /
//! `switch_network` results

use crate::core::ChainId;
use crate::transport::ProviderError;
use thiserror::Error;

/// Why a session operation did not produce a connected session or a switched network.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    #[error("no wallet extension detected")]
    NotInstalled,
    #[error("user rejected the request")]
    Rejected,
    #[error("a wallet prompt is already open")]
    RequestPending,
    #[error("chain {0} is not known to the wallet")]
    UnknownChain(ChainId),
    #[error("no network descriptor configured for chain {0}")]
    UnsupportedNetwork(ChainId),
    #[error("invalid wallet response: {0}")]
    InvalidResponse(String),
    #[error("wallet did not answer in time")]
    Timeout,
    #[error(transparent)]
    Transport(ProviderError),
}

impl From<ProviderError> for SessionError {
    fn from(err: ProviderError) -> Self {
        if err.is_user_rejected() {
            SessionError::Rejected
        } else if err.is_request_pending() {
            SessionError::RequestPending
        } else {
            SessionError::Transport(err)
        }
    }
}

pub type SessionResult<T> = Result<T, SessionError>;

/// Which request of the switch negotiation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchStage {
    Switch,
    Add,
}

impl std::fmt::Display for SwitchStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            SwitchStage::Switch => "switch to",
            SwitchStage::Add => "add",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("{stage} chain {chain_id} failed: {source}")]
pub struct SwitchError {
    pub chain_id: ChainId,
    pub stage: SwitchStage,
    #[source]
    pub source: SessionError,
}

impl SwitchError {
    pub fn new(chain_id: ChainId, stage: SwitchStage, source: SessionError) -> Self {
        Self { chain_id, stage, source }
    }
}
