//! Transport - the request/response seam to the user's wallet
//!
//! Every wallet speaks the same shape: `request({method, params})` resolving to
//! a JSON value or rejecting with an EIP-1193 error object `{code, message, data}`.
//!
//! # Implementations
//!
//! | Type | Feature | Backend |
//! |------|---------|---------|
//! | [`MemoryWallet`] | always | in-process scripted wallet |
//! | [`WsTransport`] | `native` | JSON-RPC 2.0 over WebSocket (dev nodes) |
//! | `wasm::InjectedTransport` | `wasm` | `window.ethereum` |

mod memory;
#[cfg(feature = "native")]
pub mod ws;

pub use memory::MemoryWallet;
#[cfg(feature = "native")]
pub use ws::WsTransport;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

use crate::core::methods::codes;

/// Send + Sync on native targets; no bound in the browser where JS handles are `!Send`.
#[cfg(not(target_arch = "wasm32"))]
pub trait MaybeSend: Send + Sync {}
#[cfg(not(target_arch = "wasm32"))]
impl<T: Send + Sync + ?Sized> MaybeSend for T {}

#[cfg(target_arch = "wasm32")]
pub trait MaybeSend {}
#[cfg(target_arch = "wasm32")]
impl<T: ?Sized> MaybeSend for T {}

/// EIP-1193 error object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
#[error("provider error {code}: {message}")]
pub struct ProviderError {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ProviderError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self { code, message: message.into(), data: None }
    }

    pub fn with_data(mut self, data: Value) -> Self { self.data = Some(data); self }

    pub fn user_rejected() -> Self { Self::new(codes::USER_REJECTED, "User rejected the request.") }
    pub fn unrecognized_chain(chain_hex: &str) -> Self {
        Self::new(codes::UNRECOGNIZED_CHAIN, format!("Unrecognized chain ID \"{chain_hex}\"."))
    }
    pub fn disconnected(message: impl Into<String>) -> Self { Self::new(codes::DISCONNECTED, message) }
    pub fn internal(message: impl Into<String>) -> Self { Self::new(codes::INTERNAL, message) }

    /// Parse whatever a wallet rejected with. Anything without a numeric
    /// `code` is treated as an internal error carrying the raw value.
    pub fn from_json(value: &Value) -> Self {
        let code = value.get("code").and_then(Value::as_i64);
        let message = value
            .get("message")
            .and_then(Value::as_str)
            .map(String::from)
            .unwrap_or_else(|| value.to_string());
        match code {
            Some(code) => Self { code, message, data: value.get("data").cloned().filter(|d| !d.is_null()) },
            None => Self::internal(message),
        }
    }

    pub fn is_user_rejected(&self) -> bool { self.code == codes::USER_REJECTED }
    pub fn is_request_pending(&self) -> bool { self.code == codes::REQUEST_PENDING }

    /// MetaMask mobile wraps the 4902 signal in `data.originalError.code`.
    pub fn is_unrecognized_chain(&self) -> bool {
        self.code == codes::UNRECOGNIZED_CHAIN
            || self
                .data
                .as_ref()
                .and_then(|d| d.get("originalError"))
                .and_then(|e| e.get("code"))
                .and_then(Value::as_i64)
                == Some(codes::UNRECOGNIZED_CHAIN)
    }
}

pub type TransportResult<T> = Result<T, ProviderError>;

/// A wallet reachable through `request(method, params)`.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait WalletTransport: MaybeSend {
    /// Human label for logs ("MetaMask", "ws://127.0.0.1:8545", ...)
    fn name(&self) -> &str;
    async fn request(&self, method: &str, params: Value) -> TransportResult<Value>;
}

/// Shared handle to a transport. This is the session's `provider`.
pub type Transport = Arc<dyn WalletTransport>;

/// Answers "is a wallet injected right now?". Asked on every operation so a
/// wallet installed after startup is picked up.
pub trait TransportSource: MaybeSend {
    fn detect(&self) -> Option<Transport>;
}

impl TransportSource for Option<Transport> {
    fn detect(&self) -> Option<Transport> { self.clone() }
}

impl TransportSource for Transport {
    fn detect(&self) -> Option<Transport> { Some(self.clone()) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_error_object() {
        let err = ProviderError::from_json(&json!({"code": 4001, "message": "User denied"}));
        assert!(err.is_user_rejected());
        assert_eq!(err.message, "User denied");
        assert!(err.data.is_none());
    }

    #[test]
    fn test_from_json_without_code() {
        let err = ProviderError::from_json(&json!("boom"));
        assert_eq!(err.code, codes::INTERNAL);
    }

    #[test]
    fn test_nested_unrecognized_chain() {
        let err = ProviderError::new(codes::INTERNAL, "wrapped")
            .with_data(json!({"originalError": {"code": 4902}}));
        assert!(err.is_unrecognized_chain());
        assert!(ProviderError::unrecognized_chain("0x13881").is_unrecognized_chain());
        assert!(!ProviderError::user_rejected().is_unrecognized_chain());
    }
}
