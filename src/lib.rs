//! launchpad-wallet: wallet session manager for the token-launch front-end.
//!
//! # Architecture
//!
//! ```text
//! SessionManager (entry point)
//!   │
//!   ├── Session (provider, signer, account, chain_id)
//!   │
//!   ├── Notifier → Notice (not installed / rejected / switch / add failures)
//!   │
//!   └── TransportSource → WalletTransport
//!         ├── MemoryWallet   (scripted, tests + --simulate)
//!         ├── WsTransport    (native: JSON-RPC over WebSocket)
//!         └── InjectedTransport (wasm: window.ethereum)
//! ```
//!
//! # Operations
//!
//! | Operation | Method | Result |
//! |-----------|--------|--------|
//! | initialize | `manager.initialize()` | session from authorized accounts |
//! | connect | `manager.connect()` | prompt, then initialize |
//! | switch | `manager.switch_network(target, testnet)` | `bool` |
//! | current | `manager.current()` | snapshot |
//!
//! # Features
//!
//! - `native` - tokio, WebSocket transport, tracing-subscriber, CLI
//! - `wasm` - browser bindings (`WasmSession`) over `window.ethereum`
//!
//! # Usage
//!
//! ```ignore
//! use launchpad_wallet::{NetworkTarget, SessionConfig, SessionManager, TracingNotifier};
//!
//! let manager = SessionManager::new(transport, TracingNotifier, SessionConfig::default());
//! let session = manager.connect().await;
//! if session.is_connected() {
//!     manager.switch_network(NetworkTarget::polygon(), true).await;
//! }
//! ```

// =============================================================================
// Shared modules (compile everywhere)
// =============================================================================
pub mod core;
pub mod session;
pub mod transport;

// =============================================================================
// Native-only modules
// =============================================================================
#[cfg(feature = "native")]
pub mod logging;

// =============================================================================
// WASM-only modules (browser, wasm-bindgen)
// =============================================================================
#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
pub mod wasm;

// =============================================================================
// Re-exports
// =============================================================================
pub use self::core::{Address, ChainId, NativeCurrency, NetworkDescriptor, NetworkTarget};
pub use session::{
    ConfigError, Notice, Notifier, OverlapPolicy, Phase, RecordingNotifier, Session, SessionConfig, SessionError, SessionManager,
    Signer, SwitchError, SwitchOutcome, SwitchStage, TracingNotifier,
};
pub use transport::{MemoryWallet, ProviderError, Transport, TransportSource, WalletTransport};

#[cfg(feature = "native")]
pub use transport::WsTransport;

#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
pub use wasm::{InjectedTransport, WasmSession};
