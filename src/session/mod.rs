//! Session - the wallet/network session manager
//!
//! # Architecture
//!
//! ```text
//! UI (React pages via wasm, CLI)
//!     │
//!     ▼
//! SessionManager ──── Notifier (toasts / tracing / recording)
//!     │
//!     ├── RwLock<Session>        replace on success, reset on connect failure
//!     │
//!     └── TransportSource ──▶ WalletTransport::request(method, params)
//! ```
//!
//! # Operations
//!
//! | Operation | Prompts | Stores | Failure |
//! |-----------|---------|--------|---------|
//! | `initialize` | no | on ≥1 account | empty session, logged |
//! | `connect` | `eth_requestAccounts` | always (empty on failure) | empty session + notice |
//! | `switch_network` | switch / add chain | nothing | `false` + notice |
//! | `current` | no | - | - |
//!
//! Each has a `try_` twin returning the tagged failure reason.
//!
//! The manager does not watch `accountsChanged` / `chainChanged`; a session
//! goes stale if the user changes account or network inside the wallet
//! until the next `initialize` or `connect`.

mod config;
mod error;
mod manager;
mod notify;
mod state;

pub use config::{ConfigError, OverlapPolicy, SessionConfig};
pub use error::{SessionError, SessionResult, SwitchError, SwitchStage};
pub use manager::{Phase, SessionManager, SwitchOutcome};
pub use notify::{Notice, Notifier, Recorded, RecordingNotifier, Severity, TracingNotifier};
pub use state::{Session, Signer};
