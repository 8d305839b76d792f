//! WASM module: the session manager inside the browser
//!
//! Architecture:
//! ```text
//! ┌─────────────────────────────────────────┐
//! │        WasmSession (JS API)             │
//! │  initialize, connect, switchNetwork,    │
//! │  current, signMessage, onNotice         │
//! └─────────────────┬───────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────┐
//! │           SessionManager                │
//! └─────────────────┬───────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────┐
//! │   WindowSource → InjectedTransport      │
//! │   window.ethereum.request(...)          │
//! └─────────────────────────────────────────┘
//! ```

mod injected;
mod session;

pub use injected::{InjectedTransport, WindowSource};
pub use session::WasmSession;

use wasm_bindgen::prelude::*;

/// Initialize WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Log to browser console
pub fn console_log(s: &str) {
    web_sys::console::log_1(&JsValue::from_str(s));
}

macro_rules! log {
    ($($t:tt)*) => {
        crate::wasm::console_log(&format!($($t)*))
    }
}

pub(crate) use log;
