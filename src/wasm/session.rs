//! WasmSession: the session manager as a JS object
//!
//! One instance per page; the React layer holds it and calls
//! `initialize` on load, `connect` from the connect button and
//! `switchNetwork` before any chain-specific form.

use js_sys::Function;
use serde::Serialize;
use serde_json::json;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;

use super::injected::WindowSource;
use super::log;
use crate::core::NetworkTarget;
use crate::session::{Notice, Notifier, Session, SessionConfig, SessionManager};

/// Forwards notices to a JS callback `(notice) => void`, or to the console
/// until one is registered.
#[derive(Clone, Default)]
struct JsNotifier {
    callback: Rc<RefCell<Option<Function>>>,
}

impl Notifier for JsNotifier {
    fn notify(&self, notice: &Notice) {
        let callback = self.callback.borrow();
        let Some(callback) = callback.as_ref() else {
            log!("[wallet] {}", notice.message());
            return;
        };
        let payload = json!({
            "notice": notice,
            "severity": notice.severity(),
            "message": notice.message(),
        });
        match to_js(&payload) {
            Ok(value) => {
                if let Err(e) = callback.call1(&JsValue::NULL, &value) {
                    log!("[wallet] notice callback threw: {:?}", e);
                }
            }
            Err(e) => log!("[wallet] notice encode failed: {:?}", e),
        }
    }
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    let serializer = serde_wasm_bindgen::Serializer::json_compatible();
    value.serialize(&serializer).map_err(|e| JsValue::from_str(&e.to_string()))
}

fn session_js(session: &Session) -> JsValue { to_js(session).unwrap_or(JsValue::NULL) }

#[wasm_bindgen]
pub struct WasmSession {
    manager: Rc<SessionManager>,
    notifier: JsNotifier,
}

#[wasm_bindgen]
impl WasmSession {
    /// Polygon mainnet / Mumbai, last-writer-wins.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self { Self::with_config(SessionConfig::default()) }

    /// Custom network pair, e.g. `WasmSession.forNetworks(1, 11155111)`.
    #[wasm_bindgen(js_name = "forNetworks")]
    pub fn for_networks(mainnet_id: u32, testnet_id: u32) -> Self {
        Self::with_config(SessionConfig::default().with_target(NetworkTarget::new(mainnet_id as u64, testnet_id as u64)))
    }

    fn with_config(config: SessionConfig) -> Self {
        let notifier = JsNotifier::default();
        let manager = SessionManager::new(WindowSource, notifier.clone(), config);
        Self { manager: Rc::new(manager), notifier }
    }

    /// Register `(notice) => void`; replaces any previous callback.
    #[wasm_bindgen(js_name = "onNotice")]
    pub fn on_notice(&self, callback: Function) {
        *self.notifier.callback.borrow_mut() = Some(callback);
    }

    #[wasm_bindgen]
    pub async fn initialize(&self) -> JsValue {
        let manager = self.manager.clone();
        session_js(&manager.initialize().await)
    }

    #[wasm_bindgen]
    pub async fn connect(&self) -> JsValue {
        let manager = self.manager.clone();
        session_js(&manager.connect().await)
    }

    /// Switch to the configured mainnet or testnet.
    #[wasm_bindgen(js_name = "switchNetwork")]
    pub async fn switch_network(&self, use_testnet: bool) -> bool {
        let manager = self.manager.clone();
        manager.switch_to_configured(use_testnet).await
    }

    #[wasm_bindgen(js_name = "switchNetworkTo")]
    pub async fn switch_network_to(&self, mainnet_id: u32, testnet_id: u32, use_testnet: bool) -> bool {
        let manager = self.manager.clone();
        manager
            .switch_network(NetworkTarget::new(mainnet_id as u64, testnet_id as u64), use_testnet)
            .await
    }

    /// Snapshot `{account, chainId, isConnected, provider}`.
    #[wasm_bindgen]
    pub fn current(&self) -> JsValue { session_js(&self.manager.current()) }

    #[wasm_bindgen(getter, js_name = "isConnected")]
    pub fn is_connected(&self) -> bool { self.manager.current().is_connected() }

    #[wasm_bindgen(js_name = "signMessage")]
    pub async fn sign_message(&self, message: String) -> Result<String, JsValue> {
        let session = self.manager.current();
        let signer = session
            .signer()
            .ok_or_else(|| JsValue::from_str("wallet not connected"))?;
        signer.sign_message(&message).await.map_err(|e| JsValue::from_str(&e.to_string()))
    }
}

impl Default for WasmSession {
    fn default() -> Self { Self::new() }
}
