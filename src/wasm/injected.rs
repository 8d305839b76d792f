//! InjectedTransport - `window.ethereum` behind the WalletTransport trait

use async_trait::async_trait;
use js_sys::{Function, Object, Promise, Reflect};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;

use crate::transport::{ProviderError, Transport, TransportResult, TransportSource, WalletTransport};

const INJECTION_KEY: &str = "ethereum";

pub struct InjectedTransport {
    name: String,
    ethereum: Object,
}

impl InjectedTransport {
    /// `None` when no extension has injected `window.ethereum`.
    pub fn detect() -> Option<Self> {
        let window = web_sys::window()?;
        let value = Reflect::get(&window, &JsValue::from_str(INJECTION_KEY)).ok()?;
        if value.is_undefined() || value.is_null() {
            return None;
        }
        let ethereum = value.dyn_into::<Object>().ok()?;
        let is_metamask = Reflect::get(&ethereum, &JsValue::from_str("isMetaMask"))
            .ok()
            .and_then(|v| v.as_bool())
            .unwrap_or(false);
        let name = if is_metamask { "MetaMask" } else { "injected" };
        Some(Self { name: name.into(), ethereum })
    }

    fn request_fn(&self) -> TransportResult<Function> {
        Reflect::get(&self.ethereum, &JsValue::from_str("request"))
            .ok()
            .and_then(|f| f.dyn_into::<Function>().ok())
            .ok_or_else(|| ProviderError::internal("window.ethereum.request is not a function"))
    }
}

fn to_js(value: &Value) -> TransportResult<JsValue> {
    let serializer = serde_wasm_bindgen::Serializer::json_compatible();
    value
        .serialize(&serializer)
        .map_err(|e| ProviderError::internal(format!("params: {e}")))
}

/// Wallet rejections are JS objects (often `Error` instances) carrying
/// `code`, `message` and optionally `data`.
fn provider_error(err: JsValue) -> ProviderError {
    let field = |name: &str| Reflect::get(&err, &JsValue::from_str(name)).ok().filter(|v| !v.is_undefined());
    let code = field("code").and_then(|v| v.as_f64()).map(|c| c as i64);
    let message = field("message")
        .and_then(|v| v.as_string())
        .unwrap_or_else(|| format!("{err:?}"));
    let data = field("data").and_then(|v| serde_wasm_bindgen::from_value::<Value>(v).ok());
    match code {
        Some(code) => ProviderError { code, message, data },
        None => ProviderError::internal(message),
    }
}

#[async_trait(?Send)]
impl WalletTransport for InjectedTransport {
    fn name(&self) -> &str { &self.name }

    async fn request(&self, method: &str, params: Value) -> TransportResult<Value> {
        let args = Object::new();
        Reflect::set(&args, &"method".into(), &JsValue::from_str(method))
            .map_err(|e| ProviderError::internal(format!("{e:?}")))?;
        if !params.is_null() {
            Reflect::set(&args, &"params".into(), &to_js(&params)?)
                .map_err(|e| ProviderError::internal(format!("{e:?}")))?;
        }

        let returned = self.request_fn()?.call1(&self.ethereum, &args).map_err(provider_error)?;
        let resolved = match returned.dyn_into::<Promise>() {
            Ok(promise) => JsFuture::from(promise).await.map_err(provider_error)?,
            Err(value) => value,
        };
        if resolved.is_undefined() || resolved.is_null() {
            return Ok(Value::Null);
        }
        serde_wasm_bindgen::from_value(resolved).map_err(|e| ProviderError::internal(format!("response: {e}")))
    }
}

/// Re-checks `window.ethereum` on every operation.
#[derive(Debug, Default, Clone, Copy)]
pub struct WindowSource;

impl TransportSource for WindowSource {
    fn detect(&self) -> Option<Transport> {
        InjectedTransport::detect().map(|t| Arc::new(t) as Transport)
    }
}
