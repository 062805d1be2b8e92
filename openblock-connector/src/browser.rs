//! # Browser Binding
//!
//! [`WindowLocator`] reads the provider the wallet extension injected into
//! `window` and wraps it in an [`InjectedProvider`], which drives the JS object
//! through reflection. Only built for `wasm32` with the `browser` feature.

use crate::{
    events::{ChainId, EventHandler, ProviderEvent, ProviderEventKind},
    provider::{Provider, ProviderError, ProviderLocator, RpcPayload},
};
use async_trait::async_trait;
use js_sys::{Array, Function, Object, Promise, Reflect};
use serde_json::Value;
use std::{cell::RefCell, collections::HashMap, rc::Rc};
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

type JsListener = Closure<dyn FnMut(JsValue, JsValue)>;

/// JS functions handed to the provider's `on`, keyed by event and handler identity.
///
/// Shared by every `InjectedProvider` a locator hands out, so `removeListener`
/// receives the very function object `on` was given even though each connector
/// call resolves the provider anew.
type ListenerTable = Rc<RefCell<HashMap<(ProviderEventKind, usize), JsListener>>>;

/// Resolves `window[global_name]` on every call.
pub struct WindowLocator {
    global_name: String,
    listeners: ListenerTable,
}

impl WindowLocator {
    pub fn new(global_name: impl Into<String>) -> Self {
        Self {
            global_name: global_name.into(),
            listeners: Rc::default(),
        }
    }
}

impl ProviderLocator for WindowLocator {
    fn locate(&self) -> Option<Rc<dyn Provider>> {
        let window = web_sys::window()?;
        let object = Reflect::get(&window, &JsValue::from_str(&self.global_name)).ok()?;
        if object.is_undefined() || object.is_null() {
            return None;
        }
        Some(Rc::new(InjectedProvider {
            object,
            listeners: self.listeners.clone(),
        }))
    }
}

/// A provider object injected into the page.
pub struct InjectedProvider {
    object: JsValue,
    listeners: ListenerTable,
}

impl InjectedProvider {
    fn property(&self, name: &str) -> Option<JsValue> {
        Reflect::get(&self.object, &JsValue::from_str(name))
            .ok()
            .filter(|value| !value.is_undefined() && !value.is_null())
    }

    fn method(&self, name: &str) -> Option<Function> {
        self.property(name)?.dyn_into::<Function>().ok()
    }

    fn require_method(&self, name: &str) -> Result<Function, ProviderError> {
        self.method(name)
            .ok_or_else(|| ProviderError::new(format!("provider has no '{}' method", name)))
    }
}

/// Awaits `value` if it is a promise.
async fn settle(value: JsValue) -> Result<JsValue, ProviderError> {
    if value.is_instance_of::<Promise>() {
        JsFuture::from(value.unchecked_into::<Promise>())
            .await
            .map_err(to_provider_error)
    } else {
        Ok(value)
    }
}

fn to_json(value: JsValue) -> Result<Value, ProviderError> {
    serde_wasm_bindgen::from_value(value)
        .map_err(|e| ProviderError::new(format!("unreadable provider response: {}", e)))
}

fn to_provider_error(error: JsValue) -> ProviderError {
    let code = Reflect::get(&error, &JsValue::from_str("code"))
        .ok()
        .and_then(|code| code.as_f64())
        .map(|code| code as i64);
    let message = Reflect::get(&error, &JsValue::from_str("message"))
        .ok()
        .and_then(|message| message.as_string())
        .unwrap_or_else(|| format!("{:?}", error));
    ProviderError { code, message }
}

fn to_chain_id(value: &JsValue) -> Option<ChainId> {
    if let Some(n) = value.as_f64() {
        // Numbers that do not fit `u64` exactly are kept in their printed form.
        if n.fract() == 0.0 && (0.0..u64::MAX as f64).contains(&n) {
            return Some(ChainId::Number(n as u64));
        }
        return Some(ChainId::Text(n.to_string()));
    }
    value.as_string().map(ChainId::Text)
}

fn decode_event(kind: ProviderEventKind, first: JsValue, second: JsValue) -> Option<ProviderEvent> {
    match kind {
        ProviderEventKind::ChainChanged => to_chain_id(&first).map(ProviderEvent::ChainChanged),
        ProviderEventKind::NetworkChanged => {
            to_chain_id(&first).map(ProviderEvent::NetworkChanged)
        }
        ProviderEventKind::AccountsChanged => {
            let accounts = first.dyn_ref::<Array>()?;
            Some(ProviderEvent::AccountsChanged(
                accounts.iter().filter_map(|a| a.as_string()).collect(),
            ))
        }
        ProviderEventKind::Close => Some(ProviderEvent::Close {
            code: first.as_f64().map_or(0, |code| code as i64),
            reason: second.as_string().unwrap_or_default(),
        }),
    }
}

#[async_trait(?Send)]
impl Provider for InjectedProvider {
    async fn send(&self, method: &str) -> Result<Value, ProviderError> {
        let send = self.require_method("send")?;
        let returned = send
            .call1(&self.object, &JsValue::from_str(method))
            .map_err(to_provider_error)?;
        to_json(settle(returned).await?)
    }

    fn send_legacy(&self, payload: &RpcPayload) -> Result<Value, ProviderError> {
        let send = self.require_method("send")?;
        let request = Object::new();
        Reflect::set(
            &request,
            &JsValue::from_str("method"),
            &JsValue::from_str(&payload.method),
        )
        .map_err(to_provider_error)?;
        let returned = send
            .call1(&self.object, &request)
            .map_err(to_provider_error)?;
        // Providers without a synchronous send hand back a promise: no result.
        if returned.is_instance_of::<Promise>() {
            return Ok(Value::Null);
        }
        to_json(returned)
    }

    async fn enable(&self) -> Result<Option<Value>, ProviderError> {
        let enable = self.require_method("enable")?;
        let returned = enable.call0(&self.object).map_err(to_provider_error)?;
        let settled = settle(returned).await?;
        if settled.is_undefined() || settled.is_null() {
            return Ok(None);
        }
        to_json(settled).map(Some)
    }

    fn supports_events(&self) -> bool {
        self.method("on").is_some()
    }

    fn on(&self, event: ProviderEventKind, handler: EventHandler) {
        let Some(on) = self.method("on") else {
            return;
        };
        let function: Function = {
            let mut listeners = self.listeners.borrow_mut();
            let listener = listeners
                .entry((event, handler.id()))
                .or_insert_with(|| {
                    Closure::new(move |first: JsValue, second: JsValue| {
                        match decode_event(event, first, second) {
                            Some(payload) => handler.call(payload),
                            None => tracing::warn!("Malformed '{}' event payload", event),
                        }
                    })
                });
            listener.as_ref().unchecked_ref::<Function>().clone()
        };
        if let Err(e) = on.call2(&self.object, &JsValue::from_str(event.as_str()), &function) {
            tracing::warn!(
                "Subscribing to '{}' failed: {}",
                event,
                to_provider_error(e)
            );
        }
    }

    fn supports_remove_listener(&self) -> bool {
        self.method("removeListener").is_some()
    }

    fn remove_listener(&self, event: ProviderEventKind, handler: &EventHandler) {
        let Some(remove) = self.method("removeListener") else {
            return;
        };
        let Some(listener) = self.listeners.borrow_mut().remove(&(event, handler.id())) else {
            return;
        };
        let function = listener.as_ref().unchecked_ref::<Function>();
        if let Err(e) = remove.call2(&self.object, &JsValue::from_str(event.as_str()), function) {
            tracing::warn!(
                "Unsubscribing from '{}' failed: {}",
                event,
                to_provider_error(e)
            );
        }
    }

    fn chain_id(&self) -> Option<ChainId> {
        self.property("chainId").as_ref().and_then(to_chain_id)
    }

    fn network_version(&self) -> Option<ChainId> {
        self.property("networkVersion").as_ref().and_then(to_chain_id)
    }

    fn is_star_mask(&self) -> bool {
        self.property("isStarMask")
            .map_or(false, |flag| flag.is_truthy())
    }

    fn set_auto_refresh_on_network_change(&self, enabled: bool) {
        if let Err(e) = Reflect::set(
            &self.object,
            &JsValue::from_str("autoRefreshOnNetworkChange"),
            &JsValue::from_bool(enabled),
        ) {
            tracing::warn!(
                "Setting autoRefreshOnNetworkChange failed: {}",
                to_provider_error(e)
            );
        }
    }
}
