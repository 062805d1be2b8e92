#![allow(dead_code)]

use async_trait::async_trait;
use openblock_connector::{
    events::{ChainId, ConnectorEvent, EventHandler, ProviderEvent, ProviderEventKind},
    provider::{Provider, ProviderError, ProviderLocator, RpcPayload},
};
use openblock_logger::LogConfig;
use serde_json::Value;
use std::{
    cell::{Cell, RefCell},
    collections::HashMap,
    rc::Rc,
};

/// Routes connector logs to stdout so failing tests show the fallback warnings.
pub fn init_logging() {
    let _ = openblock_logger::init(&LogConfig {
        level: "debug".to_string(),
        ..LogConfig::default()
    });
}

/// A scriptable in-process stand-in for an injected wallet provider.
///
/// Unscripted `send` methods fail with a "method not found" error, `enable` resolves
/// with nothing and the legacy form fails.
pub struct MockProvider {
    send_results: RefCell<HashMap<String, Result<Value, ProviderError>>>,
    legacy_result: RefCell<Result<Value, ProviderError>>,
    enable_result: RefCell<Result<Option<Value>, ProviderError>>,
    calls: RefCell<Vec<String>>,
    listeners: RefCell<Vec<(ProviderEventKind, EventHandler)>>,
    pub events_supported: Cell<bool>,
    pub remove_supported: Cell<bool>,
    pub chain_id: RefCell<Option<ChainId>>,
    pub network_version: RefCell<Option<ChainId>>,
    pub star_mask: Cell<bool>,
    pub auto_refresh: Cell<Option<bool>>,
}

impl MockProvider {
    pub fn new() -> Rc<Self> {
        Rc::new(Self {
            send_results: RefCell::default(),
            legacy_result: RefCell::new(Err(ProviderError::new("legacy send unsupported"))),
            enable_result: RefCell::new(Ok(None)),
            calls: RefCell::default(),
            listeners: RefCell::default(),
            events_supported: Cell::new(true),
            remove_supported: Cell::new(true),
            chain_id: RefCell::default(),
            network_version: RefCell::default(),
            star_mask: Cell::new(false),
            auto_refresh: Cell::new(None),
        })
    }

    pub fn answer(&self, method: &str, result: Result<Value, ProviderError>) {
        self.send_results
            .borrow_mut()
            .insert(method.to_string(), result);
    }

    pub fn answer_legacy(&self, result: Result<Value, ProviderError>) {
        *self.legacy_result.borrow_mut() = result;
    }

    pub fn answer_enable(&self, result: Result<Option<Value>, ProviderError>) {
        *self.enable_result.borrow_mut() = result;
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub fn listener_count(&self, kind: ProviderEventKind) -> usize {
        self.listeners
            .borrow()
            .iter()
            .filter(|(k, _)| *k == kind)
            .count()
    }

    pub fn has_listener(&self, kind: ProviderEventKind, handler: &EventHandler) -> bool {
        self.listeners
            .borrow()
            .iter()
            .any(|(k, h)| *k == kind && h == handler)
    }

    /// Delivers `event` to every handler registered for its kind.
    pub fn emit(&self, event: ProviderEvent) {
        let handlers: Vec<EventHandler> = self
            .listeners
            .borrow()
            .iter()
            .filter(|(k, _)| *k == event.kind())
            .map(|(_, h)| h.clone())
            .collect();
        for handler in handlers {
            handler.call(event.clone());
        }
    }

    fn record(&self, call: String) {
        self.calls.borrow_mut().push(call);
    }
}

#[async_trait(?Send)]
impl Provider for MockProvider {
    async fn send(&self, method: &str) -> Result<Value, ProviderError> {
        self.record(format!("send:{}", method));
        self.send_results
            .borrow()
            .get(method)
            .cloned()
            .unwrap_or_else(|| Err(ProviderError::with_code(-32601, "method not found")))
    }

    fn send_legacy(&self, payload: &RpcPayload) -> Result<Value, ProviderError> {
        self.record(format!("send_legacy:{}", payload.method));
        self.legacy_result.borrow().clone()
    }

    async fn enable(&self) -> Result<Option<Value>, ProviderError> {
        self.record("enable".to_string());
        self.enable_result.borrow().clone()
    }

    fn supports_events(&self) -> bool {
        self.events_supported.get()
    }

    fn on(&self, event: ProviderEventKind, handler: EventHandler) {
        self.listeners.borrow_mut().push((event, handler));
    }

    fn supports_remove_listener(&self) -> bool {
        self.remove_supported.get()
    }

    fn remove_listener(&self, event: ProviderEventKind, handler: &EventHandler) {
        let mut listeners = self.listeners.borrow_mut();
        if let Some(pos) = listeners
            .iter()
            .position(|(k, h)| *k == event && h == handler)
        {
            listeners.remove(pos);
        }
    }

    fn chain_id(&self) -> Option<ChainId> {
        self.chain_id.borrow().clone()
    }

    fn network_version(&self) -> Option<ChainId> {
        self.network_version.borrow().clone()
    }

    fn is_star_mask(&self) -> bool {
        self.star_mask.get()
    }

    fn set_auto_refresh_on_network_change(&self, enabled: bool) {
        self.auto_refresh.set(Some(enabled));
    }
}

/// A locator that always finds `provider`.
pub fn locator_for(provider: &Rc<MockProvider>) -> Rc<dyn ProviderLocator> {
    let provider = provider.clone();
    Rc::new(move || Some(provider.clone() as Rc<dyn Provider>))
}

/// A locator that never finds a provider.
pub fn empty_locator() -> Rc<dyn ProviderLocator> {
    Rc::new(|| None::<Rc<dyn Provider>>)
}

/// A provider slot tests can fill or empty between connector calls.
pub type ProviderSlot = Rc<RefCell<Option<Rc<MockProvider>>>>;

pub fn slot_locator(slot: &ProviderSlot) -> Rc<dyn ProviderLocator> {
    let slot = slot.clone();
    Rc::new(move || {
        slot.borrow()
            .clone()
            .map(|provider| provider as Rc<dyn Provider>)
    })
}

pub fn updates(events: &[ConnectorEvent]) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, ConnectorEvent::Update(_)))
        .count()
}

pub fn deactivations(events: &[ConnectorEvent]) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, ConnectorEvent::Deactivate))
        .count()
}
