//! # Injected Provider Abstraction
//!
//! The wallet provider lives outside this crate: in a browser it is the object the
//! wallet extension injects into the page. The [`Provider`] trait captures the
//! surface the connector relies on, and [`ProviderLocator`] captures how a provider
//! is found, so the connector can be driven by the real browser global or by an
//! in-process double.

use crate::events::{ChainId, EventHandler, ProviderEventKind};
use async_trait::async_trait;
use serde_json::Value;
use std::rc::Rc;
use thiserror::Error;

/// The error code a provider reports when the user declines a request.
pub const USER_REJECTED_CODE: i64 = 4001;

/// A failed provider call, carrying the provider's error code when it supplied one.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("provider request failed: {message}")]
pub struct ProviderError {
    pub code: Option<i64>,
    pub message: String,
}

impl ProviderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }

    pub fn with_code(code: i64, message: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            message: message.into(),
        }
    }
}

/// The request object of the legacy, synchronous-shaped `send` calling convention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpcPayload {
    pub method: String,
}

impl RpcPayload {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
        }
    }
}

/// An injected wallet provider.
///
/// Responses are returned as received; callers normalize them with
/// [`crate::response::parse_send_return`]. Providers are single-threaded like the
/// page that hosts them, so neither the trait nor its futures are `Send`.
#[async_trait(?Send)]
pub trait Provider {
    /// `send(method)`: the promise-returning request form.
    async fn send(&self, method: &str) -> Result<Value, ProviderError>;

    /// `send({ method })`: the legacy form that answers synchronously.
    fn send_legacy(&self, payload: &RpcPayload) -> Result<Value, ProviderError>;

    /// Asks the wallet to expose accounts. Some providers resolve with nothing.
    async fn enable(&self) -> Result<Option<Value>, ProviderError>;

    /// Whether the provider exposes `on`.
    fn supports_events(&self) -> bool {
        true
    }

    fn on(&self, event: ProviderEventKind, handler: EventHandler);

    /// Whether the provider exposes `removeListener`.
    fn supports_remove_listener(&self) -> bool {
        true
    }

    /// Removes the registration made with `handler` (or a clone of it). Unknown
    /// handlers are ignored.
    fn remove_listener(&self, event: ProviderEventKind, handler: &EventHandler);

    fn chain_id(&self) -> Option<ChainId> {
        None
    }

    fn network_version(&self) -> Option<ChainId> {
        None
    }

    /// The StarMask vendor flag.
    fn is_star_mask(&self) -> bool {
        false
    }

    fn set_auto_refresh_on_network_change(&self, _enabled: bool) {}
}

/// Resolves the current provider, if one is reachable.
///
/// Called afresh by every connector operation: a provider may appear or disappear
/// between calls.
pub trait ProviderLocator {
    fn locate(&self) -> Option<Rc<dyn Provider>>;
}

impl<F> ProviderLocator for F
where
    F: Fn() -> Option<Rc<dyn Provider>>,
{
    fn locate(&self) -> Option<Rc<dyn Provider>> {
        self()
    }
}
