#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::provider::Provider;
use std::{fmt, rc::Rc};

/// A chain identifier as reported by a provider: either a number or a string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum ChainId {
    Number(u64),
    Text(String),
}

impl ChainId {
    /// `0` and the empty string carry no chain information.
    pub fn is_falsy(&self) -> bool {
        match self {
            ChainId::Number(n) => *n == 0,
            ChainId::Text(s) => s.is_empty(),
        }
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainId::Number(n) => write!(f, "{}", n),
            ChainId::Text(s) => f.write_str(s),
        }
    }
}

impl From<u64> for ChainId {
    fn from(id: u64) -> Self {
        ChainId::Number(id)
    }
}

impl From<&str> for ChainId {
    fn from(id: &str) -> Self {
        ChainId::Text(id.to_string())
    }
}

/// The provider events the connector subscribes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderEventKind {
    ChainChanged,
    AccountsChanged,
    Close,
    NetworkChanged,
}

impl ProviderEventKind {
    pub const ALL: [ProviderEventKind; 4] = [
        ProviderEventKind::ChainChanged,
        ProviderEventKind::AccountsChanged,
        ProviderEventKind::Close,
        ProviderEventKind::NetworkChanged,
    ];

    /// The event name used on the provider's `on`/`removeListener` interface.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderEventKind::ChainChanged => "chainChanged",
            ProviderEventKind::AccountsChanged => "accountsChanged",
            ProviderEventKind::Close => "close",
            ProviderEventKind::NetworkChanged => "networkChanged",
        }
    }
}

impl fmt::Display for ProviderEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A payload emitted by the provider.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderEvent {
    ChainChanged(ChainId),
    AccountsChanged(Vec<String>),
    Close { code: i64, reason: String },
    NetworkChanged(ChainId),
}

impl ProviderEvent {
    pub fn kind(&self) -> ProviderEventKind {
        match self {
            ProviderEvent::ChainChanged(_) => ProviderEventKind::ChainChanged,
            ProviderEvent::AccountsChanged(_) => ProviderEventKind::AccountsChanged,
            ProviderEvent::Close { .. } => ProviderEventKind::Close,
            ProviderEvent::NetworkChanged(_) => ProviderEventKind::NetworkChanged,
        }
    }
}

/// A callback registered on a provider.
///
/// Clones share the same callback, and equality is identity: a provider removing
/// a listener must only drop the registration made with a clone of that handler.
#[derive(Clone)]
pub struct EventHandler(Rc<dyn Fn(ProviderEvent)>);

impl EventHandler {
    pub fn new(f: impl Fn(ProviderEvent) + 'static) -> Self {
        Self(Rc::new(f))
    }

    pub fn call(&self, event: ProviderEvent) {
        (self.0)(event)
    }

    /// A key that is stable for all clones of this handler and unique among live handlers.
    pub fn id(&self) -> usize {
        Rc::as_ptr(&self.0) as *const () as usize
    }
}

impl PartialEq for EventHandler {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for EventHandler {}

impl fmt::Debug for EventHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EventHandler({:#x})", self.id())
    }
}

/// A normalized state change reported to the connector framework.
///
/// Only the fields that changed are set.
#[derive(Clone, Default)]
pub struct ConnectorUpdate {
    pub provider: Option<Rc<dyn Provider>>,
    pub chain_id: Option<ChainId>,
    pub account: Option<String>,
}

impl fmt::Debug for ConnectorUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectorUpdate")
            .field("provider", &self.provider.as_ref().map(|_| "<provider>"))
            .field("chain_id", &self.chain_id)
            .field("account", &self.account)
            .finish()
    }
}

/// What the connector framework receives from a running connector.
#[derive(Debug, Clone)]
pub enum ConnectorEvent {
    Update(ConnectorUpdate),
    Deactivate,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn falsy_chain_ids() {
        assert!(ChainId::Number(0).is_falsy());
        assert!(ChainId::Text(String::new()).is_falsy());
        assert!(!ChainId::Number(1).is_falsy());
        assert!(!ChainId::from("0x1").is_falsy());
    }

    #[test]
    fn handler_equality_is_identity() {
        let hits = Rc::new(Cell::new(0));
        let counter = hits.clone();
        let handler = EventHandler::new(move |_| counter.set(counter.get() + 1));
        let same = handler.clone();
        let other = EventHandler::new(|_| {});

        assert_eq!(handler, same);
        assert_eq!(handler.id(), same.id());
        assert_ne!(handler, other);

        same.call(ProviderEvent::AccountsChanged(vec![]));
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn event_names() {
        let names: Vec<_> = ProviderEventKind::ALL.iter().map(|k| k.as_str()).collect();
        assert_eq!(
            names,
            ["chainChanged", "accountsChanged", "close", "networkChanged"]
        );
        assert_eq!(
            ProviderEvent::Close {
                code: 1000,
                reason: "bye".into()
            }
            .kind(),
            ProviderEventKind::Close
        );
    }
}
