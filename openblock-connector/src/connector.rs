//! # Connector Framework Contract
//!
//! [`Connector`] is the uniform request surface every wallet connector offers, and
//! [`ConnectorBase`] is the shared half that turns provider activity into
//! [`ConnectorEvent`]s for the framework's [`ConnectorListener`].

use crate::{
    error::Result,
    events::{ChainId, ConnectorEvent, ConnectorUpdate},
    listener::ConnectorListener,
    provider::Provider,
};
use async_trait::async_trait;
use std::rc::Rc;
use tokio::sync::mpsc::{self, error::TrySendError};

/// The request surface of a wallet connector.
#[async_trait(?Send)]
pub trait Connector {
    /// Connects to the wallet and starts forwarding its events.
    async fn activate(&self) -> Result<ConnectorUpdate>;

    async fn get_provider(&self) -> Option<Rc<dyn Provider>>;

    async fn get_chain_id(&self) -> Result<Option<ChainId>>;

    async fn get_account(&self) -> Result<Option<String>>;

    /// Stops forwarding wallet events.
    fn deactivate(&self);

    /// Whether the wallet already exposes an account without prompting.
    async fn is_authorized(&self) -> bool;
}

/// The emitting side shared by a connector and the event handlers it registers.
#[derive(Debug, Clone)]
pub struct ConnectorBase {
    event_tx: mpsc::Sender<ConnectorEvent>,
}

impl ConnectorBase {
    /// Creates the base and the listener that receives its events.
    pub fn new(channel_capacity: usize) -> (Self, ConnectorListener) {
        let (event_tx, event_rx) = mpsc::channel(channel_capacity.max(1));
        (Self { event_tx }, ConnectorListener::new(event_rx))
    }

    pub fn emit_update(&self, update: ConnectorUpdate) {
        self.emit(ConnectorEvent::Update(update));
    }

    pub fn emit_deactivate(&self) {
        self.emit(ConnectorEvent::Deactivate);
    }

    // Provider callbacks are synchronous, so emission never waits for the listener.
    fn emit(&self, event: ConnectorEvent) {
        match self.event_tx.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => {
                tracing::warn!("Connector event buffer is full, dropping {:?}", event);
            }
            Err(TrySendError::Closed(_)) => {
                tracing::debug!("Connector listener dropped, event discarded");
            }
        }
    }
}
