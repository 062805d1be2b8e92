//! # Connector Listener
//!
//! The receiving half of a connector's event channel. The connector framework holds
//! one `ConnectorListener` per connector and drains it to learn about account, chain
//! and connection changes.

use crate::events::ConnectorEvent;
use tokio::sync::mpsc::{self, error::TryRecvError};

#[derive(Debug)]
pub struct ConnectorListener {
    event_rx: mpsc::Receiver<ConnectorEvent>,
}

impl ConnectorListener {
    pub(crate) fn new(event_rx: mpsc::Receiver<ConnectorEvent>) -> Self {
        Self { event_rx }
    }

    /// Receives the next event. Returns `None` once the connector is dropped.
    pub async fn next_event(&mut self) -> Option<ConnectorEvent> {
        self.event_rx.recv().await
    }

    /// Receives an already queued event without waiting.
    pub fn try_next_event(&mut self) -> Option<ConnectorEvent> {
        match self.event_rx.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    /// Drains every queued event.
    pub fn drain(&mut self) -> Vec<ConnectorEvent> {
        std::iter::from_fn(|| self.try_next_event()).collect()
    }
}
