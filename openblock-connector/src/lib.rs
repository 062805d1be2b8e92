//! A connector for the wallet provider Starcoin browser wallets inject into a web page.
//!
//! The crate lets an application find the injected provider, ask it for account
//! access, and follow its account, chain and connection changes through a uniform
//! event stream.
//!
//! # Key Components
//!
//! *   [`injected::InjectedConnector`]: The connector. Implements the
//!     [`connector::Connector`] request surface and forwards provider events.
//! *   [`provider`]: The [`provider::Provider`] trait the connector drives and the
//!     [`provider::ProviderLocator`] it resolves providers through.
//! *   [`listener::ConnectorListener`]: The stream of normalized
//!     [`events::ConnectorEvent`]s a connector produces.
//! *   `browser` (feature `browser`, `wasm32` only): the `window.obstarcoin` binding.
//!
//! ```no_run
//! # use std::rc::Rc;
//! # use openblock_connector::{config::ConnectorConfig, connector::Connector,
//! #     injected::InjectedConnector, provider::Provider};
//! # async fn run(locate: fn() -> Option<Rc<dyn Provider>>) -> Result<(), openblock_connector::ConnectorError> {
//! let (connector, mut listener) = InjectedConnector::new(ConnectorConfig::default(), Rc::new(locate));
//! let update = connector.activate().await?;
//! println!("connected as {:?}", update.account);
//! while let Some(event) = listener.next_event().await {
//!     println!("{:?}", event);
//! }
//! # Ok(()) }
//! ```

/// Defines configuration structures for the connector.
pub mod config;
/// The connector request surface and the shared event-emitting base.
pub mod connector;
pub mod error;
/// Provider events, chain ids and the normalized connector events.
pub mod events;
pub mod injected;
pub mod listener;
pub mod provider;
/// Normalization of the provider's response shapes.
pub mod response;

#[cfg(all(feature = "browser", target_arch = "wasm32"))]
pub mod browser;

pub use connector::Connector;
pub use error::ConnectorError;
pub use injected::InjectedConnector;
