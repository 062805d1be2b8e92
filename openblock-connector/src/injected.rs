//! # Injected Connector
//!
//! [`InjectedConnector`] adapts the provider a Starcoin wallet injects into the page
//! to the [`Connector`] contract. Account lookups walk a fixed chain of request
//! methods, taking the first one that produces an address, and the provider's
//! `chainChanged`, `networkChanged`, `accountsChanged` and `close` events are
//! forwarded as [`ConnectorEvent`](crate::events::ConnectorEvent)s.
//!
//! The provider is resolved through the [`ProviderLocator`] on every call and is
//! never cached.

use crate::{
    config::ConnectorConfig,
    connector::{Connector, ConnectorBase},
    error::{ConnectorError, Result},
    events::{ChainId, ConnectorUpdate, EventHandler, ProviderEvent, ProviderEventKind},
    listener::ConnectorListener,
    provider::{Provider, ProviderError, ProviderLocator, RpcPayload},
    response::{account_count, first_account, parse_send_return},
};
use async_trait::async_trait;
use serde_json::Value;
use std::rc::Rc;

/// The four provider callbacks, created once so that `deactivate` can hand the
/// provider the same handlers `activate` registered.
#[derive(Debug, Clone)]
struct BoundHandlers {
    chain_changed: EventHandler,
    accounts_changed: EventHandler,
    close: EventHandler,
    network_changed: EventHandler,
}

impl BoundHandlers {
    fn new(base: &ConnectorBase, locator: &Rc<dyn ProviderLocator>) -> Self {
        let chain_changed = {
            let (base, locator) = (base.clone(), locator.clone());
            EventHandler::new(move |event| match event {
                ProviderEvent::ChainChanged(chain_id) => {
                    tracing::debug!("Handling 'chainChanged' event with payload {}", chain_id);
                    emit_chain_update(&base, locator.as_ref(), chain_id);
                }
                other => ignore_mismatched(ProviderEventKind::ChainChanged, &other),
            })
        };

        let accounts_changed = {
            let base = base.clone();
            EventHandler::new(move |event| match event {
                ProviderEvent::AccountsChanged(accounts) => {
                    tracing::debug!(
                        "Handling 'accountsChanged' event with payload {:?}",
                        accounts
                    );
                    match accounts.into_iter().next() {
                        None => base.emit_deactivate(),
                        Some(account) => base.emit_update(ConnectorUpdate {
                            account: Some(account),
                            ..Default::default()
                        }),
                    }
                }
                other => ignore_mismatched(ProviderEventKind::AccountsChanged, &other),
            })
        };

        let close = {
            let base = base.clone();
            EventHandler::new(move |event| match event {
                ProviderEvent::Close { code, reason } => {
                    tracing::debug!(
                        "Handling 'close' event with payload {} {:?}",
                        code,
                        reason
                    );
                    base.emit_deactivate();
                }
                other => ignore_mismatched(ProviderEventKind::Close, &other),
            })
        };

        let network_changed = {
            let (base, locator) = (base.clone(), locator.clone());
            EventHandler::new(move |event| match event {
                ProviderEvent::NetworkChanged(network_id) => {
                    tracing::debug!(
                        "Handling 'networkChanged' event with payload {}",
                        network_id
                    );
                    emit_chain_update(&base, locator.as_ref(), network_id);
                }
                other => ignore_mismatched(ProviderEventKind::NetworkChanged, &other),
            })
        };

        Self {
            chain_changed,
            accounts_changed,
            close,
            network_changed,
        }
    }

    fn iter(&self) -> [(ProviderEventKind, &EventHandler); 4] {
        [
            (ProviderEventKind::ChainChanged, &self.chain_changed),
            (ProviderEventKind::AccountsChanged, &self.accounts_changed),
            (ProviderEventKind::Close, &self.close),
            (ProviderEventKind::NetworkChanged, &self.network_changed),
        ]
    }
}

fn emit_chain_update(base: &ConnectorBase, locator: &dyn ProviderLocator, chain_id: ChainId) {
    base.emit_update(ConnectorUpdate {
        provider: locator.locate(),
        chain_id: Some(chain_id),
        account: None,
    });
}

fn ignore_mismatched(expected: ProviderEventKind, event: &ProviderEvent) {
    tracing::debug!(
        "Ignoring '{}' payload delivered to the '{}' handler",
        event.kind(),
        expected
    );
}

/// Keeps the value of a best-effort provider call, logging and discarding its failure.
fn recover<T>(
    outcome: std::result::Result<T, ProviderError>,
    attempted: &str,
    fallback: &str,
) -> Option<T> {
    match outcome {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(
                "{} was unsuccessful ({}), falling back to {}",
                attempted,
                e,
                fallback
            );
            None
        }
    }
}

/// A [`Connector`] for the wallet provider injected into the page.
pub struct InjectedConnector {
    base: ConnectorBase,
    config: ConnectorConfig,
    locator: Rc<dyn ProviderLocator>,
    handlers: BoundHandlers,
}

impl InjectedConnector {
    /// Creates a connector resolving its provider through `locator`, together with
    /// the listener that receives its events.
    pub fn new(
        config: ConnectorConfig,
        locator: Rc<dyn ProviderLocator>,
    ) -> (Self, ConnectorListener) {
        let (base, listener) = ConnectorBase::new(config.channels.listener_event_buffer);
        let handlers = BoundHandlers::new(&base, &locator);
        let connector = Self {
            base,
            config,
            locator,
            handlers,
        };
        (connector, listener)
    }

    /// Creates a connector bound to `window[config.provider.global_name]`.
    #[cfg(all(feature = "browser", target_arch = "wasm32"))]
    pub fn from_window(config: ConnectorConfig) -> (Self, ConnectorListener) {
        let locator = crate::browser::WindowLocator::new(config.provider.global_name.clone());
        Self::new(config, Rc::new(locator))
    }

    pub fn base(&self) -> &ConnectorBase {
        &self.base
    }

    pub fn config(&self) -> &ConnectorConfig {
        &self.config
    }

    fn require_provider(&self) -> Result<Rc<dyn Provider>> {
        self.locator
            .locate()
            .ok_or_else(|| ConnectorError::NoProvider {
                global: self.config.provider.global_name.clone(),
            })
    }

    fn accounts_payload(&self) -> RpcPayload {
        RpcPayload::new(self.config.methods.accounts.as_str())
    }
}

fn first_enabled_account(enabled: Option<Value>) -> Option<String> {
    enabled
        .map(parse_send_return)
        .as_ref()
        .and_then(first_account)
}

#[async_trait(?Send)]
impl Connector for InjectedConnector {
    async fn activate(&self) -> Result<ConnectorUpdate> {
        let provider = self.require_provider()?;

        if provider.supports_events() {
            for (kind, handler) in self.handlers.iter() {
                provider.on(kind, handler.clone());
            }
        }

        if provider.is_star_mask() {
            provider.set_auto_refresh_on_network_change(false);
        }

        let request_accounts = &self.config.methods.request_accounts;
        let mut account = match provider.send(request_accounts).await {
            Ok(sent) => first_account(&parse_send_return(sent)),
            Err(e) if e.code == Some(self.config.user_rejected_code) => {
                return Err(ConnectorError::UserRejectedRequest);
            }
            Err(e) => {
                tracing::warn!(
                    "{} was unsuccessful ({}), falling back to enable",
                    request_accounts,
                    e
                );
                None
            }
        };

        // Some providers grant access through `enable` without answering the request above.
        if account.is_none() {
            account = first_enabled_account(provider.enable().await?);
        }

        tracing::info!("Injected connector activated, account: {:?}", account);
        Ok(ConnectorUpdate {
            provider: Some(provider),
            chain_id: None,
            account,
        })
    }

    async fn get_provider(&self) -> Option<Rc<dyn Provider>> {
        self.locator.locate()
    }

    async fn get_chain_id(&self) -> Result<Option<ChainId>> {
        let provider = self.require_provider()?;
        let chain_id = provider
            .chain_id()
            .filter(|id| !id.is_falsy())
            .or_else(|| provider.network_version());
        Ok(chain_id)
    }

    async fn get_account(&self) -> Result<Option<String>> {
        let provider = self.require_provider()?;
        let accounts = &self.config.methods.accounts;

        let mut account = recover(provider.send(accounts).await, accounts, "enable")
            .and_then(|sent| first_account(&parse_send_return(sent)));

        if account.is_none() {
            let fallback = format!("legacy {}", accounts);
            account = recover(provider.enable().await, "enable", &fallback)
                .and_then(first_enabled_account);
        }

        // Last resort: the legacy request form, whose failure is not recovered.
        if account.is_none() {
            let sent = provider.send_legacy(&self.accounts_payload())?;
            account = first_account(&parse_send_return(sent));
        }

        Ok(account)
    }

    fn deactivate(&self) {
        let Some(provider) = self.locator.locate() else {
            return;
        };
        if !provider.supports_remove_listener() {
            return;
        }
        for (kind, handler) in self.handlers.iter() {
            provider.remove_listener(kind, handler);
        }
        tracing::info!("Injected connector deactivated");
    }

    async fn is_authorized(&self) -> bool {
        let Some(provider) = self.locator.locate() else {
            return false;
        };
        match provider.send(&self.config.methods.accounts).await {
            Ok(sent) => account_count(&parse_send_return(sent)) > 0,
            Err(e) => {
                tracing::debug!("Authorization check failed: {}", e);
                false
            }
        }
    }
}
