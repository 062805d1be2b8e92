#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::provider::USER_REJECTED_CODE;

/// The top-level configuration for the `openblock-connector` library.
///
/// Every field has a default matching the StarMask/OpenBlock injected provider, so
/// `ConnectorConfig::default()` is a working configuration. Hosts that read a config
/// file deserialize it (feature `serde`) and hand it to the connector on construction.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub struct ConnectorConfig {
    #[cfg_attr(feature = "serde", serde(default))]
    pub provider: ProviderConfig,
    #[cfg_attr(feature = "serde", serde(default))]
    pub methods: Methods,
    /// The provider error code that means the user declined a request.
    #[cfg_attr(feature = "serde", serde(default = "default_user_rejected_code"))]
    pub user_rejected_code: i64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub channels: ChannelConfig,
}

/// Where the injected provider is looked up.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub struct ProviderConfig {
    /// The property of `window` holding the provider.
    pub global_name: String,
}

/// RPC method names sent to the provider.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub struct Methods {
    /// Prompts the user for account access.
    pub request_accounts: String,
    /// Lists accounts already exposed to the page.
    pub accounts: String,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub struct ChannelConfig {
    /// The buffer capacity of the channel feeding the `ConnectorListener`.
    pub listener_event_buffer: usize,
}

impl Default for ConnectorConfig {
    fn default() -> Self {
        Self {
            provider: ProviderConfig::default(),
            methods: Methods::default(),
            user_rejected_code: USER_REJECTED_CODE,
            channels: ChannelConfig::default(),
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            global_name: "obstarcoin".to_string(),
        }
    }
}

impl Default for Methods {
    fn default() -> Self {
        Self {
            request_accounts: "stc_requestAccounts".to_string(),
            accounts: "stc_accounts".to_string(),
        }
    }
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            listener_event_buffer: 128,
        }
    }
}

#[cfg(feature = "serde")]
fn default_user_rejected_code() -> i64 {
    USER_REJECTED_CODE
}

/// Loads the connector configuration from a TOML file.
///
/// Values can be overridden with `OPENBLOCK__`-prefixed environment variables,
/// e.g. `OPENBLOCK__PROVIDER__GLOBAL_NAME`. Env keys are snake case while the file
/// keys are kebab case, so the env source converts them before merging.
#[cfg(feature = "serde")]
pub fn load_config(path: &str) -> anyhow::Result<ConnectorConfig> {
    use anyhow::Context;

    let builder = config::Config::builder()
        .add_source(config::File::with_name(path))
        .add_source(
            config::Environment::with_prefix("OPENBLOCK")
                .separator("__")
                .convert_case(config::Case::Kebab),
        );

    let settings: ConnectorConfig = builder
        .build()
        .context(format!("Failed to build configuration from '{}'", path))?
        .try_deserialize()
        .context("Failed to deserialize configuration")?;

    Ok(settings)
}
