use crate::provider::ProviderError;
use thiserror::Error;

/// Errors surfaced by connector operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConnectorError {
    #[error("No Starcoin provider was found on window.{global}.")]
    NoProvider { global: String },

    #[error("The user rejected the request.")]
    UserRejectedRequest,

    #[error("Unrecovered provider error: {0}")]
    Provider(#[from] ProviderError),
}

pub type Result<T, E = ConnectorError> = std::result::Result<T, E>;
