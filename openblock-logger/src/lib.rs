//! Logging setup shared by applications embedding the openblock connector.
//!
//! The connector itself only emits `tracing` events; whoever hosts it decides
//! where they go by calling [`init`] once with a [`LogConfig`].

pub mod logging;

pub use logging::{init, LogConfig, LogFormat, LogOutput};
