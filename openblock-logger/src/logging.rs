use anyhow::{Context, Result};
use serde::Deserialize;
use std::{fs::File, str::FromStr, sync::Arc};
use tracing::Level;
use tracing_subscriber::{
    filter::LevelFilter,
    fmt::{self, writer::MakeWriterExt},
    prelude::*,
    Registry,
};

#[derive(Debug, Deserialize, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    #[default]
    Plain,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    #[default]
    Stdout,
    File,
}

/// Logging configuration, usually read from the `[log]` table of a host's config file.
#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct LogConfig {
    /// Log level, e.g. "info", "debug", "trace". Unknown values fall back to "info".
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
    #[serde(default)]
    pub output: LogOutput,
    /// Path to the log file, required if output is "file".
    #[serde(default)]
    pub file_path: Option<String>,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: LogFormat::Plain,
            output: LogOutput::Stdout,
            file_path: None,
        }
    }
}

impl LogConfig {
    /// The level the subscriber will filter at.
    pub fn max_level(&self) -> Level {
        Level::from_str(&self.level).unwrap_or(Level::INFO)
    }
}

/// Installs the global `tracing` subscriber described by `config`.
///
/// Fails if a global subscriber is already installed or the log file cannot be created.
pub fn init(config: &LogConfig) -> Result<()> {
    let log_level = config.max_level();
    let level_filter = LevelFilter::from_level(log_level);
    let subscriber = Registry::default().with(level_filter);

    match config.output {
        LogOutput::File => {
            let file_path = config.file_path.as_deref().ok_or_else(|| {
                anyhow::anyhow!("Log output is 'file' but 'file_path' is not specified")
            })?;
            let log_file = File::create(file_path)
                .with_context(|| format!("Failed to create log file '{}'", file_path))?;
            let file_writer = Arc::new(log_file).with_max_level(log_level);

            match config.format {
                LogFormat::Json => subscriber
                    .with(fmt::layer().with_writer(file_writer).json())
                    .try_init()?,
                LogFormat::Plain => subscriber
                    .with(fmt::layer().with_writer(file_writer).with_ansi(false))
                    .try_init()?,
            }
        }
        LogOutput::Stdout => {
            let stdout_writer = std::io::stdout.with_max_level(log_level);
            match config.format {
                LogFormat::Json => subscriber
                    .with(fmt::layer().with_writer(stdout_writer).json())
                    .try_init()?,
                LogFormat::Plain => subscriber
                    .with(fmt::layer().with_writer(stdout_writer).pretty())
                    .try_init()?,
            }
        }
    };

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_level_falls_back_to_info() {
        let config = LogConfig {
            level: "chatty".to_string(),
            ..LogConfig::default()
        };
        assert_eq!(config.max_level(), Level::INFO);

        let config = LogConfig {
            level: "debug".to_string(),
            ..LogConfig::default()
        };
        assert_eq!(config.max_level(), Level::DEBUG);
    }

    #[test]
    fn file_output_requires_a_path() {
        let config = LogConfig {
            output: LogOutput::File,
            ..LogConfig::default()
        };
        let err = init(&config).unwrap_err();
        assert!(err.to_string().contains("file_path"));
    }

    #[test]
    fn file_output_writes_events() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("connector.log");
        let config = LogConfig {
            level: "debug".to_string(),
            format: LogFormat::Json,
            output: LogOutput::File,
            file_path: Some(path.to_string_lossy().into_owned()),
        };

        init(&config).unwrap();
        tracing::warn!("stc_accounts was unsuccessful");

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("stc_accounts was unsuccessful"));
        assert!(written.contains("WARN"));
    }
}
