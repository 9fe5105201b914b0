//! Configuration validation
//!
//! Checks run before a listener binds, so a bad config never leaves a socket
//! or task behind.

use anyhow::Result;

use super::types::{Config, ListenerConfig, SinkConfig};
use crate::deconstructor::MetricDeconstructor;
use crate::error::ConfigError;

impl ListenerConfig {
    /// Validate the listener settings that do not need the network
    ///
    /// The listen address is checked when binding, where the OS has the
    /// final say on what resolves.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::EmptyName);
        }
        if self.server_accept_deadline.is_some_and(|d| d.is_zero()) {
            return Err(ConfigError::ZeroDuration {
                field: "server_accept_deadline_ms",
            });
        }
        if self.connection_timeout.is_some_and(|d| d.is_zero()) {
            return Err(ConfigError::ZeroDuration {
                field: "connection_timeout_secs",
            });
        }
        Ok(())
    }

    /// Resolve the configured deconstructor
    pub fn resolve_deconstructor(&self) -> Result<MetricDeconstructor, ConfigError> {
        let (name, options) = self.deconstructor_selector();
        MetricDeconstructor::load(name, options)
    }
}

impl SinkConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::EmptyName);
        }
        if self.capacity == 0 {
            return Err(ConfigError::ZeroSinkCapacity);
        }
        Ok(())
    }
}

impl Config {
    /// Validate configuration for correctness
    ///
    /// Covers the listener settings, the deconstructor selector and options,
    /// and the sink.
    pub fn validate(&self) -> Result<()> {
        self.listener.validate()?;
        self.listener.resolve_deconstructor()?;
        self.sink.validate()?;

        if let Some(file) = &self.logging.file
            && file.trim().is_empty()
        {
            return Err(anyhow::anyhow!("Log file path must not be empty"));
        }

        Ok(())
    }
}
