//! Configuration type definitions
//!
//! This module contains all the core configuration structures used by the listener.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::defaults;
use crate::constants::timeout::ACCEPT_DEADLINE;
use crate::types::{option_millis_serde, option_secs_serde};

/// Main configuration file
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct Config {
    /// Listener settings
    #[serde(default)]
    pub listener: ListenerConfig,
    /// Hand-off channel settings
    #[serde(default)]
    pub sink: SinkConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Settings for one Carbon listener
///
/// Immutable once handed to the loader.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ListenerConfig {
    /// Name used in logs and as the `listener` dimension on stats
    pub name: String,
    /// `host:port` to bind
    pub listen_addr: String,
    /// Upper bound on one accept wait (default 1s)
    #[serde(
        rename = "server_accept_deadline_ms",
        with = "option_millis_serde",
        skip_serializing_if = "Option::is_none"
    )]
    pub server_accept_deadline: Option<Duration>,
    /// Idle read timeout per connection (default: none)
    #[serde(
        rename = "connection_timeout_secs",
        with = "option_secs_serde",
        skip_serializing_if = "Option::is_none"
    )]
    pub connection_timeout: Option<Duration>,
    /// Deconstructor selector (default: identity)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metric_deconstructor: Option<String>,
    /// Strategy-specific option string
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metric_deconstructor_options: Option<String>,
    /// Stop open sessions at their next read when the listener closes
    pub close_sessions_on_shutdown: bool,
}

impl ListenerConfig {
    /// Config for `listen_addr` with everything else defaulted
    #[must_use]
    pub fn new(listen_addr: impl Into<String>) -> Self {
        Self {
            listen_addr: listen_addr.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    #[must_use]
    pub fn with_metric_deconstructor(
        mut self,
        name: impl Into<String>,
        options: impl Into<String>,
    ) -> Self {
        self.metric_deconstructor = Some(name.into());
        self.metric_deconstructor_options = Some(options.into());
        self
    }

    #[must_use]
    pub fn with_accept_deadline(mut self, deadline: Duration) -> Self {
        self.server_accept_deadline = Some(deadline);
        self
    }

    #[must_use]
    pub fn with_connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn with_close_sessions_on_shutdown(mut self, close: bool) -> Self {
        self.close_sessions_on_shutdown = close;
        self
    }

    /// Accept deadline in effect, falling back to the default
    #[must_use]
    pub fn accept_deadline(&self) -> Duration {
        self.server_accept_deadline.unwrap_or(ACCEPT_DEADLINE)
    }

    /// Deconstructor selector and options, empty when unset
    #[must_use]
    pub fn deconstructor_selector(&self) -> (&str, &str) {
        (
            self.metric_deconstructor.as_deref().unwrap_or(""),
            self.metric_deconstructor_options.as_deref().unwrap_or(""),
        )
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            name: defaults::listener_name(),
            listen_addr: defaults::listen_addr(),
            server_accept_deadline: None,
            connection_timeout: None,
            metric_deconstructor: None,
            metric_deconstructor_options: None,
            close_sessions_on_shutdown: false,
        }
    }
}

/// Settings for the channel datapoints are handed off on
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SinkConfig {
    #[serde(default = "super::defaults::sink_name")]
    pub name: String,
    /// Datapoints buffered before sessions wait on the consumer
    #[serde(default = "super::defaults::sink_capacity")]
    pub capacity: usize,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            name: defaults::sink_name(),
            capacity: defaults::sink_capacity(),
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct LoggingConfig {
    /// Also write logs to this file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}
