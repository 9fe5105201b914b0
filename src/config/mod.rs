//! Configuration module
//!
//! This module handles all configuration types and loading
//! for the Carbon listener.

mod defaults;
mod loading;
mod types;
mod validation;

// Re-export public types
pub use loading::{
    ConfigSource, apply_env_overrides, create_default_config, has_listener_env_vars, load_config,
    load_config_from_env, load_config_with_fallback, parse_config,
};
pub use types::{Config, ListenerConfig, LoggingConfig, SinkConfig};

// Re-export default functions for use in tests and other modules
pub use defaults::{listen_addr, listener_name, sink_capacity, sink_name};
