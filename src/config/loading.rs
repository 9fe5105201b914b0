//! Configuration loading from files and environment variables
//!
//! This module handles loading configuration from TOML files and environment variables,
//! with environment variables taking precedence for container deployments.

use std::path::Path;

use anyhow::Result;

use super::types::Config;
use crate::constants::env;

/// Where a loaded configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Read from this file (environment overrides may apply on top)
    File(String),
    /// No file; built from defaults plus environment variables
    Environment,
    /// No file and no environment variables
    Default,
}

impl ConfigSource {
    /// Human-readable description for startup logs
    #[must_use]
    pub fn description(&self) -> String {
        match self {
            Self::File(path) => format!("config file '{}'", path),
            Self::Environment => "environment variables".to_string(),
            Self::Default => "built-in defaults".to_string(),
        }
    }
}

/// Apply `CARBON_*` overrides using `lookup` to read variables
///
/// Supported variables:
/// - `CARBON_LISTEN_ADDR` - listen address
/// - `CARBON_LISTENER_NAME` - listener name
/// - `CARBON_METRIC_DECONSTRUCTOR` - deconstructor selector
/// - `CARBON_METRIC_DECONSTRUCTOR_OPTIONS` - deconstructor options
///
/// Returns the names of the variables that were applied.
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F) -> Vec<&'static str>
where
    F: Fn(&str) -> Option<String>,
{
    let mut applied = Vec::new();
    let listener = &mut config.listener;

    if let Some(addr) = lookup(env::LISTEN_ADDR) {
        listener.listen_addr = addr;
        applied.push(env::LISTEN_ADDR);
    }
    if let Some(name) = lookup(env::LISTENER_NAME) {
        listener.name = name;
        applied.push(env::LISTENER_NAME);
    }
    if let Some(selector) = lookup(env::METRIC_DECONSTRUCTOR) {
        listener.metric_deconstructor = Some(selector);
        applied.push(env::METRIC_DECONSTRUCTOR);
    }
    if let Some(options) = lookup(env::METRIC_DECONSTRUCTOR_OPTIONS) {
        listener.metric_deconstructor_options = Some(options);
        applied.push(env::METRIC_DECONSTRUCTOR_OPTIONS);
    }

    applied
}

fn process_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Check if any `CARBON_*` override is set in the process environment
#[must_use]
pub fn has_listener_env_vars() -> bool {
    [
        env::LISTEN_ADDR,
        env::LISTENER_NAME,
        env::METRIC_DECONSTRUCTOR,
        env::METRIC_DECONSTRUCTOR_OPTIONS,
    ]
    .into_iter()
    .any(|key| process_env(key).is_some())
}

/// Parse configuration text, apply overrides from `lookup` and validate
pub fn parse_config<F>(content: &str, origin: &str, lookup: F) -> Result<Config>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config: Config = toml::from_str(content)
        .map_err(|e| anyhow::anyhow!("Failed to parse config file '{}': {}", origin, e))?;

    let applied = apply_env_overrides(&mut config, lookup);
    if !applied.is_empty() {
        tracing::info!(
            "Applied environment overrides over config file: {}",
            applied.join(", ")
        );
    }

    config.validate()?;
    Ok(config)
}

/// Load configuration from a TOML file, with environment variable overrides
///
/// Environment variables take precedence over the file so containers can
/// change the listen address or deconstructor without editing it.
pub fn load_config(config_path: &str) -> Result<Config> {
    let config_content = std::fs::read_to_string(config_path)
        .map_err(|e| anyhow::anyhow!("Failed to read config file '{}': {}", config_path, e))?;

    parse_config(&config_content, config_path, process_env)
}

/// Build configuration from defaults and environment variables only
pub fn load_config_from_env() -> Result<Config> {
    let mut config = Config::default();
    apply_env_overrides(&mut config, process_env);
    config.validate()?;
    Ok(config)
}

/// Load configuration, falling back when the file does not exist
///
/// A file that exists but cannot be read or parsed is still an error.
pub fn load_config_with_fallback(config_path: &str) -> Result<(Config, ConfigSource)> {
    if Path::new(config_path).exists() {
        let config = load_config(config_path)?;
        return Ok((config, ConfigSource::File(config_path.to_string())));
    }

    if has_listener_env_vars() {
        tracing::info!(
            "Config file '{}' not found, using environment variables",
            config_path
        );
        return Ok((load_config_from_env()?, ConfigSource::Environment));
    }

    tracing::warn!(
        "Config file '{}' not found, using built-in defaults",
        config_path
    );
    let config = create_default_config();
    config.validate()?;
    Ok((config, ConfigSource::Default))
}

/// Create a default configuration for examples/testing
#[must_use]
pub fn create_default_config() -> Config {
    Config::default()
}
