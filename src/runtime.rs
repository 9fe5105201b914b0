//! Tokio runtime configuration and common utilities for the binary
//!
//! This module provides:
//! - Testable runtime configuration and builder logic
//! - Background tasks the binary runs next to the listener
//! - Shutdown signal handling

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::{Config, ConfigSource};
use crate::datapoint::Datapoint;
use crate::deconstructor::MetricDeconstructor;
use crate::listener::CarbonListener;

/// Runtime configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Number of worker threads
    worker_threads: usize,
}

impl RuntimeConfig {
    /// Create runtime config from optional thread count
    ///
    /// If `threads` is None, defaults to 1 thread.
    /// If `threads` is Some(0), uses number of CPU cores.
    /// Single-threaded runtime is used if threads == 1.
    #[must_use]
    pub fn from_args(threads: Option<usize>) -> Self {
        let worker_threads = match threads {
            None => 1,
            Some(0) => std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(1),
            Some(n) => n,
        };

        Self { worker_threads }
    }

    /// Get number of worker threads
    #[must_use]
    pub const fn worker_threads(&self) -> usize {
        self.worker_threads
    }

    /// Check if single-threaded
    #[must_use]
    pub const fn is_single_threaded(&self) -> bool {
        self.worker_threads == 1
    }

    /// Build the tokio runtime
    ///
    /// Creates either a current-thread or multi-threaded runtime based on
    /// the configured worker thread count.
    ///
    /// # Errors
    /// Returns error if runtime creation fails
    pub fn build_runtime(self) -> Result<tokio::runtime::Runtime> {
        let rt = if self.is_single_threaded() {
            info!("Starting Carbon listener with single-threaded runtime");
            tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?
        } else {
            info!(
                "Starting Carbon listener with {} worker threads",
                self.worker_threads
            );
            tokio::runtime::Builder::new_multi_thread()
                .worker_threads(self.worker_threads)
                .enable_all()
                .build()?
        };

        Ok(rt)
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self::from_args(None)
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM on Unix)
///
/// If a handler cannot be installed, that signal source is ignored and the
/// other one still works.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Log where the configuration came from and what the listener will run
///
/// Called once logging is initialised, which itself depends on the config.
pub fn log_config(config: &Config, source: &ConfigSource) {
    info!("Loaded configuration from {}", source.description());

    let (deconstructor, options) = config.listener.deconstructor_selector();
    let deconstructor = if deconstructor.is_empty() {
        MetricDeconstructor::IDENTITY
    } else {
        deconstructor
    };
    if options.is_empty() {
        info!(
            "Listener {} on {} (deconstructor: {})",
            config.listener.name, config.listener.listen_addr, deconstructor
        );
    } else {
        info!(
            "Listener {} on {} (deconstructor: {} {})",
            config.listener.name, config.listener.listen_addr, deconstructor, options
        );
    }
}

/// Render the counters of a listener as one log line
#[must_use]
pub fn format_stats(listener: &CarbonListener) -> String {
    let snapshot = listener.metrics();
    let mut line = snapshot
        .counters()
        .iter()
        .map(|(name, value)| format!("{}={}", name, value))
        .collect::<Vec<_>>()
        .join(", ");
    line.push_str(&format!(", active_connections={}", snapshot.active_connections));
    line
}

/// Spawn background task to periodically log listener counters
pub fn spawn_stats_reporter(listener: &Arc<CarbonListener>, every: Duration) -> JoinHandle<()> {
    let listener = Arc::clone(listener);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        // First tick completes immediately
        interval.tick().await;

        loop {
            interval.tick().await;
            info!("Listener {} stats: {}", listener.name(), format_stats(&listener));
        }
    })
}

/// Spawn background task that drains datapoints into debug logs
///
/// Stands in for a real downstream consumer. Returns the number of
/// datapoints drained once every sender is gone.
pub fn spawn_datapoint_logger(mut datapoints: mpsc::Receiver<Datapoint>) -> JoinHandle<u64> {
    tokio::spawn(async move {
        let mut drained = 0u64;
        while let Some(datapoint) = datapoints.recv().await {
            debug!("datapoint: {}", datapoint);
            drained += 1;
        }
        drained
    })
}
