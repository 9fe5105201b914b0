//! Carbon listener handle
//!
//! [`CarbonListener`] owns a bound TCP socket and the task accepting on it.
//! It exposes the counters, lets the metric deconstructor be swapped while
//! running and shuts the accept loop down on [`CarbonListener::close`].

mod accept;
mod builder;

pub use accept::ListenerState;
pub use builder::CarbonListenerBuilder;

use std::net::SocketAddr;
use std::sync::Arc;

use arc_swap::ArcSwap;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tracing::info;

use crate::config::ListenerConfig;
use crate::constants::listener::PROTOCOL;
use crate::datapoint::Datapoint;
use crate::deconstructor::MetricDeconstructor;
use crate::error::{ConfigError, ListenerError};
use crate::metrics::{ListenerMetrics, MetricsSnapshot};
use crate::sink::DatapointSink;

use accept::SharedState;

/// A running Carbon plaintext listener
///
/// Dropping the handle signals the accept loop to stop but does not wait for
/// it. Use [`close`](Self::close) to be sure the port is released.
pub struct CarbonListener {
    name: String,
    local_addr: SocketAddr,
    metrics: ListenerMetrics,
    deconstructor: Arc<ArcSwap<MetricDeconstructor>>,
    state: Arc<SharedState>,
    shutdown: watch::Sender<bool>,
    accept_task: Mutex<Option<JoinHandle<()>>>,
}

impl CarbonListener {
    /// Validate `config`, bind and start accepting, delivering to `sink`
    ///
    /// # Errors
    /// See [`CarbonListenerBuilder::build`].
    pub fn load(sink: &dyn DatapointSink, config: &ListenerConfig) -> Result<Self, ListenerError> {
        CarbonListenerBuilder::new(config.clone()).build(sink)
    }

    /// Start a builder for `config`
    #[must_use]
    pub fn builder(config: ListenerConfig) -> CarbonListenerBuilder {
        CarbonListenerBuilder::new(config)
    }

    /// Address actually bound, with the OS-assigned port when 0 was requested
    #[must_use]
    #[inline]
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    #[must_use]
    #[inline]
    pub fn protocol(&self) -> &'static str {
        PROTOCOL
    }

    #[must_use]
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Cumulative counters as datapoints
    ///
    /// Always the same four series in the same order, each tagged with
    /// `listener=<name>`.
    #[must_use]
    pub fn stats(&self) -> Vec<Datapoint> {
        self.metrics.snapshot().to_datapoints(&self.name)
    }

    /// Snapshot of every counter, including the active connection gauge
    #[must_use]
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    #[must_use]
    pub fn active_connections(&self) -> usize {
        self.metrics.active_connections()
    }

    #[must_use]
    pub fn state(&self) -> ListenerState {
        self.state.get()
    }

    /// Deconstructor currently applied to new records
    #[must_use]
    pub fn deconstructor(&self) -> Arc<MetricDeconstructor> {
        self.deconstructor.load_full()
    }

    /// Swap the deconstructor for all sessions
    ///
    /// Each record sees either the old or the new strategy, never a mix.
    /// Records already being parsed finish with the old one.
    pub fn set_deconstructor(&self, deconstructor: MetricDeconstructor) {
        info!(
            "Listener {} switching metric deconstructor {} -> {}",
            self.name,
            self.deconstructor.load().name(),
            deconstructor.name()
        );
        self.deconstructor.store(Arc::new(deconstructor));
    }

    /// Resolve a deconstructor by selector and swap it in
    ///
    /// # Errors
    /// Returns the lookup error and leaves the current strategy in place.
    pub fn load_deconstructor(&self, name: &str, options: &str) -> Result<(), ConfigError> {
        let deconstructor = MetricDeconstructor::load(name, options)?;
        self.set_deconstructor(deconstructor);
        Ok(())
    }

    /// Stop accepting and release the listening socket
    ///
    /// Waits for the accept loop to exit. Open sessions keep running unless
    /// the listener was configured with `close_sessions_on_shutdown`. Calling
    /// `close` again returns `Ok(())` immediately.
    ///
    /// # Errors
    /// Returns [`ListenerError::AcceptLoop`] if the accept task panicked.
    pub async fn close(&self) -> Result<(), ListenerError> {
        let Some(accept_task) = self.accept_task.lock().await.take() else {
            return Ok(());
        };

        info!("Closing listener {} on {}", self.name, self.local_addr);
        self.state.begin_closing();
        self.shutdown.send_replace(true);
        accept_task.await?;
        Ok(())
    }
}

impl Drop for CarbonListener {
    fn drop(&mut self) {
        self.shutdown.send_replace(true);
    }
}

impl std::fmt::Debug for CarbonListener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CarbonListener")
            .field("name", &self.name)
            .field("local_addr", &self.local_addr)
            .field("state", &self.state.get())
            .finish_non_exhaustive()
    }
}
