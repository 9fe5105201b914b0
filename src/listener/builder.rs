//! Builder for [`CarbonListener`]
//!
//! The builder is where a listener is validated, bound and started. Every
//! fallible step runs before the accept task is spawned, so a failed build
//! leaves no task or socket behind.

use std::sync::Arc;

use arc_swap::ArcSwap;
use tokio::net::TcpListener;
use tokio::runtime::Handle;
use tokio::sync::{Mutex, watch};
use tracing::info;

use super::CarbonListener;
use super::accept::{AcceptLoop, SharedState};
use crate::config::ListenerConfig;
use crate::error::ListenerError;
use crate::metrics::ListenerMetrics;
use crate::session::{ReaderFactory, buffered_reader_factory};
use crate::sink::DatapointSink;

/// Builder for constructing a [`CarbonListener`] with optional overrides
///
/// # Examples
///
/// ```no_run
/// # #[tokio::main]
/// # async fn main() -> anyhow::Result<()> {
/// use carbon_listener::{CarbonListenerBuilder, ChannelSink, ListenerConfig};
///
/// let (sink, _datapoints) = ChannelSink::new("carbon", 1024);
/// let config = ListenerConfig::new("127.0.0.1:2003").with_metric_deconstructor("commakeys", "");
/// let listener = CarbonListenerBuilder::new(config).build(&sink)?;
/// println!("listening on {}", listener.local_addr());
/// listener.close().await?;
/// # Ok(())
/// # }
/// ```
pub struct CarbonListenerBuilder {
    config: ListenerConfig,
    reader_factory: Option<ReaderFactory>,
}

impl CarbonListenerBuilder {
    #[must_use]
    pub fn new(config: ListenerConfig) -> Self {
        Self {
            config,
            reader_factory: None,
        }
    }

    /// Replace how each accepted socket is turned into a record reader
    ///
    /// Defaults to a buffered reader using the configured idle timeout.
    #[must_use]
    pub fn with_reader_factory(mut self, factory: ReaderFactory) -> Self {
        self.reader_factory = Some(factory);
        self
    }

    /// Validate, bind and start accepting
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    /// - [`ListenerError::Configuration`] for an invalid config or unknown deconstructor
    /// - [`ListenerError::Runtime`] outside a tokio runtime
    /// - [`ListenerError::Bind`] if the address is invalid or unavailable
    pub fn build(self, sink: &dyn DatapointSink) -> Result<CarbonListener, ListenerError> {
        let config = self.config;
        config.validate()?;
        let deconstructor = config.resolve_deconstructor()?;
        let runtime = Handle::try_current()?;

        let listener = bind(&config.listen_addr)?;
        let local_addr = listener.local_addr().map_err(|source| ListenerError::Bind {
            addr: config.listen_addr.clone(),
            source,
        })?;

        info!(
            "Carbon listener {} bound to {} (deconstructor: {}, sink: {})",
            config.name,
            local_addr,
            deconstructor,
            sink.name()
        );

        let metrics = ListenerMetrics::new();
        let deconstructor = Arc::new(ArcSwap::from_pointee(deconstructor));
        let state = Arc::new(SharedState::new());
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let reader_factory = self
            .reader_factory
            .unwrap_or_else(|| buffered_reader_factory(config.connection_timeout));

        let accept_loop = AcceptLoop {
            name: config.name.clone(),
            listener,
            deadline: config.accept_deadline(),
            metrics: metrics.clone(),
            deconstructor: deconstructor.clone(),
            sink: sink.datapoints(),
            reader_factory,
            close_sessions: config.close_sessions_on_shutdown,
            shutdown: shutdown_rx,
            state: state.clone(),
        };
        let accept_task = runtime.spawn(accept_loop.run());

        Ok(CarbonListener {
            name: config.name,
            local_addr,
            metrics,
            deconstructor,
            state,
            shutdown: shutdown_tx,
            accept_task: Mutex::new(Some(accept_task)),
        })
    }
}

/// Bind synchronously so address errors reach the caller
fn bind(addr: &str) -> Result<TcpListener, ListenerError> {
    let bind_error = |source| ListenerError::Bind {
        addr: addr.to_string(),
        source,
    };

    let std_listener = std::net::TcpListener::bind(addr).map_err(bind_error)?;
    std_listener.set_nonblocking(true).map_err(bind_error)?;
    TcpListener::from_std(std_listener).map_err(bind_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;
    use crate::sink::ChannelSink;

    #[test]
    fn test_build_outside_runtime_fails() {
        let (sink, _rx) = ChannelSink::new("test", 4);
        let result = CarbonListenerBuilder::new(ListenerConfig::new("127.0.0.1:0")).build(&sink);
        assert!(matches!(result, Err(ListenerError::Runtime(_))));
    }

    #[tokio::test]
    async fn test_config_checked_before_bind() {
        let (sink, _rx) = ChannelSink::new("test", 4);
        let config = ListenerConfig::new("127.0.0.1:999999").with_metric_deconstructor("nope", "");
        let result = CarbonListenerBuilder::new(config).build(&sink);
        assert!(matches!(
            result,
            Err(ListenerError::Configuration(
                ConfigError::UnknownDeconstructor(_)
            ))
        ));
    }

    #[tokio::test]
    async fn test_bad_port_is_bind_error() {
        let (sink, _rx) = ChannelSink::new("test", 4);
        let result = CarbonListenerBuilder::new(ListenerConfig::new("127.0.0.1:999999")).build(&sink);
        match result {
            Err(ListenerError::Bind { addr, .. }) => assert_eq!(addr, "127.0.0.1:999999"),
            Err(other) => panic!("Expected bind error, got {}", other),
            Ok(_) => panic!("Expected bind error, got a listener"),
        }
    }

    #[tokio::test]
    async fn test_build_and_close() {
        let (sink, _rx) = ChannelSink::new("test", 4);
        let listener = CarbonListenerBuilder::new(ListenerConfig::new("127.0.0.1:0"))
            .build(&sink)
            .unwrap();
        assert_ne!(listener.local_addr().port(), 0);
        listener.close().await.unwrap();
    }
}
