//! Carbon plaintext metrics listener
//!
//! Accepts `name value timestamp` lines over TCP, parses them into
//! [`Datapoint`]s and hands them to a [`DatapointSink`]. Metric names can be
//! split into a base name and dimensions by a swappable
//! [`MetricDeconstructor`].
//!
//! ```no_run
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! use carbon_listener::{CarbonListener, ChannelSink, ListenerConfig};
//!
//! let (sink, mut datapoints) = ChannelSink::new("carbon", 1024);
//! let listener = CarbonListener::load(&sink, &ListenerConfig::new("127.0.0.1:2003"))?;
//!
//! if let Some(dp) = datapoints.recv().await {
//!     println!("{}", dp);
//! }
//! listener.close().await?;
//! # Ok(())
//! # }
//! ```

pub mod args;
pub mod config;
pub mod constants;
pub mod datapoint;
pub mod deconstructor;
pub mod error;
pub mod listener;
pub mod logging;
pub mod metrics;
pub mod protocol;
pub mod runtime;
pub mod session;
pub mod sink;
pub mod types;

pub use config::{
    Config, ConfigSource, ListenerConfig, LoggingConfig, SinkConfig, create_default_config,
    load_config, load_config_with_fallback,
};
pub use datapoint::{Datapoint, Value};
pub use deconstructor::{Deconstruct, DeconstructedName, MetricDeconstructor};
pub use error::{ConfigError, DeconstructError, ListenerError, ParseError, ReadError};
pub use listener::{CarbonListener, CarbonListenerBuilder, ListenerState};
pub use metrics::{ListenerMetrics, MetricsSnapshot};
pub use session::{ReadOutcome, ReaderFactory, RecordReader};
pub use sink::{ChannelSink, DatapointSink};
