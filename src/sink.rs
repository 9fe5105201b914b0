//! Downstream hand-off for parsed datapoints

use tokio::sync::mpsc;

use crate::datapoint::Datapoint;

/// Something that accepts datapoints from a listener
///
/// The listener clones the sender once at startup and shares it between all
/// of its sessions. Sends wait when the channel is full, so a slow consumer
/// pushes back on the connected clients.
pub trait DatapointSink: Send + Sync {
    /// Name used in logs
    fn name(&self) -> &str;

    /// Write side of the channel datapoints are delivered on
    fn datapoints(&self) -> mpsc::Sender<Datapoint>;
}

/// A sink backed by a bounded tokio channel
#[derive(Debug, Clone)]
pub struct ChannelSink {
    name: String,
    tx: mpsc::Sender<Datapoint>,
}

impl ChannelSink {
    /// Create a sink and the receiver that drains it
    ///
    /// # Panics
    /// Panics if `capacity` is 0
    #[must_use]
    pub fn new(name: impl Into<String>, capacity: usize) -> (Self, mpsc::Receiver<Datapoint>) {
        let (tx, rx) = mpsc::channel(capacity);
        (
            Self {
                name: name.into(),
                tx,
            },
            rx,
        )
    }

    /// Wrap an existing sender
    #[must_use]
    pub fn from_sender(name: impl Into<String>, tx: mpsc::Sender<Datapoint>) -> Self {
        Self {
            name: name.into(),
            tx,
        }
    }
}

impl DatapointSink for ChannelSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn datapoints(&self) -> mpsc::Sender<Datapoint> {
        self.tx.clone()
    }
}
