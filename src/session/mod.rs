//! Connection session
//!
//! One session per accepted socket. The session pulls records through its
//! [`RecordReader`], parses each one with the listener's current
//! deconstructor and forwards the datapoints to the sink in read order.

pub mod reader;


pub use reader::{
    BufferedRecordReader, ReadOutcome, ReaderFactory, RecordReader, buffered_reader_factory,
};

use std::net::SocketAddr;
use std::sync::Arc;

use arc_swap::ArcSwap;
use tokio::sync::{mpsc, watch};
use tracing::{debug, warn};

use crate::datapoint::Datapoint;
use crate::deconstructor::MetricDeconstructor;
use crate::error::ReadError;
use crate::metrics::ListenerMetrics;
use crate::protocol::{RECORD_DELIMITER, parse_record, strip_line_ending};

/// Why a session stopped
#[derive(Debug)]
pub enum SessionEnd {
    /// The reader finished, cleanly or not
    ReaderClosed(ReadError),
    /// The sink dropped its receiver
    SinkClosed,
    /// The listener shut down and sessions were asked to stop
    Shutdown,
}

/// Reads Carbon records from one client
pub struct CarbonSession {
    reader: Box<dyn RecordReader>,
    records: RecordHandler,
    shutdown: Option<watch::Receiver<bool>>,
}

/// Parse-and-forward half of a session, shared by reference across awaits
struct RecordHandler {
    peer: SocketAddr,
    metrics: ListenerMetrics,
    deconstructor: Arc<ArcSwap<MetricDeconstructor>>,
    sink: mpsc::Sender<Datapoint>,
}

impl CarbonSession {
    pub fn new(
        reader: Box<dyn RecordReader>,
        peer: SocketAddr,
        metrics: ListenerMetrics,
        deconstructor: Arc<ArcSwap<MetricDeconstructor>>,
        sink: mpsc::Sender<Datapoint>,
    ) -> Self {
        Self {
            reader,
            records: RecordHandler {
                peer,
                metrics,
                deconstructor,
                sink,
            },
            shutdown: None,
        }
    }

    /// Stop at the next read boundary once `shutdown` turns true
    #[must_use]
    pub fn with_shutdown(mut self, shutdown: watch::Receiver<bool>) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    #[must_use]
    pub fn peer(&self) -> SocketAddr {
        self.records.peer
    }

    /// Run until the reader closes, the sink goes away or shutdown is signalled
    ///
    /// The reader, and with it the socket, is dropped on return and the
    /// active connection gauge is decremented.
    pub async fn run(mut self) -> SessionEnd {
        let peer = self.peer();
        debug!("Session started for {}", peer);
        let end = self.read_loop().await;

        match &end {
            SessionEnd::ReaderClosed(cause) => log_reader_closed(peer, cause),
            SessionEnd::SinkClosed => warn!("Sink closed, dropping session for {}", peer),
            SessionEnd::Shutdown => debug!("Session for {} stopped by shutdown", peer),
        }

        let Self { reader, records, .. } = self;
        drop(reader);
        records.metrics.connection_closed();
        end
    }

    async fn read_loop(&mut self) -> SessionEnd {
        loop {
            let outcome = match self.shutdown.as_mut() {
                Some(shutdown) => tokio::select! {
                    biased;
                    _ = shutdown.wait_for(|stop| *stop) => return SessionEnd::Shutdown,
                    outcome = self.reader.read_record(RECORD_DELIMITER) => outcome,
                },
                None => self.reader.read_record(RECORD_DELIMITER).await,
            };

            match outcome {
                ReadOutcome::Record(record) => {
                    if !self.records.handle(&record).await {
                        return SessionEnd::SinkClosed;
                    }
                }
                ReadOutcome::Closed { trailing, cause } => {
                    // Whatever arrived before the failure is still a record
                    if !trailing.is_empty() && !self.records.handle(&trailing).await {
                        return SessionEnd::SinkClosed;
                    }
                    return SessionEnd::ReaderClosed(cause);
                }
            }
        }
    }
}

impl RecordHandler {
    /// Parse and forward one record. Returns false once the sink is gone.
    async fn handle(&self, record: &[u8]) -> bool {
        self.metrics.record_read();

        let parsed = {
            let deconstructor = self.deconstructor.load();
            parse_record(strip_line_ending(record), &deconstructor)
        };

        match parsed {
            Ok(datapoint) => {
                if self.sink.send(datapoint).await.is_err() {
                    return false;
                }
                self.metrics.datapoint_emitted();
            }
            Err(e) => {
                self.metrics.record_invalid();
                debug!(
                    "Invalid record from {}: {} ({:?})",
                    self.peer,
                    e,
                    String::from_utf8_lossy(record)
                );
            }
        }
        true
    }
}

fn log_reader_closed(peer: SocketAddr, cause: &ReadError) {
    if cause.log_level() == tracing::Level::DEBUG {
        debug!("Client {} closed: {}", peer, cause);
    } else {
        warn!("Read from {} failed: {}", peer, cause);
    }
}
