//! Test helpers for integration tests
//!
//! This module provides reusable test utilities to reduce duplication
//! in integration tests.

#![allow(dead_code)]

use std::io;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use carbon_listener::session::BufferedRecordReader;
use carbon_listener::{
    CarbonListener, ChannelSink, Datapoint, ListenerConfig, ReadError, ReadOutcome,
    ReaderFactory, RecordReader,
};
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::sync::mpsc;

/// How long to wait for asynchronous effects before failing a test
pub const WAIT: Duration = Duration::from_secs(5);

/// Listener config on an ephemeral loopback port with a short accept deadline
pub fn test_config() -> ListenerConfig {
    ListenerConfig::new("127.0.0.1:0")
        .with_name("test")
        .with_accept_deadline(Duration::from_millis(50))
}

/// Start a listener delivering into a fresh channel sink
pub fn start_listener(config: &ListenerConfig) -> (CarbonListener, mpsc::Receiver<Datapoint>) {
    let (sink, rx) = ChannelSink::new("test", 1024);
    let listener = CarbonListener::load(&sink, config).expect("listener should start");
    (listener, rx)
}

/// Start a listener whose readers come from `factory`
pub fn start_listener_with_factory(
    config: &ListenerConfig,
    factory: ReaderFactory,
) -> (CarbonListener, mpsc::Receiver<Datapoint>) {
    let (sink, rx) = ChannelSink::new("test", 1024);
    let listener = CarbonListener::builder(config.clone())
        .with_reader_factory(factory)
        .build(&sink)
        .expect("listener should start");
    (listener, rx)
}

/// Connect, write `payload`, and close the write half
pub async fn send_payload(addr: SocketAddr, payload: &[u8]) {
    let mut stream = TcpStream::connect(addr).await.expect("connect");
    stream.write_all(payload).await.expect("write");
    stream.shutdown().await.expect("shutdown");
}

/// Receive the next datapoint or fail after [`WAIT`]
pub async fn recv_datapoint(rx: &mut mpsc::Receiver<Datapoint>) -> Datapoint {
    tokio::time::timeout(WAIT, rx.recv())
        .await
        .expect("timed out waiting for datapoint")
        .expect("sink closed")
}

/// Assert that no datapoint arrives within `quiet`
pub async fn assert_no_datapoint(rx: &mut mpsc::Receiver<Datapoint>, quiet: Duration) {
    if let Ok(Some(dp)) = tokio::time::timeout(quiet, rx.recv()).await {
        panic!("unexpected datapoint: {}", dp);
    }
}

/// Poll `condition` until it holds or [`WAIT`] passes
pub async fn eventually(what: &str, condition: impl Fn() -> bool) {
    let deadline = tokio::time::Instant::now() + WAIT;
    while !condition() {
        assert!(
            tokio::time::Instant::now() < deadline,
            "timed out waiting for {}",
            what
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

/// Stat value by counter name
pub fn stat(listener: &CarbonListener, name: &str) -> i64 {
    listener
        .stats()
        .iter()
        .find(|dp| dp.metric() == name)
        .and_then(|dp| dp.value().as_i64())
        .unwrap_or_else(|| panic!("missing stat {}", name))
}

/// What an injected reader returns instead of reading the socket
#[derive(Debug, Clone)]
pub enum Fault {
    /// The read fails without returning any bytes
    Error,
    /// The read returns these bytes together with end of stream
    DataThenEof(Vec<u8>),
}

/// Reader factory whose readers can be told to fail
///
/// While a fault is injected every read on every reader returns it. After
/// [`reset`](Self::reset) reads go to the socket again.
#[derive(Debug, Clone, Default)]
pub struct FaultInjector {
    fault: Arc<Mutex<Option<Fault>>>,
}

impl FaultInjector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inject(&self, fault: Fault) {
        *self.fault.lock().unwrap() = Some(fault);
    }

    pub fn reset(&self) {
        *self.fault.lock().unwrap() = None;
    }

    pub fn factory(&self) -> ReaderFactory {
        let fault = self.fault.clone();
        Arc::new(move |stream: TcpStream| -> Box<dyn RecordReader> {
            Box::new(FaultyReader {
                inner: BufferedRecordReader::new(stream, None),
                fault: fault.clone(),
            })
        })
    }
}

struct FaultyReader {
    inner: BufferedRecordReader<TcpStream>,
    fault: Arc<Mutex<Option<Fault>>>,
}

#[async_trait]
impl RecordReader for FaultyReader {
    async fn read_record(&mut self, delimiter: u8) -> ReadOutcome {
        let fault = self.fault.lock().unwrap().clone();
        match fault {
            Some(Fault::Error) => {
                ReadOutcome::closed(ReadError::Io(io::Error::other("injected read failure")))
            }
            Some(Fault::DataThenEof(bytes)) => ReadOutcome::Closed {
                trailing: bytes,
                cause: ReadError::Eof,
            },
            None => self.inner.read_record(delimiter).await,
        }
    }
}
