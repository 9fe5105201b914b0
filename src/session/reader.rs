//! Record read primitive used by sessions
//!
//! Sessions depend on [`RecordReader`] rather than on a socket, so tests can
//! substitute a reader that fails or returns partial data on demand.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::net::TcpStream;

use crate::constants::buffer::{READER_CAPACITY, RECORD_INITIAL};
use crate::error::ReadError;

/// Result of one read from a [`RecordReader`]
#[derive(Debug)]
pub enum ReadOutcome {
    /// A complete record, delimiter included
    Record(Vec<u8>),
    /// The reader is finished. `trailing` holds whatever bytes arrived
    /// before the failure and still need to be parsed.
    Closed { trailing: Vec<u8>, cause: ReadError },
}

impl ReadOutcome {
    /// A closed outcome with no leftover bytes
    #[must_use]
    pub fn closed(cause: ReadError) -> Self {
        Self::Closed {
            trailing: Vec::new(),
            cause,
        }
    }
}

/// Pulls delimited records off a byte source
#[async_trait]
pub trait RecordReader: Send {
    /// Read bytes up to and including `delimiter`
    async fn read_record(&mut self, delimiter: u8) -> ReadOutcome;
}

/// Builds the reader for each accepted connection
pub type ReaderFactory = Arc<dyn Fn(TcpStream) -> Box<dyn RecordReader> + Send + Sync>;

/// Factory producing [`BufferedRecordReader`]s with the given idle timeout
#[must_use]
pub fn buffered_reader_factory(idle_timeout: Option<Duration>) -> ReaderFactory {
    Arc::new(move |stream: TcpStream| -> Box<dyn RecordReader> {
        Box::new(BufferedRecordReader::new(stream, idle_timeout))
    })
}

/// Production reader: a buffered `read_until` with an optional idle timeout
#[derive(Debug)]
pub struct BufferedRecordReader<R> {
    reader: BufReader<R>,
    idle_timeout: Option<Duration>,
}

impl<R: AsyncRead + Unpin + Send> BufferedRecordReader<R> {
    pub fn new(source: R, idle_timeout: Option<Duration>) -> Self {
        Self {
            reader: BufReader::with_capacity(READER_CAPACITY, source),
            idle_timeout,
        }
    }
}

#[async_trait]
impl<R: AsyncRead + Unpin + Send> RecordReader for BufferedRecordReader<R> {
    async fn read_record(&mut self, delimiter: u8) -> ReadOutcome {
        let mut record = Vec::with_capacity(RECORD_INITIAL);

        let result = match self.idle_timeout {
            Some(limit) => {
                match tokio::time::timeout(limit, self.reader.read_until(delimiter, &mut record))
                    .await
                {
                    Ok(read) => read.map_err(ReadError::Io),
                    Err(_) => Err(ReadError::TimedOut(limit)),
                }
            }
            None => self
                .reader
                .read_until(delimiter, &mut record)
                .await
                .map_err(ReadError::Io),
        };

        match result {
            Ok(_) if record.last() == Some(&delimiter) => ReadOutcome::Record(record),
            // EOF, possibly after an unterminated final record
            Ok(_) => ReadOutcome::Closed {
                trailing: record,
                cause: ReadError::Eof,
            },
            Err(cause) => ReadOutcome::Closed {
                trailing: record,
                cause,
            },
        }
    }
}
