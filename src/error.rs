//! Error types for the Carbon listener
//!
//! Only construction-time errors ([`ListenerError`], [`ConfigError`]) ever reach
//! the caller. Everything else is absorbed by the accept loop or a session and
//! shows up in the listener counters and logs.

use std::io;
use std::time::Duration;

use thiserror::Error;

/// Configuration problems detected before any socket is bound
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("unknown metric deconstructor '{0}'")]
    UnknownDeconstructor(String),

    #[error("metric deconstructor '{name}' does not accept options '{options}'")]
    InvalidDeconstructorOptions { name: String, options: String },

    #[error("name cannot be empty or whitespace")]
    EmptyName,

    #[error("{field} must be greater than zero")]
    ZeroDuration { field: &'static str },

    #[error("sink capacity must be greater than zero")]
    ZeroSinkCapacity,
}

/// Errors returned synchronously by the listener loader and by `close()`
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ListenerError {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("failed to bind to {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("listener must be started inside a tokio runtime: {0}")]
    Runtime(#[from] tokio::runtime::TryCurrentError),

    #[error("accept loop terminated abnormally: {0}")]
    AcceptLoop(#[from] tokio::task::JoinError),
}

impl ListenerError {
    /// Check if this error came from configuration validation
    #[must_use]
    pub const fn is_configuration_error(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }

    /// Check if this error came from binding the listening socket
    #[must_use]
    pub const fn is_bind_error(&self) -> bool {
        matches!(self, Self::Bind { .. })
    }
}

/// Failure to split a metric name into base name and dimensions
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum DeconstructError {
    #[error("malformed dimension block in metric '{0}'")]
    Malformed(String),

    #[error("dimension '{0}' is missing a ':' separator")]
    MissingSeparator(String),

    #[error("dimension '{0}' has an empty key")]
    EmptyKey(String),
}

/// Per-record parse failure; the record is dropped, the connection lives on
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum ParseError {
    #[error("record is not valid UTF-8")]
    NotUtf8,

    #[error("expected 3 fields (metric value timestamp), found {0}")]
    FieldCount(usize),

    #[error("invalid metric value '{0}'")]
    InvalidValue(String),

    #[error(transparent)]
    Deconstruct(#[from] DeconstructError),
}

/// Why a session's record reader stopped producing records
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ReadError {
    #[error("end of stream")]
    Eof,

    #[error("no data received for {0:?}")]
    TimedOut(Duration),

    #[error("read failed: {0}")]
    Io(#[from] io::Error),
}

impl ReadError {
    /// Check if this is a client hanging up rather than a real failure
    #[must_use]
    pub fn is_client_disconnect(&self) -> bool {
        match self {
            Self::Eof => true,
            Self::Io(e) => matches!(
                e.kind(),
                io::ErrorKind::BrokenPipe
                    | io::ErrorKind::ConnectionReset
                    | io::ErrorKind::UnexpectedEof
            ),
            Self::TimedOut(_) => false,
        }
    }

    /// Get the appropriate log level for this error
    #[must_use]
    pub fn log_level(&self) -> tracing::Level {
        match self {
            // Normal end of a client connection
            _ if self.is_client_disconnect() => tracing::Level::DEBUG,
            // Idle clients are expected to be reaped
            Self::TimedOut(_) => tracing::Level::DEBUG,
            _ => tracing::Level::WARN,
        }
    }
}
