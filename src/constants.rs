//! Constants used throughout the listener
//!
//! Buffer sizes and defaults live here so the config layer, the reader and
//! the binary agree on them.

use std::time::Duration;

/// Buffer size constants
///
/// Carbon records are short text lines, typically well under 256 bytes.
pub mod buffer {
    /// BufReader capacity per connection (64KB)
    /// Lets a busy client deliver hundreds of records per syscall
    pub const READER_CAPACITY: usize = 64 * 1024;

    /// Initial capacity of a single record buffer
    pub const RECORD_INITIAL: usize = 256;

    const _READER_HOLDS_RECORDS: () = assert!(
        READER_CAPACITY > RECORD_INITIAL,
        "READER_CAPACITY must exceed RECORD_INITIAL"
    );
}

/// Timeout constants
pub mod timeout {
    use super::Duration;

    /// How long one accept wait may block before the loop re-checks its state
    pub const ACCEPT_DEADLINE: Duration = Duration::from_secs(1);

    /// Default interval between stats log lines in the binary
    pub const STATS_INTERVAL: Duration = Duration::from_secs(30);
}

/// Listener defaults
pub mod listener {
    /// Name used in logs and the `listener` dimension of stats
    pub const DEFAULT_NAME: &str = "carbon";

    /// Standard Carbon plaintext port on loopback
    pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:2003";

    /// Transport reported by `protocol()`
    pub const PROTOCOL: &str = "tcp";
}

/// Sink defaults
pub mod sink {
    pub const DEFAULT_NAME: &str = "carbon";

    /// Datapoints buffered between sessions and the consumer
    pub const DEFAULT_CAPACITY: usize = 10_000;
}

/// Environment variables that override config file values
pub mod env {
    pub const LISTEN_ADDR: &str = "CARBON_LISTEN_ADDR";
    pub const LISTENER_NAME: &str = "CARBON_LISTENER_NAME";
    pub const METRIC_DECONSTRUCTOR: &str = "CARBON_METRIC_DECONSTRUCTOR";
    pub const METRIC_DECONSTRUCTOR_OPTIONS: &str = "CARBON_METRIC_DECONSTRUCTOR_OPTIONS";
}
