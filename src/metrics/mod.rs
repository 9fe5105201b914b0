//! Listener counters
//!
//! Lock-free atomic counters updated from the accept loop and every session.
//! All methods are safe to call concurrently from any task; cumulative
//! counters only ever grow.

mod snapshot;

pub use snapshot::MetricsSnapshot;

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Instant;

/// Thread-safe counters for one listener
#[derive(Debug, Clone)]
pub struct ListenerMetrics {
    inner: Arc<MetricsInner>,
}

#[derive(Debug)]
struct MetricsInner {
    total_connections: AtomicU64,
    active_connections: AtomicUsize,
    total_records: AtomicU64,
    invalid_records: AtomicU64,
    total_datapoints: AtomicU64,
    start_time: Instant,
}

impl ListenerMetrics {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MetricsInner {
                total_connections: AtomicU64::new(0),
                active_connections: AtomicUsize::new(0),
                total_records: AtomicU64::new(0),
                invalid_records: AtomicU64::new(0),
                total_datapoints: AtomicU64::new(0),
                start_time: Instant::now(),
            }),
        }
    }

    /// Record an accepted connection
    #[inline]
    pub fn connection_opened(&self) {
        self.inner.total_connections.fetch_add(1, Ordering::Relaxed);
        self.inner
            .active_connections
            .fetch_add(1, Ordering::Relaxed);
    }

    /// Record a session ending
    #[inline]
    pub fn connection_closed(&self) {
        self.inner
            .active_connections
            .fetch_sub(1, Ordering::Relaxed);
    }

    /// Record one record pulled off a connection, valid or not
    #[inline]
    pub fn record_read(&self) {
        self.inner.total_records.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_invalid(&self) {
        self.inner.invalid_records.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a datapoint accepted by the sink
    #[inline]
    pub fn datapoint_emitted(&self) {
        self.inner.total_datapoints.fetch_add(1, Ordering::Relaxed);
    }

    #[must_use]
    #[inline]
    pub fn active_connections(&self) -> usize {
        self.inner.active_connections.load(Ordering::Relaxed)
    }

    /// Take a point-in-time copy of every counter
    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            total_connections: self.inner.total_connections.load(Ordering::Relaxed),
            active_connections: self.inner.active_connections.load(Ordering::Relaxed),
            total_records: self.inner.total_records.load(Ordering::Relaxed),
            invalid_records: self.inner.invalid_records.load(Ordering::Relaxed),
            total_datapoints: self.inner.total_datapoints.load(Ordering::Relaxed),
            uptime: self.inner.start_time.elapsed(),
        }
    }
}

impl Default for ListenerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_zeroed() {
        let snapshot = ListenerMetrics::new().snapshot();
        assert_eq!(snapshot.total_connections, 0);
        assert_eq!(snapshot.active_connections, 0);
        assert_eq!(snapshot.total_records, 0);
        assert_eq!(snapshot.invalid_records, 0);
        assert_eq!(snapshot.total_datapoints, 0);
    }

    #[test]
    fn test_connection_tracking() {
        let metrics = ListenerMetrics::new();
        metrics.connection_opened();
        metrics.connection_opened();
        metrics.connection_closed();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.total_connections, 2);
        assert_eq!(snapshot.active_connections, 1);
        assert_eq!(metrics.active_connections(), 1);
    }

    #[test]
    fn test_record_counters() {
        let metrics = ListenerMetrics::new();
        metrics.record_read();
        metrics.record_read();
        metrics.record_invalid();
        metrics.datapoint_emitted();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.total_records, 2);
        assert_eq!(snapshot.invalid_records, 1);
        assert_eq!(snapshot.total_datapoints, 1);
    }

    #[test]
    fn test_clones_share_counters() {
        let metrics = ListenerMetrics::new();
        let clone = metrics.clone();
        clone.record_read();
        assert_eq!(metrics.snapshot().total_records, 1);
    }

    #[test]
    fn test_concurrent_updates() {
        let metrics = ListenerMetrics::new();
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let metrics = metrics.clone();
                std::thread::spawn(move || {
                    for _ in 0..1000 {
                        metrics.record_read();
                        metrics.datapoint_emitted();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.total_records, 8000);
        assert_eq!(snapshot.total_datapoints, 8000);
    }
}
