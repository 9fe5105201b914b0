//! Point-in-time copy of the listener counters

use std::collections::HashMap;
use std::time::Duration;

use crate::datapoint::Datapoint;

/// Snapshot of the listener counters
///
/// Created by `ListenerMetrics::snapshot()`. The cumulative counters are what
/// a listener reports from `stats()`; `active_connections` is a gauge kept for
/// logging only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub total_connections: u64,
    pub active_connections: usize,
    pub total_records: u64,
    pub invalid_records: u64,
    pub total_datapoints: u64,
    pub uptime: Duration,
}

impl MetricsSnapshot {
    /// Names of the reported counters, in reporting order
    pub const COUNTER_NAMES: [&'static str; 4] = [
        "total_connections",
        "total_records",
        "invalid_records",
        "total_datapoints",
    ];

    /// Cumulative counters paired with their names, in reporting order
    #[must_use]
    pub fn counters(&self) -> [(&'static str, u64); 4] {
        let [connections, records, invalid, datapoints] = Self::COUNTER_NAMES;
        [
            (connections, self.total_connections),
            (records, self.total_records),
            (invalid, self.invalid_records),
            (datapoints, self.total_datapoints),
        ]
    }

    /// Render the counters as datapoints tagged with the listener name
    #[must_use]
    pub fn to_datapoints(&self, listener: &str) -> Vec<Datapoint> {
        self.counters()
            .into_iter()
            .map(|(name, value)| {
                let dimensions = HashMap::from([("listener".to_string(), listener.to_string())]);
                Datapoint::new(name, dimensions, i64::try_from(value).unwrap_or(i64::MAX))
            })
            .collect()
    }

    /// Records that parsed successfully
    #[must_use]
    #[inline]
    pub fn valid_records(&self) -> u64 {
        self.total_records.saturating_sub(self.invalid_records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datapoint::Value;

    fn sample() -> MetricsSnapshot {
        MetricsSnapshot {
            total_connections: 1,
            active_connections: 0,
            total_records: 3,
            invalid_records: 2,
            total_datapoints: 1,
            uptime: Duration::from_secs(5),
        }
    }

    #[test]
    fn test_counter_order() {
        let names: Vec<_> = sample().counters().iter().map(|(n, _)| *n).collect();
        assert_eq!(names, MetricsSnapshot::COUNTER_NAMES);
    }

    #[test]
    fn test_to_datapoints() {
        let points = sample().to_datapoints("carbon");
        assert_eq!(points.len(), 4);
        assert_eq!(points[0].metric(), "total_connections");
        assert_eq!(points[0].value(), Value::Int(1));
        assert_eq!(points[2].metric(), "invalid_records");
        assert_eq!(points[2].value(), Value::Int(2));
        assert!(
            points
                .iter()
                .all(|p| p.dimensions().get("listener").map(String::as_str) == Some("carbon"))
        );
    }

    #[test]
    fn test_valid_records() {
        assert_eq!(sample().valid_records(), 1);
        assert_eq!(MetricsSnapshot::default().valid_records(), 0);
    }
}
