use std::time::Duration;

/// Aggregate figures for one capture session, derived at shutdown from
/// the final recorder count and elapsed wall time. Never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionStats {
    pub total_events: u64,
    pub elapsed: Duration,
    pub events_per_second: f64,
}

impl SessionStats {
    pub fn derive(total_events: u64, elapsed: Duration) -> Self {
        let secs = elapsed.as_secs_f64();
        // Rate is defined as zero for an empty window rather than a
        // divide-by-zero fault.
        let events_per_second = if secs > 0.0 {
            total_events as f64 / secs
        } else {
            0.0
        };
        Self {
            total_events,
            elapsed,
            events_per_second,
        }
    }
}
