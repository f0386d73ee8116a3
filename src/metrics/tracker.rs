//! Run metrics shared between the pacing loop and readers

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Point-in-time view of the active (or last) run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    pub current_bandwidth_mbps: f64,
    pub total_bytes_sent: u64,
    pub total_packets_sent: u64,
    pub start_time: Option<DateTime<Utc>>,
    pub elapsed_seconds: f64,
}

#[derive(Debug, Default)]
struct TrackerState {
    run_id: Option<Uuid>,
    metrics: Metrics,
}

/// Single metrics record guarded by one lock.
///
/// Updates are tagged with the run that produced them; a run that has been
/// superseded by a newer `reset` can no longer write.
#[derive(Debug, Default)]
pub struct MetricsTracker {
    state: Mutex<TrackerState>,
}

impl MetricsTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Zero the counters for a new run
    pub fn reset(&self, run_id: Uuid, start_time: DateTime<Utc>) {
        let mut state = self.state.lock();
        state.run_id = Some(run_id);
        state.metrics = Metrics {
            start_time: Some(start_time),
            ..Default::default()
        };
    }

    /// Apply one tick and return the resulting snapshot.
    ///
    /// Returns `None` when `run_id` is not the current run.
    pub fn update(
        &self,
        run_id: Uuid,
        rate_mbps: f64,
        bytes_sent: u64,
        packets_sent: u64,
        elapsed_seconds: f64,
    ) -> Option<Metrics> {
        let mut state = self.state.lock();
        if state.run_id != Some(run_id) {
            return None;
        }

        let metrics = &mut state.metrics;
        metrics.current_bandwidth_mbps = rate_mbps;
        metrics.total_bytes_sent = metrics.total_bytes_sent.saturating_add(bytes_sent);
        metrics.total_packets_sent = metrics.total_packets_sent.saturating_add(packets_sent);
        metrics.elapsed_seconds = metrics.elapsed_seconds.max(elapsed_seconds);

        Some(metrics.clone())
    }

    /// Seal the record of `run_id`. Later updates from it are dropped while
    /// the last values stay readable.
    pub fn close(&self, run_id: Uuid) {
        let mut state = self.state.lock();
        if state.run_id == Some(run_id) {
            state.run_id = None;
        }
    }

    pub fn snapshot(&self) -> Metrics {
        self.state.lock().metrics.clone()
    }

    pub fn current_run(&self) -> Option<Uuid> {
        self.state.lock().run_id
    }
}
