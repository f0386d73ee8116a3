//! Prometheus metrics recorder for generator runs

use metrics::{counter, describe_counter, describe_gauge, gauge};
use std::sync::atomic::{AtomicBool, Ordering};

static METRICS_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Initialize metric descriptions (call once at startup)
pub fn init_metrics() {
    if METRICS_INITIALIZED.swap(true, Ordering::SeqCst) {
        return; // Already initialized
    }

    describe_counter!("pulsegen_bytes_sent_total", "Total bytes handed to the transport");
    describe_counter!(
        "pulsegen_packets_sent_total",
        "Total datagrams handed to the transport"
    );
    describe_counter!("pulsegen_runs_started_total", "Number of runs started");
    describe_counter!(
        "pulsegen_runs_finished_total",
        "Number of runs finished, by reason"
    );

    describe_gauge!(
        "pulsegen_current_bandwidth_mbps",
        "Target bandwidth of the most recent tick"
    );
    describe_gauge!("pulsegen_observers", "Registered snapshot observers");
}

pub fn record_run_started() {
    counter!("pulsegen_runs_started_total").increment(1);
}

pub fn record_run_finished(reason: &'static str) {
    counter!("pulsegen_runs_finished_total", "reason" => reason).increment(1);
    gauge!("pulsegen_current_bandwidth_mbps").set(0.0);
}

/// Record one pacing tick
pub fn record_tick(rate_mbps: f64, bytes: u64, packets: u64) {
    counter!("pulsegen_bytes_sent_total").increment(bytes);
    counter!("pulsegen_packets_sent_total").increment(packets);
    gauge!("pulsegen_current_bandwidth_mbps").set(rate_mbps);
}

pub fn set_observer_count(count: usize) {
    gauge!("pulsegen_observers").set(count as f64);
}
