//! Metrics and observability module
//!
//! `MetricsTracker` holds the per-run record that observers read.
//! The recorder/exporter pair mirrors the same counters to Prometheus.

pub mod exporter;
pub mod recorder;
pub mod tracker;

pub use exporter::{install_recorder, metrics_route, render_metrics, MetricsError};
pub use tracker::{Metrics, MetricsTracker};
