//! Pulsegen: a synthetic UDP load generator
//!
//! A [`TrafficGenerator`] paces UDP datagrams toward a target following a
//! bandwidth profile, tracks per-run metrics, and fans snapshots out to
//! observers. The `api` module exposes it over HTTP and WebSocket.

pub mod api;
pub mod broadcast;
pub mod config;
pub mod engine;
pub mod metrics;
pub mod network;
pub mod pacing;
pub mod profile;

pub use config::{Configuration, TargetAddress};
pub use engine::{EngineError, Status, TrafficGenerator};
pub use metrics::Metrics;
pub use profile::ProfileKind;
