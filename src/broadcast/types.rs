use crate::config::Configuration;
use crate::metrics::Metrics;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Full engine view sent to an observer when it registers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineSnapshot {
    pub config: Configuration,
    pub is_running: bool,
    pub metrics: Metrics,
}

/// Message pushed to observers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum Snapshot {
    /// Initial state on registration
    State(EngineSnapshot),
    /// Live metrics, once per tick
    Metrics(Metrics),
    /// Configuration accepted through the push channel
    Config(Configuration),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    #[error("Observer disconnected")]
    Disconnected,

    #[error("Observer backlog full")]
    Backlogged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObserverId(pub u64);

impl std::fmt::Display for ObserverId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "observer-{}", self.0)
    }
}
