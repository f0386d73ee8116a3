use crate::metrics::Metrics;
use crate::pacing::RunEnd;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Status {
    pub is_running: bool,
    pub metrics: Metrics,
    pub run_id: Option<Uuid>,
    /// Why the previous run ended, if any run has ended yet
    pub last_run_end: Option<RunEnd>,
}
