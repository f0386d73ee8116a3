//! Lifecycle control of the traffic generator

mod error;
mod generator;
mod state;
mod types;

pub use error::{EngineError, EngineResult};
pub use generator::{TrafficGenerator, TrafficGeneratorBuilder};
pub use state::{ActiveRun, RunEvent, RunState, RunStateMachine};
pub use types::Status;
