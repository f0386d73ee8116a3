//! Paced packet emission

mod clock;
mod engine;
mod types;

pub use clock::{Clock, TokioClock};
pub use engine::PacingEngine;
pub use types::{PacingOptions, RunEnd, TickPlan, DEFAULT_TICK_INTERVAL};
