use chrono::{DateTime, Utc};
use tokio::time::Instant;

/// Time source for runs.
///
/// `now` is monotonic and drives pacing; `wall_clock` only labels runs.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;

    fn wall_clock(&self) -> DateTime<Utc>;
}

/// Tokio's clock. Honors `tokio::time::pause` in tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

impl Clock for TokioClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn wall_clock(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
