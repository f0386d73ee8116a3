use std::time::Duration;

pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(100);

const FLOOR_EPSILON: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacingOptions {
    /// Length of one pacing slice
    pub tick_interval: Duration,
}

impl Default for PacingOptions {
    fn default() -> Self {
        Self {
            tick_interval: DEFAULT_TICK_INTERVAL,
        }
    }
}

impl PacingOptions {
    pub fn with_tick(tick_interval: Duration) -> Self {
        Self { tick_interval }
    }

    pub fn ticks_per_second(&self) -> f64 {
        1.0 / self.tick_interval.as_secs_f64()
    }
}

/// Work for one tick at a given rate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickPlan {
    pub rate_mbps: f64,
    pub bytes_budget: u64,
    pub packets: u64,
}

impl TickPlan {
    /// Convert a rate into whole packets for one tick. Leftover bytes are dropped.
    pub fn compute(rate_mbps: f64, packet_size: usize, options: &PacingOptions) -> Self {
        let rate_mbps = rate_mbps.max(0.0);
        let exact = rate_mbps * 1_000_000.0 / 8.0 / options.ticks_per_second();
        // Absorb representation error so whole budgets don't floor one byte short
        let bytes_budget = (exact + FLOOR_EPSILON).floor();
        let bytes_budget = if bytes_budget.is_finite() {
            bytes_budget as u64
        } else {
            0
        };

        let packets = match packet_size {
            0 => 0,
            size => bytes_budget / size as u64,
        };

        Self {
            rate_mbps,
            bytes_budget,
            packets,
        }
    }
}

/// How a run ended
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum RunEnd {
    Stopped,
    Expired,
    TransportFailure(String),
}

impl RunEnd {
    pub fn label(&self) -> &'static str {
        match self {
            RunEnd::Stopped => "stopped",
            RunEnd::Expired => "expired",
            RunEnd::TransportFailure(_) => "transport_failure",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eight_mbps_thousand_byte_packets() {
        let plan = TickPlan::compute(8.0, 1000, &PacingOptions::default());
        assert_eq!(plan.bytes_budget, 100_000);
        assert_eq!(plan.packets, 100);
    }

    #[test]
    fn test_packets_round_down() {
        // 1 Mbps => 12_500 bytes per 100ms tick => 8.93 packets of 1400 bytes
        let plan = TickPlan::compute(1.0, 1400, &PacingOptions::default());
        assert_eq!(plan.bytes_budget, 12_500);
        assert_eq!(plan.packets, 8);
    }

    #[test]
    fn test_rate_below_one_packet_sends_nothing() {
        let plan = TickPlan::compute(0.05, 1400, &PacingOptions::default());
        assert_eq!(plan.packets, 0);
    }

    #[test]
    fn test_shorter_tick_scales_budget() {
        let options = PacingOptions::with_tick(Duration::from_millis(10));
        let plan = TickPlan::compute(8.0, 1000, &options);
        assert_eq!(plan.bytes_budget, 10_000);
        assert_eq!(plan.packets, 10);
    }

    #[test]
    fn test_negative_rate_is_clamped() {
        let plan = TickPlan::compute(-3.0, 1000, &PacingOptions::default());
        assert_eq!(plan.rate_mbps, 0.0);
        assert_eq!(plan.packets, 0);
    }

    #[test]
    fn test_run_end_serialization() {
        let json = serde_json::to_value(RunEnd::TransportFailure("boom".into())).unwrap();
        assert_eq!(json["reason"], "transport_failure");
        assert_eq!(json["detail"], "boom");
        assert_eq!(RunEnd::Expired.label(), "expired");
    }
}
