use crate::config::error::{ConfigError, ConfigResult};
use crate::profile::{ProfileKind, ProfileParams};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;
use std::time::Duration;

pub const DURATION_RANGE_SECS: RangeInclusive<u64> = 1..=3600;
pub const MAX_BANDWIDTH_LIMIT_MBPS: f64 = 10_000.0;
pub const PACKET_SIZE_RANGE: RangeInclusive<usize> = 64..=9000;

const DEFAULT_BELL_PEAK_RATIO: f64 = 0.5;
const DEFAULT_PACKET_SIZE: usize = 1400;

/// Destination of generated datagrams
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TargetAddress {
    #[serde(rename = "targetHost", alias = "targetIP")]
    pub host: String,
    #[serde(rename = "targetPort")]
    pub port: u16,
}

impl TargetAddress {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl fmt::Display for TargetAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Bracket bare IPv6 literals so the string stays resolvable
        if self.host.contains(':') && !self.host.starts_with('[') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

/// Traffic generation parameters. Frozen while a run is active.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Configuration {
    #[serde(alias = "pattern")]
    pub profile: ProfileKind,

    #[serde(alias = "duration")]
    pub duration_seconds: u64,

    #[serde(alias = "maxBandwidth")]
    pub max_bandwidth_mbps: f64,

    #[serde(flatten)]
    pub target: TargetAddress,

    #[serde(default = "default_bell_peak_ratio")]
    pub bell_peak_ratio: f64,

    #[serde(alias = "packetSize", default = "default_packet_size")]
    pub packet_size_bytes: usize,
}

fn default_bell_peak_ratio() -> f64 {
    DEFAULT_BELL_PEAK_RATIO
}

fn default_packet_size() -> usize {
    DEFAULT_PACKET_SIZE
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            profile: ProfileKind::Bell,
            duration_seconds: 60,
            max_bandwidth_mbps: 100.0,
            target: TargetAddress::new("127.0.0.1", 8080),
            bell_peak_ratio: DEFAULT_BELL_PEAK_RATIO,
            packet_size_bytes: DEFAULT_PACKET_SIZE,
        }
    }
}

impl Configuration {
    /// Parse and validate a JSON document
    pub fn from_json(input: &str) -> ConfigResult<Self> {
        let config: Configuration = serde_json::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every numeric field against its accepted range
    pub fn validate(&self) -> ConfigResult<()> {
        if !DURATION_RANGE_SECS.contains(&self.duration_seconds) {
            return Err(out_of_range(
                "durationSeconds",
                self.duration_seconds,
                "1..=3600",
            ));
        }

        let bandwidth = self.max_bandwidth_mbps;
        if !bandwidth.is_finite() || bandwidth <= 0.0 || bandwidth > MAX_BANDWIDTH_LIMIT_MBPS {
            return Err(out_of_range("maxBandwidthMbps", bandwidth, "(0, 10000]"));
        }

        if self.target.host.trim().is_empty() {
            return Err(ConfigError::InvalidHost(self.target.host.clone()));
        }
        if self.target.port == 0 {
            return Err(out_of_range("targetPort", self.target.port, "1..=65535"));
        }

        let ratio = self.bell_peak_ratio;
        if !ratio.is_finite() || !(0.0..=1.0).contains(&ratio) {
            return Err(out_of_range("bellPeakRatio", ratio, "[0, 1]"));
        }

        if !PACKET_SIZE_RANGE.contains(&self.packet_size_bytes) {
            return Err(out_of_range(
                "packetSizeBytes",
                self.packet_size_bytes,
                "64..=9000",
            ));
        }

        Ok(())
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs(self.duration_seconds)
    }

    pub fn profile_params(&self) -> ProfileParams {
        ProfileParams {
            max_bandwidth_mbps: self.max_bandwidth_mbps,
            duration_secs: self.duration_seconds as f64,
            bell_peak_ratio: self.bell_peak_ratio,
        }
    }
}

fn out_of_range(field: &'static str, value: impl ToString, expected: &'static str) -> ConfigError {
    ConfigError::OutOfRange {
        field,
        value: value.to_string(),
        expected,
    }
}
