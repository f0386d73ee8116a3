use crate::profile::types::{ProfileKind, ProfileParams, RANDOM_FLOOR_RATIO};

/// Bell width as a fraction of the run duration
const BELL_STD_DEV_DIVISOR: f64 = 5.0;

/// Angular frequencies of the sines multiplied by the random profile
const RANDOM_FREQUENCIES: [f64; 3] = [10.0, 3.3, 7.7];

/// Target bandwidth in Mbps for `elapsed_secs` into a run.
///
/// Deterministic for every profile; the result is never negative.
pub fn target_rate(kind: &ProfileKind, params: &ProfileParams, elapsed_secs: f64) -> f64 {
    let max = params.max_bandwidth_mbps;

    let rate = match kind {
        ProfileKind::Constant => max,
        ProfileKind::Bell => max * bell_height(params, elapsed_secs),
        ProfileKind::Random => max * random_factor(elapsed_secs),
        ProfileKind::Other(_) => max / 2.0,
    };

    rate.max(0.0)
}

/// Gaussian height in (0, 1], exactly 1 at the peak
fn bell_height(params: &ProfileParams, elapsed_secs: f64) -> f64 {
    let peak_time = params.duration_secs * params.bell_peak_ratio;
    let std_dev = params.duration_secs / BELL_STD_DEV_DIVISOR;
    if std_dev <= 0.0 {
        return 1.0;
    }

    let z = (elapsed_secs - peak_time) / std_dev;
    (-0.5 * z * z).exp()
}

/// Product of incommensurate sines folded into [RANDOM_FLOOR_RATIO, 1]
fn random_factor(elapsed_secs: f64) -> f64 {
    let wave: f64 = RANDOM_FREQUENCIES
        .iter()
        .map(|freq| (elapsed_secs * freq).sin())
        .product();

    let span = 1.0 - RANDOM_FLOOR_RATIO;
    let swing = (RANDOM_FLOOR_RATIO + span * wave).abs();
    (RANDOM_FLOOR_RATIO + span * swing).clamp(RANDOM_FLOOR_RATIO, 1.0)
}
