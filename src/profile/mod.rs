//! Bandwidth profiles
//!
//! Pure functions mapping elapsed run time to a target rate in Mbps.

mod shape;
mod types;

pub use shape::target_rate;
pub use types::{ProfileKind, ProfileParams, UnknownProfile, RANDOM_FLOOR_RATIO};
