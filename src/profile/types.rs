use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Lower bound of the random profile, as a fraction of the max bandwidth
pub const RANDOM_FLOOR_RATIO: f64 = 0.2;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown profile: {0}")]
pub struct UnknownProfile(pub String);

/// Named bandwidth-shaping function.
///
/// Parsing from text is strict and rejects unknown names. `Other` can only
/// be built in code through [`ProfileKind::from_name_lenient`]; it shapes
/// traffic at half the max bandwidth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ProfileKind {
    Constant,
    Bell,
    Random,
    Other(String),
}

impl ProfileKind {
    pub fn as_str(&self) -> &str {
        match self {
            ProfileKind::Constant => "constant",
            ProfileKind::Bell => "bell",
            ProfileKind::Random => "random",
            ProfileKind::Other(name) => name,
        }
    }

    /// Map a name to a profile, keeping unknown names as `Other`
    pub fn from_name_lenient(name: &str) -> Self {
        name.parse()
            .unwrap_or_else(|_| ProfileKind::Other(name.to_string()))
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, ProfileKind::Other(_))
    }
}

impl FromStr for ProfileKind {
    type Err = UnknownProfile;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "constant" => Ok(ProfileKind::Constant),
            "bell" => Ok(ProfileKind::Bell),
            "random" => Ok(ProfileKind::Random),
            _ => Err(UnknownProfile(s.to_string())),
        }
    }
}

impl TryFrom<String> for ProfileKind {
    type Error = UnknownProfile;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ProfileKind> for String {
    fn from(kind: ProfileKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for ProfileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inputs shared by every profile
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfileParams {
    pub max_bandwidth_mbps: f64,
    pub duration_secs: f64,
    /// Fraction of the duration at which the bell profile peaks
    pub bell_peak_ratio: f64,
}
