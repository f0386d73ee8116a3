use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Malformed configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("{field} out of range: {value} (expected {expected})")]
    OutOfRange {
        field: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error("Invalid target host: {0}")]
    InvalidHost(String),

    #[error(transparent)]
    UnknownProfile(#[from] crate::profile::UnknownProfile),
}

pub type ConfigResult<T> = Result<T, ConfigError>;
