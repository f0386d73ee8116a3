mod error;
mod server;
mod types;

pub use error::{ConfigError, ConfigResult};
pub use server::ServerConfig;
pub use types::{
    Configuration, TargetAddress, DURATION_RANGE_SECS, MAX_BANDWIDTH_LIMIT_MBPS,
    PACKET_SIZE_RANGE,
};
