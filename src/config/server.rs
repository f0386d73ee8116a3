use crate::pacing::PacingOptions;
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Process-level settings for the generator server
#[derive(Parser, Debug, Clone)]
#[command(name = "pulsegen-server", version, about = "Synthetic UDP load generator")]
pub struct ServerConfig {
    /// Address the HTTP/WebSocket API listens on
    #[arg(long, env = "PULSEGEN_LISTEN", default_value = "0.0.0.0:8000")]
    pub listen: SocketAddr,

    /// Directory with the web UI assets
    #[arg(long, env = "PULSEGEN_STATIC_DIR", default_value = "./static")]
    pub static_dir: PathBuf,

    /// Pacing tick interval in milliseconds
    #[arg(long, default_value_t = 100, value_parser = clap::value_parser!(u64).range(1..=1000))]
    pub tick_ms: u64,

    /// Disable the Prometheus recorder and the /metrics route
    #[arg(long)]
    pub no_metrics: bool,

    /// Count packets in memory instead of sending them
    #[arg(long)]
    pub dry_run: bool,
}

impl ServerConfig {
    pub fn pacing_options(&self) -> PacingOptions {
        PacingOptions::with_tick(Duration::from_millis(self.tick_ms))
    }
}
