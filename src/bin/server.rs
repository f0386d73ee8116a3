use anyhow::Context;
use clap::Parser;
use pulsegen::api::create_api_server;
use pulsegen::config::ServerConfig;
use pulsegen::engine::TrafficGenerator;
use pulsegen::metrics::install_recorder;
use pulsegen::network::{Connector, MemoryConnector, UdpConnector};
use std::sync::Arc;
use tracing::metadata::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .init();

    let config = ServerConfig::parse();

    if !config.no_metrics {
        install_recorder().context("failed to install metrics recorder")?;
    }

    let connector: Arc<dyn Connector> = if config.dry_run {
        tracing::warn!("dry run: packets are counted, not sent");
        Arc::new(MemoryConnector::new())
    } else {
        Arc::new(UdpConnector::default())
    };

    let generator = TrafficGenerator::builder()
        .connector(connector)
        .pacing(config.pacing_options())
        .build();

    let static_dir = config.static_dir.is_dir().then(|| config.static_dir.clone());
    if static_dir.is_none() {
        tracing::warn!(
            dir = %config.static_dir.display(),
            "static directory not found, UI disabled"
        );
    }

    let app = create_api_server(generator.clone(), static_dir, !config.no_metrics);

    let listener = tokio::net::TcpListener::bind(config.listen)
        .await
        .with_context(|| format!("failed to bind {}", config.listen))?;

    tracing::info!(
        listen = %config.listen,
        tick_ms = config.tick_ms,
        metrics = !config.no_metrics,
        "pulsegen server running"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(generator))
        .await
        .context("server error")?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal(generator: TrafficGenerator) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        return;
    }

    tracing::info!("shutdown requested");
    generator.stop();
}
