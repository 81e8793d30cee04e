// Engine main entry point
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use scanner_engine::config::{EngineSettings, SourceSettings};
use scanner_engine::data::{BinanceKlineSource, CachedSource, CandleSource, CsvCandleSource};
use scanner_engine::scanner::Scanner;
use scanner_engine::services::signal_service::MySignalEngine;
use scanner_engine::services::SignalEngineServer;
use scanner_engine::strategy::SetupDetector;
use tonic::transport::Server;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn build_source(settings: &EngineSettings) -> Arc<dyn CandleSource> {
    let ttl = Duration::from_secs(settings.cache_ttl_secs);
    match &settings.source {
        SourceSettings::Binance { base_url } => {
            let source = match base_url {
                Some(url) => BinanceKlineSource::with_base_url(url.clone()),
                None => BinanceKlineSource::new(),
            };
            Arc::new(CachedSource::new(source, ttl))
        }
        SourceSettings::Csv { path } => Arc::new(CsvCandleSource::new(path.clone())),
    }
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown requested"),
        Err(e) => {
            error!(error = %e, "Cannot listen for Ctrl-C, running until killed");
            std::future::pending::<()>().await;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting trend setup scanner...");

    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let settings = EngineSettings::load(config_path.as_deref()).context("Failed to load engine settings")?;
    let addr: std::net::SocketAddr = settings
        .listen_addr()
        .parse()
        .with_context(|| format!("Invalid listen address {}", settings.listen_addr()))?;
    info!(
        symbol = %settings.symbol,
        interval = %settings.interval,
        lookback = settings.lookback,
        refresh_secs = settings.refresh_secs,
        "Engine will listen on {}",
        addr
    );

    let detector = SetupDetector::new(settings.strategy)?;
    let scanner = Arc::new(Scanner::new(
        build_source(&settings),
        detector.clone(),
        settings.symbol.clone(),
        settings.interval,
        settings.lookback,
    ));
    let service = MySignalEngine::new(
        scanner.subscribe(),
        detector,
        settings.interval,
        settings.latest_setups,
        settings.data_dir.clone(),
    );

    tokio::spawn(scanner.run(Duration::from_secs(settings.refresh_secs)));

    Server::builder()
        .add_service(SignalEngineServer::new(service))
        .serve_with_shutdown(addr, shutdown_signal())
        .await?;

    Ok(())
}
