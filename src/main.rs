//! logrelay - Log/alert ingestion and fanout service
//!
//! Plugins and services POST structured log/alert events; logrelay validates
//! each envelope and fans it out to the requested sinks: the live alert
//! store, a chat webhook, syslog, and SQL.

use anyhow::Result;
use clap::Parser;
use logrelay::{app::AppBuilder, cli::Cli, config::Config};
use tokio::sync::watch;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration by layering sources: defaults, file, environment,
    // and CLI args. Failure here is fatal.
    let config = Config::load(&cli).unwrap_or_else(|err| {
        eprintln!("Failed to load configuration: {err}");
        std::process::exit(1);
    });

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .init();

    info!("logrelay starting up...");
    info!("-------------------- Configuration --------------------");
    info!("Log Level: {}", config.log_level);
    info!("Listen Address: {}", config.server.listen);
    info!("Retention Max Age: {}s", config.retention.max_age_seconds);
    info!("Default Page Size: {}", config.query.default_page_size);
    info!(
        "Chat Sink: {}",
        if config.sinks.chat.is_some() {
            "Enabled"
        } else {
            "Disabled"
        }
    );
    info!("-------------------------------------------------------");

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let app = AppBuilder::new(config).build(shutdown_rx).await?;

    // Translate ctrl-c into the shutdown signal all tasks watch.
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for shutdown signal: {}", e);
            return;
        }
        info!("Shutdown signal received. Shutting down gracefully...");
        let _ = shutdown_tx.send(true);
    });

    app.run().await?;

    info!("logrelay exited.");
    Ok(())
}
