use anyhow::Result;
use bookmanager::config::Config;
use bookmanager::server::Server;
use clap::Parser;
use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Book manager REST API
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Address to listen on, overrides BIND_ADDR
    #[arg(long)]
    bind_addr: Option<SocketAddr>,

    /// Log level, overrides LOG_LEVEL
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load environment variables from .env file
    dotenv::dotenv().ok();

    let mut config = Config::from_env()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;
    if let Some(bind_addr) = args.bind_addr {
        config.bind_addr = bind_addr;
    }
    if let Some(log_level) = args.log_level {
        config.log_level = log_level;
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("bookmanager={},tower_http=debug", config.log_level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting book manager");
    tracing::info!(
        "Configuration: bind_addr={}, cache_ttl_secs={}, sweep_interval_secs={}",
        config.bind_addr,
        config.cache_ttl_secs,
        config.sweep_interval_secs
    );

    let server = Server::new(config)
        .map_err(|e| anyhow::anyhow!("Failed to create server: {}", e))?;

    server
        .run()
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    Ok(())
}
