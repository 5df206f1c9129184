use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use telegram_api_forwarder::config::{load_config, validate_config, ConfigError, ForwarderConfig};
use telegram_api_forwarder::lifecycle::{wait_for_signal, Shutdown};
use telegram_api_forwarder::observability::logging::init_logging;
use telegram_api_forwarder::{HttpServer, TELEGRAM_API_ORIGIN};

#[derive(Parser)]
#[command(name = "telegram-api-forwarder", version)]
#[command(about = "Forwards every HTTP request to the Telegram Bot API", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen address, overriding the configuration file.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ForwarderConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }
    validate_config(&config).map_err(ConfigError::Validation)?;

    init_logging(&config.observability)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        upstream = TELEGRAM_API_ORIGIN,
        "telegram-api-forwarder starting"
    );

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(
        address = %listener.local_addr()?,
        "Listening for connections"
    );

    let server = HttpServer::new()?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        match wait_for_signal().await {
            Ok(signal) => {
                tracing::info!(signal, "Signal received");
                shutdown.trigger();
            }
            Err(e) => {
                // Keep serving; dropping `shutdown` would stop the server.
                tracing::error!(error = %e, "Failed to install signal handlers");
                std::future::pending::<()>().await;
            }
        }
    });

    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
