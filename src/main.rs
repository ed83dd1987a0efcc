//! Mini Firehose
//!
//! Named in-memory buffers that deliver records to sinks in batches when a
//! count, size or time threshold is reached.
//!
//! # Usage
//!
//! ```bash
//! mini-firehose api start --host 127.0.0.1 --port 8000
//! ```

use std::net::SocketAddr;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::signal;
use tracing::info;

use api::{router, AppState};
use firehose_engine::EngineOptions;
use telemetry::init_tracing_from_env;

/// Mini Firehose command line
#[derive(Parser, Debug)]
#[command(name = "mini-firehose")]
#[command(about = "Buffer records and deliver them to sinks in batches")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// HTTP API server
    Api {
        #[command(subcommand)]
        command: ApiCommands,
    },
}

#[derive(Subcommand, Debug)]
enum ApiCommands {
    /// Start the HTTP API server
    Start {
        /// Address to bind
        #[arg(long, env = "FIREHOSE_HOST")]
        host: Option<String>,

        /// Port to listen on
        #[arg(long, env = "FIREHOSE_PORT")]
        port: Option<u16>,
    },
}

/// Application configuration.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct Config {
    #[serde(default = "default_host")]
    host: String,
    #[serde(default = "default_port")]
    port: u16,

    #[serde(default)]
    engine: EngineOptions,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            engine: EngineOptions::default(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    init_tracing_from_env();

    match cli.command {
        Commands::Api {
            command: ApiCommands::Start { host, port },
        } => {
            let mut config = load_config()?;
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(port) = port {
                config.port = port;
            }
            serve(config).await
        }
    }
}

async fn serve(config: Config) -> Result<()> {
    info!("Starting Mini Firehose v{}", env!("CARGO_PKG_VERSION"));
    info!(
        poll_interval_ms = config.engine.poll_interval_ms,
        shutdown_grace_secs = config.engine.shutdown_grace_secs,
        max_delivery_workers = config.engine.max_delivery_workers,
        "Loaded engine options"
    );

    let state = AppState::new(config.engine.clone());
    let registry = state.registry.clone();
    let app = router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("Invalid server address")?;

    info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Shutting down...");

    // Final flush of every firehose
    registry.shutdown_all().await;

    info!("Shutdown complete");
    Ok(())
}

/// Load configuration from files and environment.
fn load_config() -> Result<Config> {
    let config = config::Config::builder()
        // Start with defaults
        .add_source(config::Config::try_from(&Config::default())?)
        // Load from config file if exists
        .add_source(
            config::File::with_name("config/default")
                .required(false)
                .format(config::FileFormat::Toml),
        )
        // Override with environment variables, e.g. FIREHOSE__ENGINE__POLL_INTERVAL_MS
        .add_source(
            config::Environment::with_prefix("FIREHOSE")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .context("Failed to build configuration")?;

    config
        .try_deserialize()
        .context("Failed to deserialize configuration")
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        }
        _ = terminate => {
            info!("Received terminate signal");
        }
    }
}
