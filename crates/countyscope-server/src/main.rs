//! CountyScope data proxy server
//!
//! Serves the dashboard's boundary routes (`/census-proxy`, `/fred-proxy`,
//! `/hud-proxy`, `/chart-data`) plus `/healthz`, `/readyz` and `/metrics`.
//!
//! Usage:
//! ```bash
//! # With config file
//! countyscope-server --config countyscope.yaml
//!
//! # Server-side default keys from the environment
//! HUD_API_KEY=your_key countyscope-server
//!
//! # Print the effective config with keys redacted
//! countyscope-server --config countyscope.yaml check-config
//! ```
//!
//! Test with:
//! ```bash
//! curl 'http://localhost:3000/census-proxy?year=2022&state=01&county=001&variables=B01001_001E'
//! curl 'http://localhost:3000/fred-proxy?endpoint=series&series_id=GNPCA&api_key=...&file_type=json'
//! ```

mod app;
mod config;

use clap::{Parser, Subcommand};
use config::{LogFormat, ServerConfig};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::info;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// CountyScope Server - proxy for Census, FRED and HUD data
#[derive(Parser)]
#[command(name = "countyscope-server")]
#[command(about = "CountyScope data proxy for Census, FRED and HUD", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Path to configuration file (YAML or TOML)
    #[arg(
        short,
        long,
        value_name = "FILE",
        env = "COUNTYSCOPE_CONFIG",
        global = true
    )]
    config: Option<String>,

    /// Address to bind
    #[arg(long, value_name = "HOST", global = true)]
    host: Option<String>,

    /// Port to bind
    #[arg(short, long, value_name = "PORT", global = true)]
    port: Option<u16>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server (default if no command specified)
    Serve,
    /// Validate the configuration and print it with API keys redacted
    CheckConfig,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => ServerConfig::from_file(path)?,
        None => ServerConfig::default(),
    };

    // Environment overrides the file; CLI flags override both
    config.merge_env();
    if let Some(host) = cli.host {
        config.host = host;
    }
    if let Some(port) = cli.port {
        config.port = port;
    }
    config.validate()?;

    if let Some(Commands::CheckConfig) = cli.command {
        print!("{}", serde_yaml::to_string(&config.redacted())?);
        return Ok(());
    }

    init_tracing(&config)?;

    match &cli.config {
        Some(path) => info!("Loaded configuration from {}", path),
        None => info!("Using default configuration"),
    }

    let app = app::build_app(&config)?;

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let listener = TcpListener::bind(addr).await?;

    info!("CountyScope listening on http://{}", addr);
    info!("   Data endpoints:");
    info!("   - Census: http://{}/census-proxy", addr);
    info!("   - FRED:   http://{}/fred-proxy", addr);
    info!("   - HUD:    http://{}/hud-proxy", addr);
    info!("   Observability:");
    info!("   - Health check:       http://{}/healthz", addr);
    info!("   - Readiness check:    http://{}/readyz", addr);
    info!("   - Prometheus metrics: http://{}/metrics", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

fn init_tracing(config: &ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let log_level = match config.logging.level.to_lowercase().as_str() {
        "trace" => LevelFilter::TRACE,
        "debug" => LevelFilter::DEBUG,
        "info" => LevelFilter::INFO,
        "warn" => LevelFilter::WARN,
        "error" => LevelFilter::ERROR,
        _ => LevelFilter::INFO,
    };

    // RUST_LOG directives, when set, refine the configured level
    let filter = EnvFilter::builder()
        .with_default_directive(log_level.into())
        .from_env_lossy();

    match config.logging.format {
        LogFormat::Json => {
            let subscriber = FmtSubscriber::builder()
                .with_env_filter(filter)
                .json()
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        LogFormat::Text => {
            let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
    }

    Ok(())
}

/// Wait for shutdown signal (SIGINT or SIGTERM)
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
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
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
