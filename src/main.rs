//! QuoteMarket - Main Entry Point
//!
//! Starts the quote dispatcher and the seller registration server.

use anyhow::{Context, Result};
use clap::Parser;
use quote_market::config::{load_config, FileConfiguration, StaticConfiguration};
use quote_market::market::quote::QuoteService;
use quote_market::market::reduction::ReductionCatalog;
use quote_market::{create_app, ConfigurationSource, Dispatcher, HttpTransport, SellerRegistry, ServerState};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

/// CLI arguments for the application
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Iteration the dispatcher starts from (overrides the configuration)
    #[arg(long)]
    start_iteration: Option<u64>,

    /// Address the registration server listens on (overrides the configuration)
    #[arg(long, env = "QUOTE_MARKET_BIND")]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting QuoteMarket application");
    info!("Configuration file: {}", args.config);

    // Load environment variables from .env file if present
    dotenvy::dotenv().ok();

    let config_file = Path::new(&args.config);
    if !config_file.exists() {
        warn!("{} not found, using defaults and environment", args.config);
    }
    let app_config = load_config(Some(args.config.as_str()))?;

    let reductions = ReductionCatalog::with_custom(&app_config.reductions);
    info!("{} reduction strategies available", reductions.len());
    let quotes = Arc::new(QuoteService::with_defaults(reductions));

    // The market section is re-read at every iteration
    let configuration: Arc<dyn ConfigurationSource> = if config_file.exists() {
        Arc::new(FileConfiguration::new(config_file, app_config.market.clone()))
    } else {
        Arc::new(StaticConfiguration::new(app_config.market.clone()))
    };

    let transport = HttpTransport::with_timeout(Duration::from_secs(
        app_config.settings.request_timeout_seconds,
    ))?;

    let registry = SellerRegistry::new();
    let dispatcher = Dispatcher::new(
        registry.clone(),
        quotes,
        Arc::new(transport),
        configuration,
        Duration::from_millis(app_config.settings.tick_interval_ms),
    );

    let start = args
        .start_iteration
        .unwrap_or(app_config.settings.start_iteration);
    dispatcher.start_buying(start);

    let bind = args.bind.unwrap_or(app_config.server.bind);
    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("cannot listen on {}", bind))?;
    info!("Registration server listening on {}", bind);

    let app = create_app(ServerState::new(
        registry,
        app_config.settings.history_chunk_size,
    ));

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            // Keep serving until Ctrl+C
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Could not listen for shutdown signal: {}", e);
            }
        })
        .await?;

    info!("Received shutdown signal, cleaning up...");
    dispatcher.stop();

    Ok(())
}
