//! TeleStream server binary.

use anyhow::{Context, Result};
use clap::Parser;
use figment::Figment;
use figment::providers::{Env, Format, Toml};
use std::net::SocketAddr;
use telestream_core::config::AppConfig;
use telestream_server::state::spawn_session_sweeper;
use telestream_server::{AppState, create_router};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// TeleStream - A video sharing backend
#[derive(Parser, Debug)]
#[command(name = "telestreamd")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(
        short,
        long,
        env = "TELESTREAM_CONFIG",
        default_value = "config/server.toml"
    )]
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("TeleStream v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration (file is optional, env vars can provide/override everything)
    let config_path = std::path::Path::new(&args.config);
    let mut figment = Figment::new();
    let has_config_file = config_path.exists();

    if has_config_file {
        tracing::info!(config_path = %args.config, "Loading configuration from file");
        figment = figment.merge(Toml::file(&args.config));
    } else {
        tracing::debug!("No config file found at {}", args.config);
    }

    let config: AppConfig = figment
        .merge(Env::prefixed("TELESTREAM_").split("__"))
        .extract()
        .context("failed to load configuration")?;

    // Initialize the media backend
    let media = telestream_media::from_config(&config.media)
        .await
        .context("failed to initialize media backend")?;
    tracing::info!(backend = media.backend_name(), "Media backend initialized");

    // Verify media host connectivity before accepting requests, so a bad
    // base URL or key surfaces at startup instead of on the first playback.
    media
        .health_check()
        .await
        .context("media host health check failed")?;
    tracing::info!("Media host connectivity verified");

    // Initialize metadata store
    let metadata = telestream_metadata::from_config(&config.metadata)
        .await
        .context("failed to initialize metadata store")?;
    tracing::info!("Metadata store initialized");

    // Create application state (validates config, panics on invalid)
    let state = AppState::new(config.clone(), media, metadata);

    // Spawn the expired-session sweeper if enabled
    if let Some(interval) = state.session_sweep_interval() {
        spawn_session_sweeper(state.clone(), interval);
        tracing::info!(
            interval_secs = interval.as_secs(),
            "Session sweeper spawned"
        );
    } else {
        tracing::info!("Session sweeper disabled");
    }

    // Create router
    let app = create_router(state);

    // Parse bind address
    let addr: SocketAddr = config.server.bind.parse().context("invalid bind address")?;

    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {}", addr))?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
