use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vidscribe_core::{
    create_authenticator, load_config, validate_config, Authenticator, Downloader,
    FfmpegMediaTool, HttpDownloader, JsonTaskStore, MediaTool, OpenAiTranscriber,
    RetentionSweeper, TaskStore, Transcriber, VideoProcessor,
};
use vidscribe_server::{api::create_router, state::AppState};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine config path
    let config_path = std::env::var("VIDSCRIBE_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!("Auth method: {:?}", config.auth.method);
    info!("Storage root: {:?}", config.storage.root_dir);
    info!(
        "Max concurrent tasks: {}",
        config.processor.max_concurrent_tasks
    );

    std::fs::create_dir_all(&config.storage.root_dir).with_context(|| {
        format!(
            "Failed to create storage root {:?}",
            config.storage.root_dir
        )
    })?;

    // Create authenticator
    let authenticator: Arc<dyn Authenticator> = Arc::from(
        create_authenticator(&config.auth).context("Failed to create authenticator")?,
    );
    info!("Using authenticator: {}", authenticator.method_name());

    // Task store (loads existing records)
    let task_store: Arc<dyn TaskStore> = Arc::new(
        JsonTaskStore::open(&config.storage.records_dir)
            .context("Failed to open task store")?,
    );

    // External tools
    let downloader: Arc<dyn Downloader> = Arc::new(
        HttpDownloader::new(config.downloader.clone())
            .context("Failed to create downloader")?,
    );
    let media: Arc<dyn MediaTool> = Arc::new(FfmpegMediaTool::new(config.media.clone()));
    let transcriber: Arc<dyn Transcriber> = Arc::new(
        OpenAiTranscriber::new(&config.transcriber)
            .context("Failed to create transcription client")?,
    );
    info!(
        "Transcription service: {} (model {})",
        config.transcriber.api_base, config.transcriber.model
    );

    let processor = VideoProcessor::new(
        config.processor.clone(),
        &config.storage.root_dir,
        downloader,
        media,
        transcriber,
        Arc::clone(&task_store),
    );

    // Start retention sweeper
    let sweeper = RetentionSweeper::new(
        config.retention.clone(),
        Arc::clone(&task_store),
        &config.storage.root_dir,
    );
    sweeper.start().await;

    // Create app state and router
    let state = Arc::new(AppState::new(config.clone(), authenticator, processor));
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutting down...");
    sweeper.stop().await;

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
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
}
