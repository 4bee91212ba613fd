use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::services::{ServeDir, ServeFile};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use caterpro::config::Config;
use caterpro::AppState;

#[derive(Parser, Debug)]
#[command(name = "caterpro")]
#[command(author, version, about = "Catering marketplace REST backend", long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "caterpro.toml")]
    config: PathBuf,

    /// Override log level
    #[arg(short, long)]
    log_level: Option<String>,

    /// Seed demo caterers when the directory is empty
    #[arg(long)]
    seed_demo: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(&cli.config)?;

    // Initialize logging
    let log_level = cli
        .log_level
        .as_ref()
        .unwrap_or(&config.logging.level)
        .clone();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting CaterPro v{}", env!("CARGO_PKG_VERSION"));

    // Ensure data directory exists
    std::fs::create_dir_all(&config.server.data_dir).with_context(|| {
        format!(
            "Failed to create data directory: {}",
            config.server.data_dir.display()
        )
    })?;

    // Initialize database
    let db = caterpro::db::init(&config.server.data_dir).await?;

    // Ensure default admin user exists
    caterpro::api::auth::ensure_admin_user(
        &db,
        &config.auth.admin_email,
        &config.auth.admin_password,
    )
    .await?;

    if cli.seed_demo {
        // Demo caterers never sign in; their credential is a throwaway
        let password_hash = caterpro::api::auth::hash_password(&uuid::Uuid::new_v4().to_string())
            .map_err(|e| anyhow::anyhow!("Failed to hash seed password: {}", e))?;
        caterpro::db::seed_demo_caterers(&db, &password_hash).await?;
    }

    // Create app state
    let state = Arc::new(AppState::new(config.clone(), db.clone()));

    // Sweep stale rate limiter entries in the background
    caterpro::api::rate_limit::spawn_cleanup_task(
        state.rate_limiter.clone(),
        config.rate_limit.cleanup_interval,
    );

    // Create API router
    let api_router = caterpro::api::create_router(state.clone());

    // Serve React static files with SPA fallback
    let static_dir = PathBuf::from("static/dist");
    let index_file = static_dir.join("index.html");
    let serve_static = ServeDir::new(&static_dir).not_found_service(ServeFile::new(&index_file));

    // Combine routers - API first, then static files as fallback
    let app = axum::Router::new()
        .merge(api_router)
        .fallback_service(serve_static);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("CaterPro API listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
