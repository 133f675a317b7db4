//! StrangerBot service
//!
//! Main entry point. Connects to PostgreSQL and the Telegram Bot API, then
//! runs the polling, dispatch, matchmaking and teardown workers until
//! Ctrl+C or SIGTERM.

use std::sync::Arc;

use stranger_bot::config::AppConfig;
use stranger_bot::database::{create_pool, run_migrations};
use stranger_bot::error::{AppError, AppResult};
use stranger_bot::repositories::{CursorRepository, ReportRepository, UserRepository};
use stranger_bot::runtime::{BotRuntime, Services};
use stranger_bot::transport::TelegramClient;
use tracing::{error, info};

#[tokio::main]
async fn main() -> AppResult<()> {
    // Load environment variables first
    dotenv::dotenv().ok();

    // Load configuration
    let config = AppConfig::from_env().map_err(|e| {
        eprintln!("Configuration error: {}", e);
        AppError::Config(e)
    })?;

    init_tracing(&config);

    info!("Starting StrangerBot...");
    info!("Environment: {}", config.environment);
    info!("Log level: {}", config.log_level);

    // =========================================================================
    // DATABASE SETUP
    // =========================================================================
    info!("Connecting to database...");

    let pool = create_pool(&config.database).await.map_err(|e| {
        error!("Failed to create database pool: {}", e);
        AppError::Database(e)
    })?;

    info!("Database connection pool created (max connections: {})", config.database.max_connections);

    info!("Running database migrations...");
    run_migrations(&pool, Some(config.database.migrations_path.as_str()))
        .await
        .map_err(|e| {
            error!("Database migration failed: {}", e);
            AppError::Database(e)
        })?;

    // =========================================================================
    // WORKERS
    // =========================================================================
    let telegram = Arc::new(TelegramClient::new(&config.telegram)?);
    info!("Telegram client initialized ({})", config.telegram.api_url);

    let services = Services {
        users: Arc::new(UserRepository::new(pool.clone())),
        reports: Arc::new(ReportRepository::new(pool.clone())),
        cursor: Arc::new(CursorRepository::new(pool.clone())),
        source: telegram.clone(),
        messenger: telegram,
    };

    let runtime = BotRuntime::start(services, &config.workers);
    info!("StrangerBot ready, press Ctrl+C to shut down");

    // =========================================================================
    // SHUTDOWN HANDLING
    // =========================================================================
    wait_for_shutdown_signal().await;
    info!("Shutdown signal received, stopping...");

    runtime.shutdown().await;
    pool.close().await;

    info!("StrangerBot shutdown complete");
    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("stranger_bot={},sqlx=warn", config.log_level).into());

    if config.json_logs() {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[cfg(unix)]
async fn wait_for_shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut sigterm) => {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {}
                _ = sigterm.recv() => {}
            }
        }
        Err(e) => {
            error!("Could not install SIGTERM handler: {}", e);
            let _ = tokio::signal::ctrl_c().await;
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
