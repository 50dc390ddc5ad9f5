// Main entry point for the room reaction server

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rooms_core::common::utils::FcmClient;
use rooms_core::kernel::{
    run_expiry_sweep, run_room_listener, start_scheduler, FcmAdapter, PgRoomStore, ServerDeps,
};
use rooms_core::Config;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "rooms-server")]
#[command(about = "Join-request notifications and expired room cleanup for game rooms")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Listen for room writes and run the cleanup schedule (default)
    Run,

    /// Delete expired rooms once and exit
    Sweep,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,rooms_core=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!("Configuration loaded");

    // Connect to database
    tracing::info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Database connected");

    // Run migrations
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Migrations complete");

    let fcm = Arc::new(FcmClient::new(
        config.fcm_project_id.clone(),
        config.fcm_access_token.clone(),
    ));
    let deps = ServerDeps::new(
        Arc::new(PgRoomStore::new(pool.clone())),
        Arc::new(FcmAdapter::new(fcm)),
        config.sweep_consistency,
    );

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Sweep => {
            let result = run_expiry_sweep(&deps)
                .await
                .context("Expired room cleanup failed")?;
            tracing::info!("Cleaned up {} expired rooms", result.deleted_count);
        }
        Commands::Run => {
            tracing::info!("Starting room reaction server");

            let mut scheduler = start_scheduler(deps.clone(), &config.sweep_schedule)
                .await
                .context("Failed to start scheduler")?;

            tokio::select! {
                result = run_room_listener(&pool, deps) => {
                    result.context("Room write listener stopped")?;
                }
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Shutdown signal received");
                }
            }

            scheduler
                .shutdown()
                .await
                .context("Failed to stop scheduler")?;
        }
    }

    Ok(())
}
