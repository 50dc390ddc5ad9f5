use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;

use crate::domains::rooms::SweepConsistency;

/// Hourly, on the hour (tokio-cron-scheduler uses a seconds field).
pub const DEFAULT_SWEEP_SCHEDULE: &str = "0 0 * * * *";

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub fcm_project_id: String,
    pub fcm_access_token: String,
    pub sweep_schedule: String,
    pub sweep_consistency: SweepConsistency,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            database_max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .context("DATABASE_MAX_CONNECTIONS must be a valid number")?,
            fcm_project_id: env::var("FCM_PROJECT_ID").context("FCM_PROJECT_ID must be set")?,
            fcm_access_token: env::var("FCM_ACCESS_TOKEN")
                .context("FCM_ACCESS_TOKEN must be set")?,
            sweep_schedule: env::var("SWEEP_SCHEDULE")
                .unwrap_or_else(|_| DEFAULT_SWEEP_SCHEDULE.to_string()),
            sweep_consistency: env::var("SWEEP_CONSISTENCY")
                .unwrap_or_else(|_| "query-gated".to_string())
                .parse()
                .context("SWEEP_CONSISTENCY must be 'query-gated' or 'conditional'")?,
        })
    }
}
