//! Typed configuration from environment variables.
//!
//! Loads once at startup, fails fast if required vars are missing.
//! Sensitive values wrapped in secrecy::SecretString to prevent log leaks.

use crate::error::{Error, Result};
use secrecy::SecretString;

#[derive(Debug)]
pub struct Config {
    /// Postgres connection string for the pgmq notification queue.
    pub database_url: SecretString,
    /// Name of the pgmq queue completion messages are sent to.
    pub queue_name: String,
    /// Cluster identifier carried in every completion message.
    pub cluster_name: String,
    /// Metrics endpoint polled each tick (e.g. "http://driver:4040/metrics/json").
    /// Optional because `check` and `send` don't need a source.
    pub metrics_url: Option<String>,
    /// Seconds between reporting ticks.
    pub report_interval_secs: u64,
    pub otel_endpoint: Option<String>,
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// In local dev, call `dotenvy::dotenv().ok()` before this.
    /// In production, systemd EnvironmentFile provides the vars.
    pub fn from_env() -> Result<Self> {
        let report_interval_secs = match std::env::var("REPORT_INTERVAL_SECS") {
            Ok(raw) => raw.parse().map_err(|_| {
                Error::Config(format!("REPORT_INTERVAL_SECS is not a valid integer: {raw}"))
            })?,
            Err(_) => 10,
        };

        Ok(Self {
            database_url: SecretString::from(required_var("DATABASE_URL")?),
            queue_name: std::env::var("QUEUE_NAME").unwrap_or_else(|_| "job-completions".to_string()),
            cluster_name: required_var("CLUSTER_NAME")?,
            metrics_url: std::env::var("METRICS_URL").ok(),
            report_interval_secs,
            otel_endpoint: std::env::var("OTEL_ENDPOINT").ok(),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn required_var(name: &str) -> Result<String> {
    std::env::var(name)
        .map_err(|_| Error::Config(format!("required environment variable {name} is not set")))
}
