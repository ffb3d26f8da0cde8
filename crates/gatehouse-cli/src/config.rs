//! Runtime configuration for the gatehouse binary.
//!
//! Configuration is environment-driven: every knob has a field-tested
//! default and a `GATEHOUSE_*` override. The binary runs with no arguments
//! on a device image, so there is no CLI parser.

use anyhow::{Context, Result};
use gatehouse_core::constants::{
    DEFAULT_API_BASE_URL, DEFAULT_DEBOUNCE_SECS, DEFAULT_HTTP_TIMEOUT_MS,
    DEFAULT_REPLICA_REFRESH_SECS, DEFAULT_SYNC_BACKOFF_BASE_MS, DEFAULT_SYNC_BACKOFF_CAP_MS,
    DEFAULT_SYNC_INTERVAL_SECS,
};
use std::time::Duration;

/// Full runtime configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Base URL of the central server API.
    pub api_base_url: String,

    /// Bearer token for authenticated endpoints.
    pub api_token: Option<String>,

    /// Timeout per HTTP request.
    pub http_timeout: Duration,

    /// Path to the offline cache database.
    pub database_path: String,

    /// Debounce window for repeated reads of the same tag.
    pub debounce: Duration,

    /// Interval between collaborator replica refreshes.
    pub refresh_interval: Duration,

    /// Interval between sync cycles while the server is reachable.
    pub sync_interval: Duration,

    /// Initial backoff after a failing sync cycle.
    pub sync_backoff_base: Duration,

    /// Maximum backoff between sync cycles.
    pub sync_backoff_cap: Duration,

    /// Seed a demo replica when the registry has never been reachable.
    pub seed_demo_replica: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            api_token: None,
            http_timeout: Duration::from_millis(DEFAULT_HTTP_TIMEOUT_MS),
            database_path: "gatehouse.db".to_string(),
            debounce: Duration::from_secs(DEFAULT_DEBOUNCE_SECS),
            refresh_interval: Duration::from_secs(DEFAULT_REPLICA_REFRESH_SECS),
            sync_interval: Duration::from_secs(DEFAULT_SYNC_INTERVAL_SECS),
            sync_backoff_base: Duration::from_millis(DEFAULT_SYNC_BACKOFF_BASE_MS),
            sync_backoff_cap: Duration::from_millis(DEFAULT_SYNC_BACKOFF_CAP_MS),
            seed_demo_replica: false,
        }
    }
}

impl AppConfig {
    /// Build the configuration from `GATEHOUSE_*` environment variables,
    /// falling back to defaults for anything unset.
    ///
    /// # Errors
    ///
    /// Returns an error if a set variable fails to parse; a typo'd interval
    /// should stop the device at startup, not silently fall back.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("GATEHOUSE_API_URL") {
            config.api_base_url = url;
        }
        if let Ok(token) = std::env::var("GATEHOUSE_API_TOKEN") {
            config.api_token = Some(token);
        }
        if let Ok(path) = std::env::var("GATEHOUSE_DB") {
            config.database_path = path;
        }
        if let Some(secs) = env_u64("GATEHOUSE_DEBOUNCE_SECS")? {
            config.debounce = Duration::from_secs(secs);
        }
        if let Some(secs) = env_u64("GATEHOUSE_REFRESH_SECS")? {
            config.refresh_interval = Duration::from_secs(secs);
        }
        if let Some(secs) = env_u64("GATEHOUSE_SYNC_INTERVAL_SECS")? {
            config.sync_interval = Duration::from_secs(secs);
        }
        if let Some(ms) = env_u64("GATEHOUSE_HTTP_TIMEOUT_MS")? {
            config.http_timeout = Duration::from_millis(ms);
        }
        if let Ok(value) = std::env::var("GATEHOUSE_SEED_DEMO") {
            config.seed_demo_replica = matches!(value.as_str(), "1" | "true" | "yes");
        }

        Ok(config)
    }
}

fn env_u64(key: &str) -> Result<Option<u64>> {
    match std::env::var(key) {
        Ok(value) => {
            let parsed = value
                .parse::<u64>()
                .with_context(|| format!("{key} must be an integer, got '{value}'"))?;
            Ok(Some(parsed))
        }
        Err(_) => Ok(None),
    }
}
