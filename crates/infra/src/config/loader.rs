//! Configuration loader
//!
//! Builds the application configuration from a config file overlaid with
//! environment variables.
//!
//! ## Loading Strategy
//! 1. Probes standard locations for a config file (TOML or JSON)
//! 2. Falls back to built-in defaults when no file is found
//! 3. Applies environment-variable overrides on top
//!
//! ## Environment Variables
//! - `SLOTWISE_DB_PATH`: Database file path
//! - `SLOTWISE_DB_POOL_SIZE`: Connection pool size
//! - `SLOTWISE_BIND_ADDR`: HTTP server bind address
//! - `SLOTWISE_MAX_RANGE_DAYS`: Availability query window cap, in days
//! - `SLOTWISE_REMINDER_LEAD_MINUTES`: Reminder lead time
//! - `SLOTWISE_REMINDER_CRON`: Reminder trigger cron expression
//! - `SLOTWISE_MIRROR_CRON`: Mirror reconciliation cron expression
//! - `SLOTWISE_GOOGLE_CLIENT_ID` / `SLOTWISE_GOOGLE_CLIENT_SECRET`
//! - `SLOTWISE_REDIRECT_URI`: OAuth redirect URI
//! - `SLOTWISE_NOTIFIER_ENDPOINT`: Reminder webhook endpoint
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./config.toml` / `./config.json`
//! 2. `./slotwise.toml` / `./slotwise.json`
//! 3. The same names in the parent directory

use std::path::{Path, PathBuf};

use slotwise_domain::{Config, Result, SlotwiseError};
use tracing::{debug, info};

/// Load configuration: file (or defaults) plus environment overrides.
pub fn load() -> Result<Config> {
    let mut config = match probe_config_file() {
        Some(path) => {
            info!(path = %path.display(), "configuration loaded from file");
            load_from_file(&path)?
        }
        None => {
            debug!("no config file found; starting from defaults");
            Config::default()
        }
    };

    load_from_env(&mut config)?;
    Ok(config)
}

/// Apply environment-variable overrides to `config`.
pub fn load_from_env(config: &mut Config) -> Result<()> {
    if let Some(path) = env_var("SLOTWISE_DB_PATH") {
        config.database.path = path;
    }
    if let Some(size) = env_var("SLOTWISE_DB_POOL_SIZE") {
        config.database.pool_size = size
            .parse::<u32>()
            .map_err(|e| SlotwiseError::Config(format!("invalid pool size: {e}")))?;
    }
    if let Some(addr) = env_var("SLOTWISE_BIND_ADDR") {
        config.server.bind_addr = addr;
    }
    if let Some(days) = env_var("SLOTWISE_MAX_RANGE_DAYS") {
        config.scheduling.max_range_days = days
            .parse::<i64>()
            .map_err(|e| SlotwiseError::Config(format!("invalid max range days: {e}")))?;
    }
    if let Some(lead) = env_var("SLOTWISE_REMINDER_LEAD_MINUTES") {
        config.scheduling.reminder_lead_minutes = lead
            .parse::<i64>()
            .map_err(|e| SlotwiseError::Config(format!("invalid reminder lead: {e}")))?;
    }
    if let Some(cron) = env_var("SLOTWISE_REMINDER_CRON") {
        config.scheduling.reminder_cron = cron;
    }
    if let Some(cron) = env_var("SLOTWISE_MIRROR_CRON") {
        config.scheduling.mirror_cron = cron;
    }
    if let Some(client_id) = env_var("SLOTWISE_GOOGLE_CLIENT_ID") {
        config.calendar.client_id = Some(client_id);
    }
    if let Some(secret) = env_var("SLOTWISE_GOOGLE_CLIENT_SECRET") {
        config.calendar.client_secret = Some(secret);
    }
    if let Some(uri) = env_var("SLOTWISE_REDIRECT_URI") {
        config.calendar.redirect_uri = uri;
    }
    if let Some(endpoint) = env_var("SLOTWISE_NOTIFIER_ENDPOINT") {
        config.calendar.notifier_endpoint = Some(endpoint);
    }
    Ok(())
}

/// Load configuration from a specific file. Format is inferred from the
/// extension; `.toml` and `.json` are supported.
pub fn load_from_file(path: &Path) -> Result<Config> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        SlotwiseError::Config(format!("failed to read {}: {e}", path.display()))
    })?;

    match path.extension().and_then(|ext| ext.to_str()) {
        Some("toml") => toml::from_str(&contents)
            .map_err(|e| SlotwiseError::Config(format!("invalid TOML config: {e}"))),
        Some("json") => serde_json::from_str(&contents)
            .map_err(|e| SlotwiseError::Config(format!("invalid JSON config: {e}"))),
        other => Err(SlotwiseError::Config(format!(
            "unsupported config format: {}",
            other.unwrap_or("<none>")
        ))),
    }
}

fn probe_config_file() -> Option<PathBuf> {
    const CANDIDATES: &[&str] = &[
        "config.toml",
        "config.json",
        "slotwise.toml",
        "slotwise.json",
        "../config.toml",
        "../config.json",
        "../slotwise.toml",
        "../slotwise.json",
    ];

    CANDIDATES.iter().map(PathBuf::from).find(|path| path.is_file())
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toml_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[database]
path = "/tmp/slots.db"
pool_size = 8

[server]
bind_addr = "0.0.0.0:9000"
"#,
        )
        .unwrap();

        let config = load_from_file(&path).unwrap();
        assert_eq!(config.database.path, "/tmp/slots.db");
        assert_eq!(config.database.pool_size, 8);
        assert_eq!(config.server.bind_addr, "0.0.0.0:9000");
        // Unspecified sections fall back to defaults
        assert_eq!(
            config.scheduling.max_range_days,
            slotwise_domain::constants::DEFAULT_MAX_RANGE_DAYS
        );
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "database: {}").unwrap();

        let err = load_from_file(&path).unwrap_err();
        assert!(matches!(err, SlotwiseError::Config(_)));
    }
}
