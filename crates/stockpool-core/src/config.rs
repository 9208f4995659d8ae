//! Configuration resolution for `Stockpool`.
//!
//! Implements hierarchical config resolution:
//! 1. Built-in defaults
//! 2. Global config (`<config dir>/stockpool/settings.json`)
//! 3. Explicit config file (`--config`)
//! 4. Environment variables
//! 5. CLI arguments (applied by the binary, highest priority)

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Error, Result};

const SECS_PER_DAY: u64 = 24 * 60 * 60;

/// Complete `Stockpool` configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub subscription: SubscriptionConfig,
    #[serde(default)]
    pub admin: AdminConfig,
    #[serde(default)]
    pub notifications: NotificationConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct StorageConfig {
    /// `SQLite` database file. Falls back to [`default_database_path`].
    pub database_path: Option<PathBuf>,
}

/// Subscription lifecycle settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SubscriptionConfig {
    /// Length of the active window granted by an assignment.
    pub default_days: u32,
    /// Sales ending within this many days count as "expiring soon".
    pub expiring_window_days: u32,
}

impl Default for SubscriptionConfig {
    fn default() -> Self {
        Self {
            default_days: 30,
            expiring_window_days: 3,
        }
    }
}

impl SubscriptionConfig {
    pub fn default_duration(&self) -> Duration {
        Duration::from_secs(u64::from(self.default_days) * SECS_PER_DAY)
    }

    pub fn expiring_window(&self) -> Duration {
        Duration::from_secs(u64::from(self.expiring_window_days) * SECS_PER_DAY)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct AdminConfig {
    /// argon2id PHC string of the admin password.
    pub password_hash: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct NotificationConfig {
    /// Endpoint receiving a JSON POST for every new pending order.
    pub webhook_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// One config file. Fields it leaves out keep the value from earlier layers.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigLayer {
    storage: StorageConfig,
    subscription: SubscriptionLayer,
    admin: AdminConfig,
    notifications: NotificationConfig,
    logging: LoggingLayer,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SubscriptionLayer {
    default_days: Option<u32>,
    expiring_window_days: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LoggingLayer {
    level: Option<String>,
    json: Option<bool>,
}

/// Load configuration with hierarchical resolution.
pub fn load_config(explicit_path: Option<&Path>) -> Result<Config> {
    let mut config = Config::default();

    if let Some(global_path) = global_config_path() {
        if global_path.exists() {
            let global = load_config_file(&global_path)?;
            merge_config(&mut config, global);
        }
    }

    if let Some(path) = explicit_path {
        // An explicitly requested file must exist.
        let explicit = load_config_file(path)?;
        merge_config(&mut config, explicit);
    }

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());

    Ok(config)
}

/// Get the global config file path.
pub fn global_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("stockpool").join("settings.json"))
}

/// Database location used when none is configured.
pub fn default_database_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("stockpool").join("stockpool.db"))
}

fn load_config_file(path: &Path) -> Result<ConfigLayer> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
    })?;
    serde_json::from_str(&content).map_err(|e| {
        Error::Config(format!("Failed to parse config file {}: {}", path.display(), e))
    })
}

fn merge_config(base: &mut Config, overlay: ConfigLayer) {
    if overlay.storage.database_path.is_some() {
        base.storage.database_path = overlay.storage.database_path;
    }
    if let Some(days) = overlay.subscription.default_days {
        base.subscription.default_days = days;
    }
    if let Some(days) = overlay.subscription.expiring_window_days {
        base.subscription.expiring_window_days = days;
    }
    if overlay.admin.password_hash.is_some() {
        base.admin.password_hash = overlay.admin.password_hash;
    }
    if overlay.notifications.webhook_url.is_some() {
        base.notifications.webhook_url = overlay.notifications.webhook_url;
    }
    if let Some(level) = overlay.logging.level {
        base.logging.level = level;
    }
    if let Some(json) = overlay.logging.json {
        base.logging.json = json;
    }
}

/// Apply `STOCKPOOL_*` overrides read through `lookup`.
pub fn apply_env_overrides(config: &mut Config, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(val) = lookup("STOCKPOOL_DATABASE_PATH") {
        config.storage.database_path = Some(PathBuf::from(val));
    }
    if let Some(val) = lookup("STOCKPOOL_SUBSCRIPTION_DAYS") {
        match val.parse() {
            Ok(days) => config.subscription.default_days = days,
            Err(_) => warn!(value = %val, "Ignoring invalid STOCKPOOL_SUBSCRIPTION_DAYS"),
        }
    }
    if let Some(val) = lookup("STOCKPOOL_EXPIRING_WINDOW_DAYS") {
        match val.parse() {
            Ok(days) => config.subscription.expiring_window_days = days,
            Err(_) => warn!(value = %val, "Ignoring invalid STOCKPOOL_EXPIRING_WINDOW_DAYS"),
        }
    }
    if let Some(val) = lookup("STOCKPOOL_ADMIN_PASSWORD_HASH") {
        config.admin.password_hash = Some(val);
    }
    if let Some(val) = lookup("STOCKPOOL_WEBHOOK_URL") {
        config.notifications.webhook_url = Some(val);
    }
    if let Some(val) = lookup("STOCKPOOL_LOG_LEVEL") {
        config.logging.level = val;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;

    use super::*;

    #[test]
    fn default_subscription_is_30_days() {
        let config = Config::default();
        assert_eq!(
            config.subscription.default_duration(),
            Duration::from_secs(30 * 24 * 60 * 60)
        );
    }

    #[test]
    fn default_expiring_window_is_3_days() {
        let config = Config::default();
        assert_eq!(
            config.subscription.expiring_window(),
            Duration::from_secs(3 * 24 * 60 * 60)
        );
    }

    fn layer_from(json: &str) -> ConfigLayer {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{json}").unwrap();
        load_config_file(file.path()).unwrap()
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let mut config = Config::default();
        merge_config(&mut config, layer_from(r#"{"subscription": {"default_days": 90}}"#));

        assert_eq!(config.subscription.default_days, 90);
        assert_eq!(config.subscription.expiring_window_days, 3);
        assert_eq!(config.logging.level, "info");
        assert!(config.storage.database_path.is_none());
    }

    #[test]
    fn later_layer_keeps_sections_it_does_not_mention() {
        let mut config = Config::default();
        merge_config(
            &mut config,
            layer_from(
                r#"{"subscription": {"default_days": 45}, "logging": {"level": "debug", "json": true}}"#,
            ),
        );
        merge_config(
            &mut config,
            layer_from(r#"{"storage": {"database_path": "/tmp/x.db"}, "logging": {"json": false}}"#),
        );

        assert_eq!(config.subscription.default_days, 45);
        assert_eq!(config.subscription.expiring_window_days, 3);
        assert_eq!(config.storage.database_path, Some(PathBuf::from("/tmp/x.db")));
        assert_eq!(config.logging.level, "debug");
        assert!(!config.logging.json);
    }

    #[test]
    fn malformed_file_is_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(matches!(
            load_config_file(file.path()),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn merge_keeps_base_paths_when_overlay_is_silent() {
        let mut base = Config::default();
        base.storage.database_path = Some(PathBuf::from("/var/lib/stockpool.db"));
        base.admin.password_hash = Some("hash".to_string());

        merge_config(&mut base, ConfigLayer::default());
        assert_eq!(
            base.storage.database_path,
            Some(PathBuf::from("/var/lib/stockpool.db"))
        );
        assert_eq!(base.admin.password_hash.as_deref(), Some("hash"));
    }

    #[test]
    fn env_overrides_apply() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("STOCKPOOL_SUBSCRIPTION_DAYS", "7"),
            ("STOCKPOOL_EXPIRING_WINDOW_DAYS", "1"),
            ("STOCKPOOL_DATABASE_PATH", "/tmp/sp.db"),
            ("STOCKPOOL_WEBHOOK_URL", "http://localhost:9000/orders"),
        ]);
        let mut config = Config::default();
        apply_env_overrides(&mut config, |k| env.get(k).map(ToString::to_string));

        assert_eq!(config.subscription.default_days, 7);
        assert_eq!(config.subscription.expiring_window_days, 1);
        assert_eq!(
            config.storage.database_path,
            Some(PathBuf::from("/tmp/sp.db"))
        );
        assert_eq!(
            config.notifications.webhook_url.as_deref(),
            Some("http://localhost:9000/orders")
        );
    }

    #[test]
    fn invalid_env_number_is_ignored() {
        let mut config = Config::default();
        apply_env_overrides(&mut config, |k| {
            (k == "STOCKPOOL_SUBSCRIPTION_DAYS").then(|| "thirty".to_string())
        });
        assert_eq!(config.subscription.default_days, 30);
    }
}
