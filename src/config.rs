//! Configuration types for the event tracker service.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::auth::{MAX_HASH_COST, MIN_HASH_COST};
use crate::error::{BatError, Result};
use crate::scheduler::Schedule;

/// Top-level service configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BatConfig {
    /// HTTP listener settings.
    pub server: ServerConfig,
    /// Backing store settings.
    pub database: DatabaseConfig,
    /// Password hashing and token settings.
    pub auth: AuthConfig,
    /// Event cache refresh triggers.
    pub schedule: ScheduleConfig,
    /// Log filter and optional file output.
    pub logging: LoggingConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind host.
    pub host: String,
    /// Bind port (use `0` for auto-assign).
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_owned(),
            port: 5000,
        }
    }
}

/// SQLite store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Database file path.
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: crate::bat_dirs::database_file(),
        }
    }
}

/// Auth configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HS256 signing secret for bearer tokens.
    ///
    /// Empty means a random secret is generated at startup, so tokens do not
    /// survive a restart.
    pub jwt_secret: String,
    /// Token lifetime in seconds.
    pub token_ttl_secs: u64,
    /// bcrypt cost for new password hashes (4 to 31).
    pub hash_cost: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            token_ttl_secs: 3600,
            hash_cost: 10,
        }
    }
}

/// Wall-clock triggers for the event cache refreshes (local time).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Refreshes both the today and month caches.
    pub midnight_refresh: Schedule,
    /// Refreshes the today cache only.
    pub morning_refresh: Schedule,
    /// Refreshes the month cache only.
    pub monthly_refresh: Schedule,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            midnight_refresh: Schedule::Daily { hour: 0, min: 0 },
            morning_refresh: Schedule::Daily { hour: 9, min: 0 },
            monthly_refresh: Schedule::Monthly {
                day: 1,
                hour: 0,
                min: 0,
            },
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub filter: String,
    /// Directory for daily rolling log files. `None` logs to stderr only.
    pub file_dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_owned(),
            file_dir: None,
        }
    }
}

impl BatConfig {
    /// Load configuration from a TOML file, falling back to defaults for missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| BatError::Config(e.to_string()))
    }

    /// Save configuration to a TOML file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot be serialized.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self).map_err(|e| BatError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Returns the config path: `BAT_CONFIG` if set, else `config_dir()/config.toml`.
    pub fn default_config_path() -> PathBuf {
        std::env::var_os("BAT_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(crate::bat_dirs::config_file)
    }

    /// Load the config file (a missing file yields defaults), apply process
    /// environment overrides and validate.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing file is unreadable or invalid, or if
    /// validation fails.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            info!("loading config from {}", path.display());
            Self::from_file(path)?
        } else {
            info!("no config at {}, using defaults", path.display());
            Self::default()
        };
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `PORT`, `JWT_SECRET` and `BAT_DATABASE` overrides.
    ///
    /// # Errors
    ///
    /// Returns [`BatError::Config`] if `PORT` is not a valid port number.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(port) = lookup("PORT") {
            self.server.port = port
                .trim()
                .parse::<u16>()
                .map_err(|e| BatError::Config(format!("invalid PORT value {port:?}: {e}")))?;
        }
        if let Some(secret) = lookup("JWT_SECRET") {
            self.auth.jwt_secret = secret;
        }
        if let Some(path) = lookup("BAT_DATABASE") {
            self.database.path = PathBuf::from(path);
        }
        Ok(())
    }

    /// Check value ranges that serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`BatError::Config`] describing the first invalid field.
    pub fn validate(&self) -> Result<()> {
        if self.auth.token_ttl_secs == 0 {
            return Err(BatError::Config("auth.token_ttl_secs must be > 0".to_owned()));
        }
        if !(MIN_HASH_COST..=MAX_HASH_COST).contains(&self.auth.hash_cost) {
            return Err(BatError::Config(format!(
                "auth.hash_cost must be between {MIN_HASH_COST} and {MAX_HASH_COST}"
            )));
        }
        for (name, schedule) in [
            ("schedule.midnight_refresh", &self.schedule.midnight_refresh),
            ("schedule.morning_refresh", &self.schedule.morning_refresh),
            ("schedule.monthly_refresh", &self.schedule.monthly_refresh),
        ] {
            schedule
                .validate()
                .map_err(|e| BatError::Config(format!("{name}: {e}")))?;
        }
        Ok(())
    }
}
