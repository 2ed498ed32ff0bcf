//! Configuration loading: TOML file with environment variable overrides.
//!
//! Looks for `agenda.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.
//!
//! The `[program]` section describes rooms and events to register at
//! startup, or `AGENDA_PROGRAM` can point at a separate TOML file holding
//! just the program:
//!
//! ```toml
//! [[rooms]]
//! name = "Main Hall"
//! capacity = 200
//!
//! [[events]]
//! name = "Keynote"
//! capacity = 150
//! room = "Main Hall"
//! start = "2026-03-14T09:00:00Z"
//! duration_minutes = 60
//! speakers = ["ada"]
//! ```

use agenda_domain::time::Timestamp;
use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Database settings.
    pub database: DatabaseConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Rooms and events registered at startup.
    pub program: ProgramConfig,
}

/// `SQLite` database configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// `SQLite` connection URL or file path.
    pub url: String,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

/// Rooms and events to seed.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ProgramConfig {
    pub rooms: Vec<RoomConfig>,
    pub events: Vec<EventConfig>,
}

#[derive(Debug, Deserialize)]
pub struct RoomConfig {
    pub name: String,
    pub capacity: u32,
}

/// One event and its placement.
#[derive(Debug, Deserialize)]
pub struct EventConfig {
    pub name: String,
    pub capacity: u32,
    pub room: String,
    /// RFC 3339 start time, as a quoted string.
    pub start: Timestamp,
    pub duration_minutes: u32,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub vip_only: bool,
    #[serde(default)]
    pub speakers: Vec<String>,
}

impl Config {
    /// Load configuration from `agenda.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if a TOML file exists but is malformed, or if the
    /// resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("agenda.toml")?;
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(val) = std::env::var("AGENDA_DATABASE_URL") {
            self.database.url = val;
        }
        if let Ok(val) = std::env::var("AGENDA_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
        if let Ok(path) = std::env::var("AGENDA_PROGRAM") {
            self.program = ProgramConfig::from_file(&path)?;
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.database.url.trim().is_empty() {
            return Err(ConfigError::Validation(
                "database url must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Return the database URL in `sqlx`-compatible format.
    #[must_use]
    pub fn database_url(&self) -> &str {
        &self.database.url
    }
}

impl ProgramConfig {
    /// Read a standalone program file. Unlike `agenda.toml`, a missing
    /// program file is an error since it was asked for explicitly.
    fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(ConfigError::Parse)
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:agenda.db?mode=rwc".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "agendad=info,agenda_app=info".to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
