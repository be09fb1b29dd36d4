//! Configuration loading
//!
//! Resolution priority for every setting:
//! 1. Command-line argument / environment variable (highest priority)
//! 2. TOML config file
//! 3. Compiled default (fallback)
//!
//! The binary's clap parser covers tier 1 and hands the result over as
//! [`ConfigOverrides`]; this module merges it with an optional [`TomlConfig`].

use crate::{Error, Result};
use serde::Deserialize;
use sqlx::postgres::{PgConnectOptions, PgSslMode};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_DB_HOST: &str = "localhost";
pub const DEFAULT_DB_PORT: u16 = 5432;
pub const DEFAULT_DB_USERNAME: &str = "postgres";
pub const DEFAULT_DB_NAME: &str = "postgres";
pub const DEFAULT_DB_SSL_MODE: &str = "disable";
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;
pub const DEFAULT_MUSIC_INFO_URL: &str = "http://localhost:8080";
pub const DEFAULT_MUSIC_INFO_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format '{}' (expected text or json)", other)),
        }
    }
}

/// Relational store connection parameters
#[derive(Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub name: String,
    /// Postgres sslmode (disable, allow, prefer, require, verify-ca, verify-full)
    pub ssl_mode: String,
    pub max_connections: u32,
}

impl DatabaseConfig {
    /// Parse the configured TLS mode
    pub fn ssl_mode(&self) -> Result<PgSslMode> {
        PgSslMode::from_str(&self.ssl_mode)
            .map_err(|_| Error::Config(format!("Unknown DB_SSL_MODE '{}'", self.ssl_mode)))
    }

    /// Build sqlx connection options
    pub fn connect_options(&self) -> Result<PgConnectOptions> {
        Ok(PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.username)
            .password(&self.password)
            .database(&self.name)
            .ssl_mode(self.ssl_mode()?))
    }
}

// Password stays out of logs.
impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("name", &self.name)
            .field("ssl_mode", &self.ssl_mode)
            .field("max_connections", &self.max_connections)
            .finish()
    }
}

/// External metadata provider settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MusicInfoConfig {
    /// Base URL; requests go to `<base_url>/info`
    pub base_url: String,
    pub timeout: Duration,
}

/// Tracing settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Default filter directive when RUST_LOG is unset
    pub level: String,
    pub format: LogFormat,
}

/// Fully resolved service configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub port: u16,
    pub database: DatabaseConfig,
    pub music_info: MusicInfoConfig,
    pub logging: LoggingConfig,
}

/// Values supplied on the command line or through the environment.
/// `None` means "not given", so lower tiers apply.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub port: Option<u16>,
    pub db_host: Option<String>,
    pub db_port: Option<u16>,
    pub db_username: Option<String>,
    pub db_password: Option<String>,
    pub db_name: Option<String>,
    pub db_ssl_mode: Option<String>,
    pub db_max_connections: Option<u32>,
    pub music_info_url: Option<String>,
    pub music_info_timeout_secs: Option<u64>,
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
}

/// TOML config file layout
///
/// ```toml
/// port = 8000
///
/// [database]
/// host = "db.internal"
/// name = "music"
///
/// [music_info]
/// url = "http://metadata.internal"
/// timeout_secs = 5
///
/// [logging]
/// level = "debug"
/// format = "json"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub port: Option<u16>,
    pub database: TomlDatabase,
    pub music_info: TomlMusicInfo,
    pub logging: TomlLogging,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TomlDatabase {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
    pub ssl_mode: Option<String>,
    pub max_connections: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TomlMusicInfo {
    pub url: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TomlLogging {
    pub level: Option<String>,
    pub format: Option<LogFormat>,
}

/// Read and parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
    })?;

    toml::from_str(&content).map_err(|e| {
        Error::Config(format!("Failed to parse config file {}: {}", path.display(), e))
    })
}

fn pick<T>(cli: Option<T>, file: Option<T>, default: impl FnOnce() -> T) -> T {
    cli.or(file).unwrap_or_else(default)
}

impl ServiceConfig {
    /// Merge overrides, file values and compiled defaults
    ///
    /// Fails when the merged values are unusable (zero timeout, unknown TLS mode).
    pub fn resolve(overrides: ConfigOverrides, file: Option<TomlConfig>) -> Result<Self> {
        let file = file.unwrap_or_default();

        let database = DatabaseConfig {
            host: pick(overrides.db_host, file.database.host, || DEFAULT_DB_HOST.to_string()),
            port: pick(overrides.db_port, file.database.port, || DEFAULT_DB_PORT),
            username: pick(overrides.db_username, file.database.username, || {
                DEFAULT_DB_USERNAME.to_string()
            }),
            password: pick(overrides.db_password, file.database.password, String::new),
            name: pick(overrides.db_name, file.database.name, || DEFAULT_DB_NAME.to_string()),
            ssl_mode: pick(overrides.db_ssl_mode, file.database.ssl_mode, || {
                DEFAULT_DB_SSL_MODE.to_string()
            }),
            max_connections: pick(
                overrides.db_max_connections,
                file.database.max_connections,
                || DEFAULT_DB_MAX_CONNECTIONS,
            ),
        };
        database.ssl_mode()?;
        if database.max_connections == 0 {
            return Err(Error::Config("DB_MAX_CONNECTIONS must be at least 1".to_string()));
        }

        let timeout_secs = pick(
            overrides.music_info_timeout_secs,
            file.music_info.timeout_secs,
            || DEFAULT_MUSIC_INFO_TIMEOUT_SECS,
        );
        if timeout_secs == 0 {
            return Err(Error::Config("MUSIC_INFO_TIMEOUT_SECS must be at least 1".to_string()));
        }
        let music_info = MusicInfoConfig {
            base_url: pick(overrides.music_info_url, file.music_info.url, || {
                DEFAULT_MUSIC_INFO_URL.to_string()
            }),
            timeout: Duration::from_secs(timeout_secs),
        };

        let logging = LoggingConfig {
            level: pick(overrides.log_level, file.logging.level, || DEFAULT_LOG_LEVEL.to_string()),
            format: pick(overrides.log_format, file.logging.format, LogFormat::default),
        };

        Ok(ServiceConfig {
            port: pick(overrides.port, file.port, || DEFAULT_PORT),
            database,
            music_info,
            logging,
        })
    }
}
