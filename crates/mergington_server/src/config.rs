//! Runtime configuration loaded from `MERGINGTON_*` environment variables.
//!
//! `.env` files are read by `main` through `dotenvy` before loading.

use mergington_core::config::StorageConfig;
use mergington_core::default_log_level;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::str::FromStr;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8000;
const DEFAULT_STATIC_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/static");
const DEFAULT_LOG_DIR: &str = "logs";

/// Which activity store the server runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    /// Persistent SQLite file.
    Sqlite,
    /// Process-local store; rosters are lost on exit.
    Memory,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Ok(Self::Sqlite),
            "memory" => Ok(Self::Memory),
            other => Err(format!("expected sqlite|memory, got `{other}`")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory served under `/static`.
    pub static_dir: PathBuf,
    pub backend: StorageBackend,
    pub storage: StorageConfig,
    /// Provision the built-in catalogue on startup.
    pub seed_defaults: bool,
    /// Optional JSON catalogue provisioned on startup.
    pub seed_file: Option<PathBuf>,
    pub log_level: String,
    pub log_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
            backend: StorageBackend::Sqlite,
            storage: StorageConfig::default(),
            seed_defaults: true,
            seed_file: None,
            log_level: default_log_level().to_string(),
            log_dir: PathBuf::from(DEFAULT_LOG_DIR),
        }
    }
}

/// A configuration variable holds an unusable value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    pub key: &'static str,
    pub value: String,
    pub reason: String,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid value `{}` for {}: {}",
            self.value, self.key, self.reason
        )
    }
}

impl Error for ConfigError {}

impl ServerConfig {
    /// Loads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        if let Some(host) = get("MERGINGTON_HOST") {
            config.host = host;
        }
        if let Some(port) = get("MERGINGTON_PORT") {
            config.port = parse_value("MERGINGTON_PORT", port)?;
        }
        if let Some(dir) = get("MERGINGTON_STATIC_DIR") {
            config.static_dir = PathBuf::from(dir);
        }
        if let Some(backend) = get("MERGINGTON_STORAGE") {
            config.backend = parse_value("MERGINGTON_STORAGE", backend)?;
        }
        if let Some(path) = get("MERGINGTON_DATABASE_PATH") {
            config.storage.database_path = PathBuf::from(path);
        }
        if let Some(timeout) = get("MERGINGTON_BUSY_TIMEOUT_MS") {
            config.storage.busy_timeout_ms = parse_value("MERGINGTON_BUSY_TIMEOUT_MS", timeout)?;
        }
        if let Some(flag) = get("MERGINGTON_SEED_DEFAULTS") {
            config.seed_defaults = parse_flag("MERGINGTON_SEED_DEFAULTS", flag)?;
        }
        config.seed_file = get("MERGINGTON_SEED_FILE").map(PathBuf::from);
        if let Some(level) = get("MERGINGTON_LOG_LEVEL") {
            config.log_level = level;
        }
        if let Some(dir) = get("MERGINGTON_LOG_DIR") {
            config.log_dir = PathBuf::from(dir);
        }

        Ok(config)
    }
}

fn parse_value<T>(key: &'static str, value: String) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    value.parse().map_err(|err: T::Err| ConfigError {
        key,
        reason: err.to_string(),
        value,
    })
}

fn parse_flag(key: &'static str, value: String) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError {
            key,
            value,
            reason: "expected true|false".to_string(),
        }),
    }
}
