//! Storage bootstrap: open the configured store and provision the catalogue.

use crate::config::{ServerConfig, StorageBackend};
use crate::web::{AppState, SharedRepository};
use log::info;
use mergington_core::db::{open_storage, DbError};
use mergington_core::{
    default_activities, load_seed_file, seed_activities, InMemoryActivityRepository, SeedError,
    SqliteActivityRepository,
};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Failures that prevent the server from starting.
#[derive(Debug)]
pub enum StartupError {
    Config(crate::config::ConfigError),
    Logging(String),
    Db(DbError),
    Seed(SeedError),
    Io(std::io::Error),
}

impl Display for StartupError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(err) => write!(f, "configuration error: {err}"),
            Self::Logging(message) => write!(f, "logging setup failed: {message}"),
            Self::Db(err) => write!(f, "database setup failed: {err}"),
            Self::Seed(err) => write!(f, "seeding failed: {err}"),
            Self::Io(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StartupError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Logging(_) => None,
            Self::Db(err) => Some(err),
            Self::Seed(err) => Some(err),
            Self::Io(err) => Some(err),
        }
    }
}

impl From<crate::config::ConfigError> for StartupError {
    fn from(value: crate::config::ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<DbError> for StartupError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<SeedError> for StartupError {
    fn from(value: SeedError) -> Self {
        Self::Seed(value)
    }
}

impl From<std::io::Error> for StartupError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

/// Opens the configured store, provisions seed data, and wraps it in state.
pub fn build_state(config: &ServerConfig) -> Result<AppState, StartupError> {
    let repo: SharedRepository = match config.backend {
        StorageBackend::Sqlite => {
            Arc::new(SqliteActivityRepository::new(open_storage(&config.storage)?))
        }
        StorageBackend::Memory => Arc::new(InMemoryActivityRepository::new()),
    };

    if config.seed_defaults {
        seed_activities(repo.as_ref(), &default_activities())?;
    }
    if let Some(path) = &config.seed_file {
        let activities = load_seed_file(path)?;
        seed_activities(repo.as_ref(), &activities)?;
    }

    info!(
        "event=storage_ready module=bootstrap status=ok backend={:?} seed_defaults={} seed_file={}",
        config.backend,
        config.seed_defaults,
        config.seed_file.is_some()
    );
    Ok(AppState::new(repo))
}
