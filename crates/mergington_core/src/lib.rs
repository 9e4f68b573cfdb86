//! Core domain logic for the Mergington activities backend.
//! This crate is the single source of truth for signup invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod seed;
pub mod service;

pub use config::StorageConfig;
pub use logging::{default_log_level, init_logging};
pub use model::activity::{
    Activity, ActivityDetails, ActivityValidationError, Confirmation, ConfirmationKind,
};
pub use repo::activity_repo::{
    ActivityRepository, AppendOutcome, InMemoryActivityRepository, RemoveOutcome, RepoError,
    RepoResult, SqliteActivityRepository,
};
pub use seed::{default_activities, load_seed_file, seed_activities, SeedError};
pub use service::activity_service::{ActivityListing, ActivityService, ActivityServiceError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
