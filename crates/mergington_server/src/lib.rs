//! HTTP surface for the Mergington activities backend.
//!
//! # Responsibility
//! - Map HTTP verbs and paths onto the activity service.
//! - Load runtime configuration and bootstrap storage.
//!
//! # Invariants
//! - HTTP status semantics live only in `web::error`.

pub mod bootstrap;
pub mod config;
pub mod web;

pub use bootstrap::{build_state, StartupError};
pub use config::{ConfigError, ServerConfig, StorageBackend};
pub use web::{build_router, AppState, SharedRepository};
