//! Core use-case services.
//!
//! # Responsibility
//! - Turn storage outcomes into typed domain results.
//! - Keep the HTTP layer decoupled from storage details.

pub mod activity_service;
