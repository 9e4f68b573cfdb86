//! Domain model for extracurricular activities.
//!
//! # Responsibility
//! - Define the canonical activity document and its listing projection.
//! - Provide invariant checks shared by every store implementation.
//!
//! # Invariants
//! - Every activity is identified by its unique `name`.
//! - Rosters never exceed capacity and never repeat an email.

pub mod activity;
