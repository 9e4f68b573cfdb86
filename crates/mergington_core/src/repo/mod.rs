//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the storage contract the activity service depends on.
//! - Isolate SQLite query details from signup orchestration.
//!
//! # Invariants
//! - Conditional roster updates are atomic with their capacity and
//!   duplicate checks.
//! - Read paths reject invalid persisted documents instead of masking them.

pub mod activity_repo;
