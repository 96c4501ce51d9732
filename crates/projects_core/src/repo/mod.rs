//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Every repository operation runs in its own transaction: commit on
//!   success, rollback on any error.
//! - Write paths validate their input before SQL mutations.

pub mod project_repo;
