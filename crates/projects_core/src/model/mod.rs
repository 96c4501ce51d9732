//! Domain model for project records.
//!
//! # Responsibility
//! - Define flat records mirroring the `project`, `material`, `step` and
//!   `category` tables.
//! - Own field-level validation applied before any write.
//!
//! # Invariants
//! - Referential integrity lives in SQLite, not in these types.

pub mod amount;
pub mod project;
