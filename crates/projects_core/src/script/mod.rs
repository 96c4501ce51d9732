//! SQL script loading for table bootstrap.
//!
//! # Responsibility
//! - Ship the schema and seed-data scripts with the binary.
//! - Turn script text into individual statements for batch execution.
//!
//! # See also
//! - resources/projects_schema.sql
//! - resources/project_data.sql

pub mod loader;

pub use loader::{load_script_file, split_sql_script, ScriptError};

/// Drops and recreates every project table.
pub const SCHEMA_SCRIPT: &str = include_str!("../../resources/projects_schema.sql");
/// Seeds sample projects with materials, steps and categories.
pub const DATA_SCRIPT: &str = include_str!("../../resources/project_data.sql");
