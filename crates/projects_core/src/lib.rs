//! Core domain logic for the projects application.
//! Model, storage bootstrap, repository and service layers live here; the
//! console menu in `projects_cli` only collects input and prints results.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod script;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::amount::{Amount, ParseAmountError};
pub use model::project::{
    Category, CategoryId, Material, MaterialId, NewMaterial, NewStep, Project, ProjectDetails,
    ProjectId, ProjectValidationError, Step, StepId,
};
pub use repo::project_repo::{ProjectRepository, RepoError, RepoResult, SqliteProjectRepository};
pub use script::{split_sql_script, ScriptError};
pub use service::project_service::{ProjectService, ServiceError, ServiceResult};
