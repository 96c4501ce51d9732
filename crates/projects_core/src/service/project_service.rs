//! Project use-case service.
//!
//! # Responsibility
//! - Provide project CRUD entry points for the menu and subcommands.
//! - Turn "no row affected" repository results into not-found errors.
//! - Bootstrap tables from the bundled (or caller-supplied) SQL scripts.
//!
//! # Invariants
//! - Project listings are sorted by `project_id` ascending.
//! - Writes that add children return the refreshed parent project.

use crate::model::project::{
    Category, NewMaterial, NewStep, Project, ProjectDetails, ProjectId, ProjectValidationError,
};
use crate::repo::project_repo::{ProjectRepository, RepoError};
use crate::script::{load_script_file, split_sql_script, ScriptError, DATA_SCRIPT, SCHEMA_SCRIPT};
use log::{debug, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Service error for project use-cases.
#[derive(Debug)]
pub enum ServiceError {
    /// Input failed field validation.
    Invalid(ProjectValidationError),
    /// Target project does not exist.
    ProjectNotFound(ProjectId),
    /// Persistence-layer failure.
    Repo(RepoError),
    /// Script file could not be read.
    Script(ScriptError),
    /// Write succeeded but the row could not be read back.
    InconsistentState(&'static str),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Invalid(err) => write!(f, "{err}"),
            Self::ProjectNotFound(project_id) => {
                write!(f, "Project with project ID={project_id} does not exist.")
            }
            Self::Repo(err) => write!(f, "{err}"),
            Self::Script(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent project state: {details}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Invalid(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::Script(err) => Some(err),
            Self::ProjectNotFound(_) | Self::InconsistentState(_) => None,
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(project_id) => Self::ProjectNotFound(project_id),
            RepoError::Validation(err) => Self::Invalid(err),
            other => Self::Repo(other),
        }
    }
}

impl From<ScriptError> for ServiceError {
    fn from(value: ScriptError) -> Self {
        Self::Script(value)
    }
}

/// Project service facade over repository implementations.
pub struct ProjectService<R: ProjectRepository> {
    repo: R,
}

impl<R: ProjectRepository> ProjectService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Inserts a project and returns it as stored.
    pub fn add_project(&mut self, details: ProjectDetails) -> ServiceResult<Project> {
        details.validate().map_err(ServiceError::Invalid)?;
        let project_id = self.repo.insert_project(&details)?;
        info!("event=project_create module=service status=ok project_id={project_id}");

        self.repo
            .fetch_project_by_id(project_id)?
            .ok_or(ServiceError::InconsistentState(
                "created project not found in read-back",
            ))
    }

    /// Lists all projects in id order, without child records.
    pub fn fetch_all_projects(&self) -> ServiceResult<Vec<Project>> {
        let mut projects = self.repo.fetch_all_projects()?;
        projects.sort_by_key(|project| project.project_id);
        debug!(
            "event=project_list module=service status=ok count={}",
            projects.len()
        );
        Ok(projects)
    }

    /// Loads one project with its materials, steps and categories.
    pub fn fetch_project_by_id(&mut self, project_id: ProjectId) -> ServiceResult<Project> {
        self.repo
            .fetch_project_by_id(project_id)?
            .ok_or(ServiceError::ProjectNotFound(project_id))
    }

    /// Overwrites a project's editable columns.
    pub fn modify_project_details(
        &mut self,
        project_id: ProjectId,
        details: &ProjectDetails,
    ) -> ServiceResult<()> {
        details.validate().map_err(ServiceError::Invalid)?;
        if !self.repo.modify_project_details(project_id, details)? {
            return Err(ServiceError::ProjectNotFound(project_id));
        }
        info!("event=project_update module=service status=ok project_id={project_id}");
        Ok(())
    }

    /// Deletes a project and, through cascading keys, its children.
    pub fn delete_project(&mut self, project_id: ProjectId) -> ServiceResult<()> {
        if !self.repo.delete_project(project_id)? {
            return Err(ServiceError::ProjectNotFound(project_id));
        }
        info!("event=project_delete module=service status=ok project_id={project_id}");
        Ok(())
    }

    /// Adds a material and returns the refreshed project.
    pub fn add_material(
        &mut self,
        project_id: ProjectId,
        material: &NewMaterial,
    ) -> ServiceResult<Project> {
        let material_id = self.repo.insert_material(project_id, material)?;
        info!(
            "event=material_create module=service status=ok project_id={project_id} material_id={material_id}"
        );
        self.fetch_project_by_id(project_id)
    }

    /// Appends a step and returns the refreshed project.
    pub fn add_step(&mut self, project_id: ProjectId, step: &NewStep) -> ServiceResult<Project> {
        let created = self.repo.insert_step(project_id, step)?;
        info!(
            "event=step_create module=service status=ok project_id={project_id} step_id={} step_order={}",
            created.step_id, created.step_order
        );
        self.fetch_project_by_id(project_id)
    }

    /// Links a category by name and returns the refreshed project.
    pub fn add_category(
        &mut self,
        project_id: ProjectId,
        category_name: &str,
    ) -> ServiceResult<Project> {
        let category = self
            .repo
            .add_category_to_project(project_id, category_name.trim())?;
        info!(
            "event=category_link module=service status=ok project_id={project_id} category_id={}",
            category.category_id
        );
        self.fetch_project_by_id(project_id)
    }

    /// Lists all known categories by name.
    pub fn fetch_all_categories(&self) -> ServiceResult<Vec<Category>> {
        Ok(self.repo.fetch_all_categories()?)
    }

    /// Drops, recreates and seeds all tables from the bundled scripts.
    pub fn create_and_populate_tables(&mut self) -> ServiceResult<()> {
        self.run_script("projects_schema.sql", SCHEMA_SCRIPT)?;
        self.run_script("project_data.sql", DATA_SCRIPT)?;
        Ok(())
    }

    /// Executes script files from disk in the given order.
    pub fn load_scripts<P: AsRef<Path>>(&mut self, paths: &[P]) -> ServiceResult<()> {
        for path in paths {
            let path = path.as_ref();
            let content = load_script_file(path)?;
            self.run_script(&path.display().to_string(), &content)?;
        }
        Ok(())
    }

    fn run_script(&mut self, name: &str, content: &str) -> ServiceResult<()> {
        let statements = split_sql_script(content);
        self.repo.execute_batch(&statements)?;
        info!(
            "event=script_execute module=service status=ok script={name} statements={}",
            statements.len()
        );
        Ok(())
    }
}
