//! Project repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Issue parameterized SQL against `project` and its child tables.
//! - Map rows into model records.
//!
//! # Invariants
//! - A dropped (uncommitted) `Transaction` rolls back, so any `?` exit
//!   leaves the database unchanged.
//! - Child inserts for a missing project return `NotFound` instead of
//!   relying on the foreign-key error text.

use crate::db::DbError;
use crate::model::project::{
    validate_category_name, Category, Material, MaterialId, NewMaterial, NewStep, Project,
    ProjectDetails, ProjectId, ProjectValidationError, Step,
};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction};
use std::error::Error;
use std::fmt::{Display, Formatter};

const PROJECT_TABLE: &str = "project";
const CATEGORY_TABLE: &str = "category";
const PROJECT_CATEGORY_TABLE: &str = "project_category";
const STEP_TABLE: &str = "step";
const MATERIAL_TABLE: &str = "material";

const PROJECT_SELECT_SQL: &str = "SELECT
    project_id,
    project_name,
    estimated_hours,
    actual_hours,
    difficulty,
    notes
FROM project";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for project persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(ProjectValidationError),
    Db(DbError),
    NotFound(ProjectId),
    MissingRequiredTable(&'static str),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "Project with ID={id} does not exist."),
            Self::MissingRequiredTable(table) => write!(
                f,
                "required table `{table}` is missing; create and populate the tables first."
            ),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) | Self::MissingRequiredTable(_) => None,
        }
    }
}

impl From<ProjectValidationError> for RepoError {
    fn from(value: ProjectValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Data-access contract for projects and their child records.
pub trait ProjectRepository {
    /// Inserts a project row and returns its generated id.
    fn insert_project(&mut self, details: &ProjectDetails) -> RepoResult<ProjectId>;
    /// Lists project rows ordered by name. Child lists are left empty.
    fn fetch_all_projects(&self) -> RepoResult<Vec<Project>>;
    /// Loads one project with materials, steps and categories.
    fn fetch_project_by_id(&mut self, project_id: ProjectId) -> RepoResult<Option<Project>>;
    /// Overwrites the editable columns. Returns whether exactly one row changed.
    fn modify_project_details(
        &mut self,
        project_id: ProjectId,
        details: &ProjectDetails,
    ) -> RepoResult<bool>;
    /// Deletes a project; children cascade. Returns whether exactly one row went away.
    fn delete_project(&mut self, project_id: ProjectId) -> RepoResult<bool>;
    fn insert_material(
        &mut self,
        project_id: ProjectId,
        material: &NewMaterial,
    ) -> RepoResult<MaterialId>;
    /// Appends a step after the project's current last step.
    fn insert_step(&mut self, project_id: ProjectId, step: &NewStep) -> RepoResult<Step>;
    /// Links a category by name, creating the category when no name matches.
    fn add_category_to_project(
        &mut self,
        project_id: ProjectId,
        category_name: &str,
    ) -> RepoResult<Category>;
    fn fetch_all_categories(&self) -> RepoResult<Vec<Category>>;
    /// Runs statements in order inside one transaction.
    fn execute_batch(&mut self, statements: &[String]) -> RepoResult<()>;
}

/// SQLite-backed project repository.
pub struct SqliteProjectRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteProjectRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        ensure_tables_exist(conn)?;
        Ok(Self { conn })
    }
}

impl ProjectRepository for SqliteProjectRepository<'_> {
    fn insert_project(&mut self, details: &ProjectDetails) -> RepoResult<ProjectId> {
        details.validate()?;

        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO project (
                project_name,
                estimated_hours,
                actual_hours,
                difficulty,
                notes
            ) VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                details.project_name.as_str(),
                details.estimated_hours,
                details.actual_hours,
                details.difficulty,
                details.notes.as_deref(),
            ],
        )?;
        let project_id = tx.last_insert_rowid();
        tx.commit()?;

        Ok(project_id)
    }

    fn fetch_all_projects(&self) -> RepoResult<Vec<Project>> {
        // Read-only, so a shared borrow is enough to open the transaction.
        let tx = self.conn.unchecked_transaction()?;
        let mut projects = Vec::new();
        {
            let mut stmt = tx.prepare(&format!("{PROJECT_SELECT_SQL} ORDER BY project_name;"))?;
            let mut rows = stmt.query([])?;
            while let Some(row) = rows.next()? {
                projects.push(parse_project_row(row)?);
            }
        }
        tx.commit()?;

        Ok(projects)
    }

    fn fetch_project_by_id(&mut self, project_id: ProjectId) -> RepoResult<Option<Project>> {
        let tx = self.conn.transaction()?;

        let project = tx
            .query_row(
                &format!("{PROJECT_SELECT_SQL} WHERE project_id = ?1;"),
                [project_id],
                parse_project_row,
            )
            .optional()?;

        let project = match project {
            Some(mut project) => {
                project.materials = fetch_materials_for_project(&tx, project_id)?;
                project.steps = fetch_steps_for_project(&tx, project_id)?;
                project.categories = fetch_categories_for_project(&tx, project_id)?;
                Some(project)
            }
            None => None,
        };
        tx.commit()?;

        Ok(project)
    }

    fn modify_project_details(
        &mut self,
        project_id: ProjectId,
        details: &ProjectDetails,
    ) -> RepoResult<bool> {
        details.validate()?;

        let tx = self.conn.transaction()?;
        let changed = tx.execute(
            "UPDATE project
             SET
                project_name = ?1,
                estimated_hours = ?2,
                actual_hours = ?3,
                difficulty = ?4,
                notes = ?5
             WHERE project_id = ?6;",
            params![
                details.project_name.as_str(),
                details.estimated_hours,
                details.actual_hours,
                details.difficulty,
                details.notes.as_deref(),
                project_id,
            ],
        )?;
        tx.commit()?;

        Ok(changed == 1)
    }

    fn delete_project(&mut self, project_id: ProjectId) -> RepoResult<bool> {
        let tx = self.conn.transaction()?;
        let deleted = tx.execute("DELETE FROM project WHERE project_id = ?1;", [project_id])?;
        tx.commit()?;

        Ok(deleted == 1)
    }

    fn insert_material(
        &mut self,
        project_id: ProjectId,
        material: &NewMaterial,
    ) -> RepoResult<MaterialId> {
        material.validate()?;

        let tx = self.conn.transaction()?;
        ensure_project_exists(&tx, project_id)?;
        tx.execute(
            "INSERT INTO material (project_id, material_name, num_required, cost)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                project_id,
                material.material_name.as_str(),
                material.num_required,
                material.cost,
            ],
        )?;
        let material_id = tx.last_insert_rowid();
        tx.commit()?;

        Ok(material_id)
    }

    fn insert_step(&mut self, project_id: ProjectId, step: &NewStep) -> RepoResult<Step> {
        step.validate()?;

        let tx = self.conn.transaction()?;
        ensure_project_exists(&tx, project_id)?;
        let step_order: i32 = tx.query_row(
            "SELECT COALESCE(MAX(step_order), 0) + 1 FROM step WHERE project_id = ?1;",
            [project_id],
            |row| row.get(0),
        )?;
        tx.execute(
            "INSERT INTO step (project_id, step_text, step_order) VALUES (?1, ?2, ?3);",
            params![project_id, step.step_text.as_str(), step_order],
        )?;
        let step_id = tx.last_insert_rowid();
        tx.commit()?;

        Ok(Step {
            step_id,
            project_id,
            step_text: step.step_text.clone(),
            step_order,
        })
    }

    fn add_category_to_project(
        &mut self,
        project_id: ProjectId,
        category_name: &str,
    ) -> RepoResult<Category> {
        validate_category_name(category_name)?;

        let tx = self.conn.transaction()?;
        ensure_project_exists(&tx, project_id)?;

        let existing = tx
            .query_row(
                "SELECT category_id, category_name
                 FROM category
                 WHERE category_name = ?1 COLLATE NOCASE
                 ORDER BY category_id
                 LIMIT 1;",
                [category_name],
                parse_category_row,
            )
            .optional()?;

        let category = match existing {
            Some(category) => category,
            None => {
                tx.execute(
                    "INSERT INTO category (category_name) VALUES (?1);",
                    [category_name],
                )?;
                Category {
                    category_id: tx.last_insert_rowid(),
                    category_name: category_name.to_string(),
                }
            }
        };

        tx.execute(
            "INSERT OR IGNORE INTO project_category (project_id, category_id) VALUES (?1, ?2);",
            params![project_id, category.category_id],
        )?;
        tx.commit()?;

        Ok(category)
    }

    fn fetch_all_categories(&self) -> RepoResult<Vec<Category>> {
        let tx = self.conn.unchecked_transaction()?;
        let categories = {
            let mut stmt = tx.prepare(
                "SELECT category_id, category_name
                 FROM category
                 ORDER BY category_name COLLATE NOCASE ASC, category_id ASC;",
            )?;
            let categories = stmt
                .query_map([], parse_category_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            categories
        };
        tx.commit()?;

        Ok(categories)
    }

    fn execute_batch(&mut self, statements: &[String]) -> RepoResult<()> {
        let tx = self.conn.transaction()?;
        for sql in statements {
            tx.execute_batch(sql)?;
        }
        tx.commit()?;
        Ok(())
    }
}

fn fetch_materials_for_project(
    tx: &Transaction<'_>,
    project_id: ProjectId,
) -> RepoResult<Vec<Material>> {
    let mut stmt = tx.prepare(
        "SELECT m.material_id, m.project_id, m.material_name, m.num_required, m.cost
         FROM material m
         WHERE m.project_id = ?1
         ORDER BY m.material_id;",
    )?;
    let materials = stmt
        .query_map([project_id], |row| {
            Ok(Material {
                material_id: row.get("material_id")?,
                project_id: row.get("project_id")?,
                material_name: row.get("material_name")?,
                num_required: row.get("num_required")?,
                cost: row.get("cost")?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(materials)
}

fn fetch_steps_for_project(tx: &Transaction<'_>, project_id: ProjectId) -> RepoResult<Vec<Step>> {
    let mut stmt = tx.prepare(
        "SELECT s.step_id, s.project_id, s.step_text, s.step_order
         FROM step s
         WHERE s.project_id = ?1
         ORDER BY s.step_order, s.step_id;",
    )?;
    let steps = stmt
        .query_map([project_id], |row| {
            Ok(Step {
                step_id: row.get("step_id")?,
                project_id: row.get("project_id")?,
                step_text: row.get("step_text")?,
                step_order: row.get("step_order")?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(steps)
}

fn fetch_categories_for_project(
    tx: &Transaction<'_>,
    project_id: ProjectId,
) -> RepoResult<Vec<Category>> {
    let mut stmt = tx.prepare(
        "SELECT c.category_id, c.category_name
         FROM category c
         INNER JOIN project_category pc ON pc.category_id = c.category_id
         WHERE pc.project_id = ?1
         ORDER BY c.category_id;",
    )?;
    let categories = stmt
        .query_map([project_id], parse_category_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(categories)
}

fn parse_project_row(row: &Row<'_>) -> rusqlite::Result<Project> {
    Ok(Project {
        project_id: row.get("project_id")?,
        project_name: row.get("project_name")?,
        estimated_hours: row.get("estimated_hours")?,
        actual_hours: row.get("actual_hours")?,
        difficulty: row.get("difficulty")?,
        notes: row.get("notes")?,
        materials: Vec::new(),
        steps: Vec::new(),
        categories: Vec::new(),
    })
}

fn parse_category_row(row: &Row<'_>) -> rusqlite::Result<Category> {
    Ok(Category {
        category_id: row.get("category_id")?,
        category_name: row.get("category_name")?,
    })
}

fn ensure_project_exists(tx: &Transaction<'_>, project_id: ProjectId) -> RepoResult<()> {
    let exists: i64 = tx.query_row(
        "SELECT EXISTS(SELECT 1 FROM project WHERE project_id = ?1);",
        [project_id],
        |row| row.get(0),
    )?;
    if exists == 1 {
        Ok(())
    } else {
        Err(RepoError::NotFound(project_id))
    }
}

fn ensure_tables_exist(conn: &Connection) -> RepoResult<()> {
    for table in [
        PROJECT_TABLE,
        CATEGORY_TABLE,
        PROJECT_CATEGORY_TABLE,
        STEP_TABLE,
        MATERIAL_TABLE,
    ] {
        let exists: i64 = conn.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table],
            |row| row.get(0),
        )?;
        if exists != 1 {
            return Err(RepoError::MissingRequiredTable(table));
        }
    }
    Ok(())
}
