//! Project, material, step and category records.
//!
//! # Responsibility
//! - Define the editable project columns separately from persisted rows.
//! - Validate user-supplied values before they reach SQL.
//! - Render projects for console output.
//!
//! # Invariants
//! - `difficulty`, when set, is within `1..=5`.
//! - Hours and costs are never negative and fit `DECIMAL(7,2)`.

use crate::model::amount::Amount;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ProjectId = i64;
pub type MaterialId = i64;
pub type StepId = i64;
pub type CategoryId = i64;

pub const MAX_NAME_CHARS: usize = 128;
pub const DIFFICULTY_RANGE: std::ops::RangeInclusive<i32> = 1..=5;
/// Largest value a `DECIMAL(7,2)` column holds.
pub const MAX_AMOUNT: Amount = Amount::from_hundredths(9_999_999);

/// Validation error for project and child-record input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectValidationError {
    BlankField(&'static str),
    FieldTooLong {
        field: &'static str,
        max_chars: usize,
    },
    DifficultyOutOfRange(i32),
    NegativeValue(&'static str),
    AmountTooLarge {
        field: &'static str,
        value: Amount,
    },
}

impl Display for ProjectValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankField(field) => write!(f, "{field} must not be blank."),
            Self::FieldTooLong { field, max_chars } => {
                write!(f, "{field} must be at most {max_chars} characters.")
            }
            Self::DifficultyOutOfRange(value) => write!(
                f,
                "difficulty must be between {} and {}, got {value}.",
                DIFFICULTY_RANGE.start(),
                DIFFICULTY_RANGE.end()
            ),
            Self::NegativeValue(field) => write!(f, "{field} must not be negative."),
            Self::AmountTooLarge { field, value } => {
                write!(f, "{field} must be at most {MAX_AMOUNT}, got {value}.")
            }
        }
    }
}

impl Error for ProjectValidationError {}

/// Editable project columns, used for inserts and full-row updates.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ProjectDetails {
    pub project_name: String,
    pub estimated_hours: Option<Amount>,
    pub actual_hours: Option<Amount>,
    pub difficulty: Option<i32>,
    pub notes: Option<String>,
}

impl ProjectDetails {
    pub fn new(project_name: impl Into<String>) -> Self {
        Self {
            project_name: project_name.into(),
            ..Self::default()
        }
    }

    /// Checks column constraints the schema cannot express.
    pub fn validate(&self) -> Result<(), ProjectValidationError> {
        validate_name("project_name", &self.project_name)?;
        validate_amount("estimated_hours", self.estimated_hours)?;
        validate_amount("actual_hours", self.actual_hours)?;
        if let Some(difficulty) = self.difficulty {
            if !DIFFICULTY_RANGE.contains(&difficulty) {
                return Err(ProjectValidationError::DifficultyOutOfRange(difficulty));
            }
        }
        Ok(())
    }
}

/// Persisted project row plus its child records.
///
/// Child lists are only populated by single-project reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Project {
    pub project_id: ProjectId,
    pub project_name: String,
    pub estimated_hours: Option<Amount>,
    pub actual_hours: Option<Amount>,
    pub difficulty: Option<i32>,
    pub notes: Option<String>,
    pub materials: Vec<Material>,
    pub steps: Vec<Step>,
    pub categories: Vec<Category>,
}

impl Project {
    pub fn from_details(project_id: ProjectId, details: ProjectDetails) -> Self {
        Self {
            project_id,
            project_name: details.project_name,
            estimated_hours: details.estimated_hours,
            actual_hours: details.actual_hours,
            difficulty: details.difficulty,
            notes: details.notes,
            materials: Vec::new(),
            steps: Vec::new(),
            categories: Vec::new(),
        }
    }

    /// Copies the editable columns.
    pub fn details(&self) -> ProjectDetails {
        ProjectDetails {
            project_name: self.project_name.clone(),
            estimated_hours: self.estimated_hours,
            actual_hours: self.actual_hours,
            difficulty: self.difficulty,
            notes: self.notes.clone(),
        }
    }
}

impl Display for Project {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f)?;
        writeln!(f, "   ID={}", self.project_id)?;
        writeln!(f, "   name={}", self.project_name)?;
        writeln!(f, "   estimatedHours={}", OptionalField(&self.estimated_hours))?;
        writeln!(f, "   actualHours={}", OptionalField(&self.actual_hours))?;
        writeln!(f, "   difficulty={}", OptionalField(&self.difficulty))?;
        writeln!(f, "   notes={}", OptionalField(&self.notes))?;

        writeln!(f, "   Materials:")?;
        for material in &self.materials {
            writeln!(f, "      {material}")?;
        }
        writeln!(f, "   Steps:")?;
        for step in &self.steps {
            writeln!(f, "      {step}")?;
        }
        writeln!(f, "   Categories:")?;
        for category in &self.categories {
            writeln!(f, "      {category}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Material {
    pub material_id: MaterialId,
    pub project_id: ProjectId,
    pub material_name: String,
    pub num_required: Option<i32>,
    pub cost: Option<Amount>,
}

impl Display for Material {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "ID={}, materialName={}, numRequired={}, cost={}",
            self.material_id,
            self.material_name,
            OptionalField(&self.num_required),
            OptionalField(&self.cost)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Step {
    pub step_id: StepId,
    pub project_id: ProjectId,
    pub step_text: String,
    pub step_order: i32,
}

impl Display for Step {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "ID={}, stepOrder={}, stepText={}",
            self.step_id, self.step_order, self.step_text
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    pub category_id: CategoryId,
    pub category_name: String,
}

impl Display for Category {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "ID={}, categoryName={}",
            self.category_id, self.category_name
        )
    }
}

/// Input for attaching a material to a project.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewMaterial {
    pub material_name: String,
    pub num_required: Option<i32>,
    pub cost: Option<Amount>,
}

impl NewMaterial {
    pub fn validate(&self) -> Result<(), ProjectValidationError> {
        validate_name("material_name", &self.material_name)?;
        if self.num_required.is_some_and(|count| count < 0) {
            return Err(ProjectValidationError::NegativeValue("num_required"));
        }
        validate_amount("cost", self.cost)
    }
}

/// Input for appending a step to a project. Order is assigned on insert.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewStep {
    pub step_text: String,
}

impl NewStep {
    pub fn validate(&self) -> Result<(), ProjectValidationError> {
        if self.step_text.trim().is_empty() {
            return Err(ProjectValidationError::BlankField("step_text"));
        }
        Ok(())
    }
}

/// Checks a category name before it is looked up or inserted.
pub fn validate_category_name(name: &str) -> Result<(), ProjectValidationError> {
    validate_name("category_name", name)
}

fn validate_name(field: &'static str, value: &str) -> Result<(), ProjectValidationError> {
    if value.trim().is_empty() {
        return Err(ProjectValidationError::BlankField(field));
    }
    if value.chars().count() > MAX_NAME_CHARS {
        return Err(ProjectValidationError::FieldTooLong {
            field,
            max_chars: MAX_NAME_CHARS,
        });
    }
    Ok(())
}

fn validate_amount(field: &'static str, value: Option<Amount>) -> Result<(), ProjectValidationError> {
    match value {
        Some(amount) if amount.is_negative() => Err(ProjectValidationError::NegativeValue(field)),
        Some(amount) if amount > MAX_AMOUNT => {
            Err(ProjectValidationError::AmountTooLarge { field, value: amount })
        }
        _ => Ok(()),
    }
}

/// Renders `None` as `null`.
struct OptionalField<'a, T>(&'a Option<T>);

impl<T: Display> Display for OptionalField<'_, T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            Some(value) => write!(f, "{value}"),
            None => f.write_str("null"),
        }
    }
}
