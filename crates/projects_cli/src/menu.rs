//! Interactive numbered menu over line-based input.
//!
//! # Responsibility
//! - Print the operation list and the currently selected project.
//! - Collect and parse user input, then delegate to `ProjectService`.
//! - Report every action error and keep the loop running.
//!
//! # Invariants
//! - Blank input (or end of input) at the selection prompt exits the loop.
//! - Blank input at a field prompt means "no value" or "keep current value".

use anyhow::{bail, Result};
use log::{info, warn};
use projects_core::{
    Amount, NewMaterial, NewStep, Project, ProjectDetails, ProjectId,
    ProjectRepository, ProjectService,
};
use std::fmt::Display;
use std::io::{BufRead, Write};
use std::str::FromStr;

const OPERATIONS: &[&str] = &[
    "0) Create and populate all tables",
    "1) Add a project",
    "2) List projects",
    "3) Select a project",
    "4) Update project details",
    "5) Delete a project",
    "6) Add a material to the current project",
    "7) Add a step to the current project",
    "8) Add a category to the current project",
];

const EXIT_SELECTION: i64 = -1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuFlow {
    Continue,
    Exit,
}

/// Console front end holding the service and the current project.
pub struct ProjectsApp<P: ProjectRepository, R: BufRead, W: Write> {
    service: ProjectService<P>,
    input: R,
    output: W,
    current: Option<Project>,
}

impl<P: ProjectRepository, R: BufRead, W: Write> ProjectsApp<P, R, W> {
    pub fn new(service: ProjectService<P>, input: R, output: W) -> Self {
        Self {
            service,
            input,
            output,
            current: None,
        }
    }

    /// Runs the menu until the user exits.
    ///
    /// Action errors are printed and the loop continues; only failures to
    /// write to the output end the loop early.
    pub fn run(&mut self) -> Result<()> {
        info!("event=menu_start module=cli status=ok");
        loop {
            match self.process_user_selection() {
                Ok(MenuFlow::Exit) => break,
                Ok(MenuFlow::Continue) => {}
                Err(err) => {
                    warn!("event=menu_action module=cli status=error error={err}");
                    writeln!(self.output, "\nError: {err} Try again.")?;
                }
            }
        }
        info!("event=menu_exit module=cli status=ok");
        Ok(())
    }

    fn process_user_selection(&mut self) -> Result<MenuFlow> {
        let selection = self.get_user_selection()?;
        match selection {
            EXIT_SELECTION => {
                writeln!(self.output, "Exiting the menu.")?;
                return Ok(MenuFlow::Exit);
            }
            0 => self.create_tables()?,
            1 => self.create_project()?,
            2 => self.list_projects()?,
            3 => self.select_project()?,
            4 => self.update_project_details()?,
            5 => self.delete_project()?,
            6 => self.add_material()?,
            7 => self.add_step()?,
            8 => self.add_category()?,
            other => writeln!(
                self.output,
                "\n{other} is not a valid selection. Try again."
            )?,
        }
        Ok(MenuFlow::Continue)
    }

    fn create_tables(&mut self) -> Result<()> {
        self.service.create_and_populate_tables()?;
        self.current = None;
        writeln!(self.output, "\nTables created and populated!")?;
        Ok(())
    }

    fn create_project(&mut self) -> Result<()> {
        let project_name = self.get_string_input("Enter the project name")?;
        let estimated_hours = self.get_decimal_input("Enter the estimated hours")?;
        let actual_hours = self.get_decimal_input("Enter the actual hours")?;
        let difficulty = self.get_int_input("Enter the project difficulty (1-5)")?;
        let notes = self.get_string_input("Enter the project notes")?;

        let details = ProjectDetails {
            project_name: project_name.unwrap_or_default(),
            estimated_hours,
            actual_hours,
            difficulty,
            notes,
        };

        let project = self.service.add_project(details)?;
        writeln!(
            self.output,
            "You have successfully created project: {project}"
        )?;
        Ok(())
    }

    fn list_projects(&mut self) -> Result<()> {
        let projects = self.service.fetch_all_projects()?;

        writeln!(self.output, "\nProjects:")?;
        for project in &projects {
            writeln!(
                self.output,
                "  {}: {}",
                project.project_id, project.project_name
            )?;
        }
        Ok(())
    }

    fn select_project(&mut self) -> Result<()> {
        self.list_projects()?;
        let project_id = self.require_project_id("Enter a project ID to select a project")?;

        self.current = None;
        self.current = Some(self.service.fetch_project_by_id(project_id)?);
        Ok(())
    }

    fn update_project_details(&mut self) -> Result<()> {
        let Some(current) = self.current.clone() else {
            writeln!(self.output, "\nPlease select a project.")?;
            return Ok(());
        };

        let project_name = self.get_string_input(&format!(
            "Enter the project name [{}]",
            current.project_name
        ))?;
        let estimated_hours = self.get_decimal_input(&format!(
            "Enter the estimated hours [{}]",
            shown(&current.estimated_hours)
        ))?;
        let actual_hours = self.get_decimal_input(&format!(
            "Enter the actual hours [{}]",
            shown(&current.actual_hours)
        ))?;
        let difficulty = self.get_int_input(&format!(
            "Enter the project difficulty (1-5) [{}]",
            shown(&current.difficulty)
        ))?;
        let notes =
            self.get_string_input(&format!("Enter the project notes [{}]", shown(&current.notes)))?;

        let details = ProjectDetails {
            project_name: project_name.unwrap_or(current.project_name),
            estimated_hours: estimated_hours.or(current.estimated_hours),
            actual_hours: actual_hours.or(current.actual_hours),
            difficulty: difficulty.or(current.difficulty),
            notes: notes.or(current.notes),
        };

        self.service
            .modify_project_details(current.project_id, &details)?;
        self.current = Some(self.service.fetch_project_by_id(current.project_id)?);
        writeln!(
            self.output,
            "Project {} was updated successfully.",
            current.project_id
        )?;
        Ok(())
    }

    fn delete_project(&mut self) -> Result<()> {
        self.list_projects()?;
        let project_id = self.require_project_id("Enter the ID of the project to delete")?;

        self.service.delete_project(project_id)?;
        writeln!(
            self.output,
            "Project {project_id} was deleted successfully."
        )?;

        if self
            .current
            .as_ref()
            .is_some_and(|project| project.project_id == project_id)
        {
            self.current = None;
        }
        Ok(())
    }

    fn add_material(&mut self) -> Result<()> {
        let Some(project_id) = self.current_project_id()? else {
            return Ok(());
        };

        let material_name = self.get_string_input("Enter the material name")?;
        let num_required = self.get_int_input("Enter the number required")?;
        let cost = self.get_decimal_input("Enter the cost")?;
        let material = NewMaterial {
            material_name: material_name.unwrap_or_default(),
            num_required,
            cost,
        };

        self.current = Some(self.service.add_material(project_id, &material)?);
        writeln!(self.output, "Material added to project {project_id}.")?;
        Ok(())
    }

    fn add_step(&mut self) -> Result<()> {
        let Some(project_id) = self.current_project_id()? else {
            return Ok(());
        };

        let step_text = self.get_string_input("Enter the step text")?;
        let step = NewStep {
            step_text: step_text.unwrap_or_default(),
        };

        self.current = Some(self.service.add_step(project_id, &step)?);
        writeln!(self.output, "Step added to project {project_id}.")?;
        Ok(())
    }

    fn add_category(&mut self) -> Result<()> {
        let Some(project_id) = self.current_project_id()? else {
            return Ok(());
        };

        let categories = self.service.fetch_all_categories()?;
        writeln!(self.output, "\nCategories:")?;
        for category in &categories {
            writeln!(
                self.output,
                "  {}: {}",
                category.category_id, category.category_name
            )?;
        }

        let category_name = self.get_string_input("Enter a category name")?;
        self.current = Some(
            self.service
                .add_category(project_id, &category_name.unwrap_or_default())?,
        );
        writeln!(self.output, "Category added to project {project_id}.")?;
        Ok(())
    }

    fn current_project_id(&mut self) -> Result<Option<ProjectId>> {
        match &self.current {
            Some(project) => Ok(Some(project.project_id)),
            None => {
                writeln!(self.output, "\nPlease select a project.")?;
                Ok(None)
            }
        }
    }

    fn get_user_selection(&mut self) -> Result<i64> {
        self.print_operations()?;
        let selection = self.get_int_input("Enter a menu selection")?;
        Ok(selection.unwrap_or(EXIT_SELECTION))
    }

    fn print_operations(&mut self) -> Result<()> {
        writeln!(
            self.output,
            "\nThese are the available selections. Press the Enter key to quit:"
        )?;
        for line in OPERATIONS {
            writeln!(self.output, "  {line}")?;
        }

        match &self.current {
            Some(project) => writeln!(self.output, "\nYou are working with project: {project}")?,
            None => writeln!(self.output, "\nYou are not working with a project.")?,
        }
        Ok(())
    }

    fn require_project_id(&mut self, prompt: &str) -> Result<ProjectId> {
        match self.get_int_input(prompt)? {
            Some(project_id) => Ok(project_id),
            None => bail!("A project ID is required."),
        }
    }

    fn get_decimal_input(&mut self, prompt: &str) -> Result<Option<Amount>> {
        let Some(input) = self.get_string_input(prompt)? else {
            return Ok(None);
        };
        let amount: Amount = input.parse()?;
        Ok(Some(amount))
    }

    fn get_int_input<T: FromStr>(&mut self, prompt: &str) -> Result<Option<T>> {
        let Some(input) = self.get_string_input(prompt)? else {
            return Ok(None);
        };
        match input.parse() {
            Ok(value) => Ok(Some(value)),
            Err(_) => bail!("{input} is not a valid number."),
        }
    }

    fn get_string_input(&mut self, prompt: &str) -> Result<Option<String>> {
        write!(self.output, "{prompt}: ")?;
        self.output.flush()?;

        let mut line = String::new();
        self.input.read_line(&mut line)?;
        let trimmed = line.trim();
        Ok(if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        })
    }
}

fn shown<T: Display>(value: &Option<T>) -> String {
    value
        .as_ref()
        .map_or_else(|| "null".to_string(), ToString::to_string)
}
