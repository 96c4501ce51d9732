//! One-shot subcommands for scripting around the project store.

use anyhow::Result;
use projects_core::{ProjectId, ProjectRepository, ProjectService};
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;

/// Output format for listing commands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Rebuilds the tables from the bundled scripts, or from the given files.
pub fn init<P: ProjectRepository>(
    service: &mut ProjectService<P>,
    scripts: Option<(PathBuf, PathBuf)>,
    out: &mut impl Write,
) -> Result<()> {
    match scripts {
        Some((schema, data)) => service.load_scripts(&[schema, data])?,
        None => service.create_and_populate_tables()?,
    }
    writeln!(out, "Tables created and populated!")?;
    Ok(())
}

pub fn list<P: ProjectRepository>(
    service: &ProjectService<P>,
    format: OutputFormat,
    out: &mut impl Write,
) -> Result<()> {
    let projects = service.fetch_all_projects()?;
    match format {
        OutputFormat::Text => {
            writeln!(out, "Projects:")?;
            for project in &projects {
                writeln!(out, "  {}: {}", project.project_id, project.project_name)?;
            }
        }
        OutputFormat::Json => write_json(out, &projects)?,
    }
    Ok(())
}

pub fn show<P: ProjectRepository>(
    service: &mut ProjectService<P>,
    project_id: ProjectId,
    format: OutputFormat,
    out: &mut impl Write,
) -> Result<()> {
    let project = service.fetch_project_by_id(project_id)?;
    match format {
        OutputFormat::Text => write!(out, "{project}")?,
        OutputFormat::Json => write_json(out, &project)?,
    }
    Ok(())
}

fn write_json(out: &mut impl Write, value: &impl Serialize) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}
