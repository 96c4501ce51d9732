//! Console entry point for the projects application.
//!
//! # Responsibility
//! - Resolve configuration, start logging and open the database.
//! - Run the interactive menu, or a one-shot subcommand when given.

mod commands;
mod config;
mod menu;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use commands::OutputFormat;
use config::AppConfig;
use log::{error, info};
use menu::ProjectsApp;
use projects_core::db::open_db;
use projects_core::{init_logging, ProjectId, ProjectService, SqliteProjectRepository};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "projects")]
#[command(author, version, about = "Manage DIY project records", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// SQLite database file
    #[arg(long, global = true, env = "PROJECTS_DB", default_value = "projects.db")]
    db: PathBuf,

    /// Directory for rotated log files
    #[arg(long, global = true, env = "PROJECTS_LOG_DIR")]
    log_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "PROJECTS_LOG_LEVEL")]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create and populate all tables
    Init {
        /// Schema script to run instead of the bundled one
        #[arg(long, requires = "data")]
        schema: Option<PathBuf>,
        /// Data script to run instead of the bundled one
        #[arg(long, requires = "schema")]
        data: Option<PathBuf>,
    },

    /// List projects
    List {
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Show one project with its materials, steps and categories
    Show {
        /// Project ID
        id: ProjectId,
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let code = match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_exit module=cli status=error error={err:#}");
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    };
    // The logger handle lives in a static that is never dropped.
    log::logger().flush();
    code
}

fn run(cli: Cli) -> Result<()> {
    let config = AppConfig::resolve(cli.db, cli.log_dir, cli.log_level)?;
    if let Err(err) = init_logging(&config.log_level, &config.log_dir) {
        eprintln!("warning: file logging disabled: {err}");
    }
    info!(
        "event=cli_start module=cli status=ok db_path={}",
        config.db_path.display()
    );

    let mut conn = open_db(&config.db_path)
        .with_context(|| format!("failed to open database `{}`", config.db_path.display()))?;
    let repo = SqliteProjectRepository::try_new(&mut conn)?;
    let mut service = ProjectService::new(repo);
    let mut stdout = io::stdout().lock();

    match cli.command {
        None => ProjectsApp::new(service, io::stdin().lock(), stdout).run(),
        Some(Commands::Init { schema, data }) => {
            commands::init(&mut service, schema.zip(data), &mut stdout)
        }
        Some(Commands::List { format }) => commands::list(&service, format, &mut stdout),
        Some(Commands::Show { id, format }) => {
            commands::show(&mut service, id, format, &mut stdout)
        }
    }
}
