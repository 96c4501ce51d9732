//! Runtime configuration resolved from flags and environment.
//!
//! # Invariants
//! - `log_dir` is always absolute; relative input is anchored at the
//!   current directory.

use anyhow::{Context, Result};
use projects_core::default_log_level;
use std::path::{Path, PathBuf};

const APP_DIR_NAME: &str = "projects";
const LOG_DIR_NAME: &str = "logs";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub log_dir: PathBuf,
    pub log_level: String,
}

impl AppConfig {
    /// Fills unset values with defaults.
    ///
    /// The default log directory is `<local data dir>/projects/logs`, or
    /// `./logs` on platforms without one.
    pub fn resolve(
        db_path: PathBuf,
        log_dir: Option<PathBuf>,
        log_level: Option<String>,
    ) -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to read current directory")?;
        let log_dir = match log_dir {
            Some(dir) => dir,
            None => dirs::data_local_dir()
                .map(|dir| dir.join(APP_DIR_NAME).join(LOG_DIR_NAME))
                .unwrap_or_else(|| PathBuf::from(LOG_DIR_NAME)),
        };

        Ok(Self {
            db_path,
            log_dir: absolutize(&cwd, log_dir),
            log_level: log_level.unwrap_or_else(|| default_log_level().to_string()),
        })
    }
}

fn absolutize(base: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        base.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::{absolutize, AppConfig};
    use std::path::{Path, PathBuf};

    #[test]
    fn explicit_values_are_kept() {
        let config = AppConfig::resolve(
            PathBuf::from("mine.db"),
            Some(PathBuf::from("/var/log/projects")),
            Some("warn".to_string()),
        )
        .unwrap();
        assert_eq!(config.db_path, PathBuf::from("mine.db"));
        assert_eq!(config.log_dir, PathBuf::from("/var/log/projects"));
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn defaults_produce_absolute_log_dir() {
        let config = AppConfig::resolve(PathBuf::from("projects.db"), None, None).unwrap();
        assert!(config.log_dir.is_absolute());
        assert!(config.log_dir.ends_with("logs"));
        assert_eq!(config.log_level, projects_core::default_log_level());
    }

    #[test]
    fn relative_paths_are_anchored() {
        assert_eq!(
            absolutize(Path::new("/work"), PathBuf::from("logs")),
            PathBuf::from("/work/logs")
        );
    }
}
