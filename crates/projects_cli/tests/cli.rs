use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;

fn projects(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("projects").unwrap();
    cmd.env_remove("PROJECTS_DB")
        .env_remove("PROJECTS_LOG_LEVEL")
        .arg("--db")
        .arg(dir.join("projects.db"))
        .arg("--log-dir")
        .arg(dir.join("logs"));
    cmd
}

#[test]
fn init_then_list_and_show() {
    let dir = tempfile::tempdir().unwrap();

    projects(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Tables created and populated!"));

    projects(dir.path())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("  1: Hang a door"))
        .stdout(predicate::str::contains("  2: Install a ceiling fan"));

    let output = projects(dir.path())
        .args(["show", "1", "--format", "json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let project: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(project["project_name"], "Hang a door");
    assert_eq!(project["materials"].as_array().unwrap().len(), 2);
}

#[test]
fn show_missing_project_exits_with_error() {
    let dir = tempfile::tempdir().unwrap();

    projects(dir.path())
        .args(["show", "99"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Project with project ID=99 does not exist.",
        ));
}

#[test]
fn init_requires_both_script_files() {
    let dir = tempfile::tempdir().unwrap();

    projects(dir.path())
        .args(["init", "--schema", "schema.sql"])
        .assert()
        .failure();
}

#[test]
fn interactive_session_persists_between_runs() {
    let dir = tempfile::tempdir().unwrap();

    projects(dir.path())
        .write_stdin("1\nTile the backsplash\n6\n\n3\nGrout twice\n\n")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "You have successfully created project:",
        ))
        .stdout(predicate::str::contains("Exiting the menu."));

    projects(dir.path())
        .write_stdin("2\nxyz\n\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("  1: Tile the backsplash"))
        .stdout(predicate::str::contains(
            "Error: xyz is not a valid number. Try again.",
        ));
}

#[test]
fn log_files_are_written_to_log_dir() {
    let dir = tempfile::tempdir().unwrap();

    projects(dir.path()).arg("list").assert().success();

    let logs: Vec<_> = std::fs::read_dir(dir.path().join("logs"))
        .unwrap()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_name().to_string_lossy().starts_with("projects"))
        .collect();
    assert!(!logs.is_empty());
}
