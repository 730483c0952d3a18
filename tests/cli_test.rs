//! Tests for command dispatch

use std::path::{Path, PathBuf};

use clap::Parser;
use rstest::rstest;
use tempfile::TempDir;

use orgtree::cli::commands::{execute_command, init_config};
use orgtree::cli::{Cli, CliError};
use orgtree::exitcode;
use orgtree::infrastructure::traits::RealFileSystem;

fn resource(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/resources")
        .join(name)
}

fn run_cli(args: &[&str]) -> (Result<(), CliError>, String) {
    let cli = Cli::try_parse_from(args).expect("parse args");
    let mut out = Vec::new();
    let result = execute_command(&cli, &mut out);
    (result, String::from_utf8(out).expect("utf8 output"))
}

#[test]
fn given_valid_file_when_show_then_prints_indented_lines() {
    // Arrange
    let file = resource("hierarchy.csv");

    // Act
    let (result, out) = run_cli(&["orgtree", "show", file.to_str().unwrap()]);

    // Assert
    assert!(result.is_ok(), "{result:?}");
    assert_eq!(out, "jamie\n\talan\n\t\tmartin\n\t\talex\n\tsteve\n\t\tdavid\n");
}

#[test]
fn given_valid_file_when_tree_then_prints_box_drawing_tree() {
    let file = resource("hierarchy.csv");

    let (result, out) = run_cli(&["orgtree", "tree", file.to_str().unwrap()]);

    assert!(result.is_ok(), "{result:?}");
    assert_eq!(
        out,
        "jamie\n├── alan\n│   ├── martin\n│   └── alex\n└── steve\n    └── david\n"
    );
}

#[test]
fn given_valid_file_when_check_then_reports_figures_and_succeeds() {
    // Arrange
    let file = resource("hierarchy.csv");

    // Act
    let (result, out) = run_cli(&["orgtree", "check", file.to_str().unwrap()]);

    // Assert
    assert!(result.is_ok(), "{result:?}");
    assert!(out.contains("is a valid hierarchy"), "{out}");
    assert!(out.contains("root:      jamie"), "{out}");
    assert!(out.contains("employees: 6"), "{out}");
    assert!(out.contains("depth:     3"), "{out}");
    assert!(out.contains("leaves:    3"), "{out}");
}

#[rstest]
#[case("circular_manager.csv")]
#[case("multiple_roots.csv")]
#[case("malformed.csv")]
fn given_invalid_file_when_check_then_dataerr_and_no_output(#[case] name: &str) {
    let file = resource(name);

    let (result, out) = run_cli(&["orgtree", "check", file.to_str().unwrap()]);

    assert_eq!(result.unwrap_err().exit_code(), exitcode::DATAERR);
    assert!(out.is_empty(), "{out}");
}

#[test]
fn given_non_utf8_file_when_show_then_dataerr() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("latin1.csv");
    std::fs::write(&file, [b'j', 0xe9, b',', b'1', b',', b'\n']).unwrap();

    // Act
    let (result, out) = run_cli(&["orgtree", "show", file.to_str().unwrap()]);

    // Assert
    assert_eq!(result.unwrap_err().exit_code(), exitcode::DATAERR);
    assert!(out.is_empty());
}

#[test]
fn given_invalid_hierarchy_when_show_then_dataerr_and_no_output() {
    let file = resource("circular_manager.csv");

    let (result, out) = run_cli(&["orgtree", "show", file.to_str().unwrap()]);

    let err = result.unwrap_err();
    assert_eq!(err.exit_code(), exitcode::DATAERR);
    assert!(out.is_empty());
}

#[test]
fn given_missing_file_when_show_then_noinput() {
    let (result, _) = run_cli(&["orgtree", "show", "/nonexistent/staff.csv"]);

    assert_eq!(result.unwrap_err().exit_code(), exitcode::NOINPUT);
}

#[test]
fn given_no_command_when_executing_then_usage() {
    let (result, _) = run_cli(&["orgtree"]);

    assert_eq!(result.unwrap_err().exit_code(), exitcode::USAGE);
}

#[test]
fn given_explicit_config_when_show_then_uses_its_indent() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("orgtree.toml");
    std::fs::write(&config, "indent = \"..\"\n").unwrap();
    let file = resource("hierarchy.csv");

    // Act
    let (result, out) = run_cli(&[
        "orgtree",
        "--config",
        config.to_str().unwrap(),
        "show",
        file.to_str().unwrap(),
    ]);

    // Assert
    assert!(result.is_ok(), "{result:?}");
    assert!(out.contains("....martin\n"));
}

#[test]
fn given_config_show_when_executing_then_prints_toml() {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("orgtree.toml");
    std::fs::write(&config, "delimiter = \";\"\n").unwrap();

    let (result, out) = run_cli(&["orgtree", "-c", config.to_str().unwrap(), "config", "show"]);

    assert!(result.is_ok(), "{result:?}");
    assert!(out.contains("delimiter = \";\""), "{out}");
}

#[test]
fn given_completion_when_executing_then_writes_script() {
    let (result, out) = run_cli(&["orgtree", "completion", "bash"]);

    assert!(result.is_ok());
    assert!(out.contains("orgtree"));
}

#[test]
fn given_existing_config_when_init_without_force_then_refuses() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("nested/orgtree.toml");

    // Act / Assert: first init creates the file and its directory
    init_config(&RealFileSystem, &path, false).unwrap();
    assert!(path.exists());

    // Second init without force is a usage error
    let err = init_config(&RealFileSystem, &path, false).unwrap_err();
    assert_eq!(err.exit_code(), exitcode::USAGE);

    // With force it is overwritten
    init_config(&RealFileSystem, &path, true).unwrap();
    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.starts_with("# orgtree configuration"));
}
