//! End-to-end runs of the `slnforge` binary against a library on disk.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const GRAPH: &str = r#"
[[sets]]
name = "lib"
description = "Class library with IoC"
tags = ["csharp"]
template = "library"
alterations = ["structuremap"]
"#;

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// A workspace with a template library under `lib/`.
fn workspace() -> TempDir {
    let temp = TempDir::new().unwrap();
    let lib = temp.path().join("lib");
    write(&lib, "templates.toml", GRAPH);
    write(&lib, "solution/baseline/ignore.txt", "bin\nobj\n");
    write(&lib, "solution/baseline/template.toml", "description = \"Baseline\"\n");
    write(&lib, "project/library/Class1.cs", "namespace %NAMESPACE% {}\n");
    write(
        &lib,
        "project/library/template.toml",
        "description = \"Class library\"\n",
    );
    write(&lib, "alteration/structuremap/references.txt", "StructureMap\n");
    write(&lib, "testing/nunit/nuget.txt", "NUnit\n");
    temp
}

fn slnforge(dir: &Path) -> Command {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("slnforge");
    cmd.current_dir(dir)
        .env("NO_COLOR", "1")
        .env_remove("SLNFORGE_LIBRARY")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn help_lists_commands() {
    let temp = TempDir::new().unwrap();
    slnforge(temp.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("new"))
        .stdout(predicate::str::contains("add"))
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("completions"));
}

#[test]
fn version_flag() {
    let temp = TempDir::new().unwrap();
    slnforge(temp.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn new_creates_solution_and_project() {
    let temp = workspace();
    slnforge(temp.path())
        .args([
            "new",
            "Demo",
            "--root",
            "work",
            "--library",
            "lib",
            "-t",
            "baseline",
            "-p",
            "Demo.Core",
            "--project-template",
            "library",
            "-y",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Solution ready at"));

    let work = temp.path().join("work");
    let sln = fs::read_to_string(work.join("src/Demo.sln")).unwrap();
    assert!(sln.contains("\"Demo.Core\", \"Demo.Core\\Demo.Core.csproj\""));
    assert!(work.join("src/Demo.Core/Demo.Core.csproj").is_file());
    assert_eq!(
        fs::read_to_string(work.join("src/Demo.Core/Class1.cs")).unwrap(),
        "namespace Demo.Core {}\n"
    );
    assert_eq!(
        fs::read_to_string(work.join(".gitignore")).unwrap(),
        "bin\nobj\n"
    );
}

#[test]
fn dry_run_prints_the_plan_and_writes_nothing() {
    let temp = workspace();
    slnforge(temp.path())
        .args([
            "new",
            "Demo",
            "--root",
            "work",
            "--library",
            "lib",
            "-t",
            "baseline",
            "-p",
            "Demo.Core",
            "--project-template",
            "library",
            "--dry-run",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Dry run: nothing was written"))
        .stdout(predicate::str::contains("Create solution 'Demo'"))
        .stdout(predicate::str::contains("Project 'Demo.Core'"));

    assert!(!temp.path().join("work").exists());
}

#[test]
fn add_resolves_the_set_and_reports_dependencies() {
    let temp = workspace();
    slnforge(temp.path())
        .args(["new", "Demo", "--root", "work", "--library", "lib", "-y"])
        .assert()
        .success();

    slnforge(temp.path())
        .args([
            "add",
            "Demo.Core",
            "--set",
            "lib",
            "--solution",
            "Demo",
            "--testing",
            "nunit",
            "--root",
            "work",
            "--library",
            "lib",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Dependencies to install"))
        .stdout(predicate::str::contains("Demo.Core.Testing: NUnit"));

    let src = temp.path().join("work/src");
    let csproj = fs::read_to_string(src.join("Demo.Core/Demo.Core.csproj")).unwrap();
    assert!(csproj.contains("<Reference Include=\"StructureMap\" />"));

    let sln = fs::read_to_string(src.join("Demo.sln")).unwrap();
    assert!(sln.contains("\"Demo.Core\", "));
    assert!(sln.contains("\"Demo.Core.Testing\", "));
}

#[test]
fn json_output_reports_steps() {
    let temp = workspace();
    let assert = slnforge(temp.path())
        .args([
            "--output-format",
            "json",
            "new",
            "Demo",
            "--root",
            "work",
            "--library",
            "lib",
            "-t",
            "baseline",
            "-y",
        ])
        .assert()
        .success();

    let report: serde_json::Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();
    assert_eq!(report["executed"], true);
    assert_eq!(report["steps"][0], "Create solution 'Demo'");
}

#[test]
fn list_json_includes_descriptions() {
    let temp = workspace();
    let assert = slnforge(temp.path())
        .args(["list", "project", "--format", "json", "--library", "lib"])
        .assert()
        .success();

    let entries: serde_json::Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();
    assert_eq!(entries[0]["kind"], "project");
    assert_eq!(entries[0]["name"], "library");
    assert_eq!(entries[0]["description"], "Class library");
}

#[test]
fn list_everything_as_names() {
    let temp = workspace();
    slnforge(temp.path())
        .args(["list", "--format", "list", "--library", "lib"])
        .assert()
        .success()
        .stdout(predicate::str::contains("set/lib"))
        .stdout(predicate::str::contains("solution/baseline"))
        .stdout(predicate::str::contains("alteration/structuremap"))
        .stdout(predicate::str::contains("testing/nunit"));
}

#[test]
fn library_comes_from_the_config_file() {
    let temp = workspace();
    write(temp.path(), "slnforge.toml", "[library]\npath = \"lib\"\n");
    slnforge(temp.path())
        .args(["--config", "slnforge.toml", "list", "sets", "--format", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("lib"));
}

#[test]
fn completions_for_bash() {
    let temp = TempDir::new().unwrap();
    slnforge(temp.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("slnforge"));
}

#[test]
fn library_flag_is_global() {
    let temp = workspace();
    slnforge(temp.path())
        .args(["-L", "lib", "list", "testing", "--format", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("nunit"));
}

#[test]
fn verbose_logs_each_plan_step() {
    let temp = workspace();
    slnforge(temp.path())
        .args([
            "-v", "new", "Demo", "--root", "work", "--library", "lib", "-t", "baseline", "-y",
        ])
        .assert()
        .success()
        .stderr(predicate::str::contains("Create solution 'Demo'"));
}

#[test]
fn json_output_keeps_stdout_parseable_with_logging() {
    let temp = workspace();
    let assert = slnforge(temp.path())
        .args([
            "-v",
            "--output-format",
            "json",
            "new",
            "Demo",
            "--root",
            "work",
            "--library",
            "lib",
            "-y",
        ])
        .assert()
        .success();

    let report: serde_json::Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();
    assert_eq!(report["executed"], true);
    let stderr = String::from_utf8_lossy(&assert.get_output().stderr);
    assert!(
        stderr
            .lines()
            .filter(|line| !line.trim().is_empty())
            .all(|line| serde_json::from_str::<serde_json::Value>(line).is_ok())
    );
}
