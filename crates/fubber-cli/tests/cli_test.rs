//! End-to-end CLI flows against a scratch HOME and project tree.

use std::fs;
use std::path::Path;

use assert_cmd::Command;

fn seed(project: &Path) {
    fs::create_dir_all(project.join("src")).unwrap();
    fs::write(
        project.join("src/users.py"),
        "class UserRepo:\n    def getUserById(self, user_id):\n        return self.rows[user_id]\n",
    )
    .unwrap();
    fs::create_dir_all(project.join("node_modules")).unwrap();
    fs::write(project.join("node_modules/skip.js"), "var x;\n").unwrap();
}

fn fubber(home: &Path, cwd: &Path) -> Command {
    let mut cmd = Command::cargo_bin("fubber").unwrap();
    cmd.env("HOME", home)
        .env("FUBBER_AUTO_UPDATE", "false")
        .current_dir(cwd);
    cmd
}

#[test]
fn init_index_search_roundtrip() {
    let tmp = tempfile::tempdir().unwrap();
    let home = tmp.path().join("home");
    let project = tmp.path().join("proj");
    fs::create_dir_all(&home).unwrap();
    seed(&project);

    fubber(&home, &project)
        .args(["init", "."])
        .assert()
        .success();

    fubber(&home, &project).arg("index").assert().success();

    let out = fubber(&home, &project)
        .args(["search", "signature:getUserById"])
        .assert()
        .success();
    let stdout = String::from_utf8(out.get_output().stdout.clone()).unwrap();
    assert!(stdout.contains("src/users.py"), "stdout: {stdout}");
    assert!(stdout.contains("method"), "stdout: {stdout}");

    let out = fubber(&home, &project)
        .args(["search", "--json", "getUserById"])
        .assert()
        .success();
    let stdout = String::from_utf8(out.get_output().stdout.clone()).unwrap();
    let first = stdout.lines().next().expect("at least one hit");
    let row: serde_json::Value = serde_json::from_str(first).unwrap();
    assert_eq!(row["project_relative_path"], "src/users.py");
    assert!(row["snippet_detokenized"].is_string());
}

#[test]
fn projects_lists_registered_roots() {
    let tmp = tempfile::tempdir().unwrap();
    let home = tmp.path().join("home");
    let project = tmp.path().join("proj");
    fs::create_dir_all(&home).unwrap();
    seed(&project);

    fubber(&home, &project).args(["init", "."]).assert().success();
    fubber(&home, &project).arg("index").assert().success();

    let out = fubber(&home, &project).arg("projects").assert().success();
    let stdout = String::from_utf8(out.get_output().stdout.clone()).unwrap();
    assert!(stdout.contains("proj"));
    assert!(stdout.contains("1 files"));
}

#[test]
fn search_outside_any_project_fails_with_code_1() {
    let tmp = tempfile::tempdir().unwrap();
    let home = tmp.path().join("home");
    let lonely = tmp.path().join("lonely");
    fs::create_dir_all(&home).unwrap();
    fs::create_dir_all(&lonely).unwrap();

    fubber(&home, &lonely)
        .args(["search", "anything"])
        .assert()
        .failure()
        .code(1);
}

#[test]
fn malformed_query_fails_with_code_1() {
    let tmp = tempfile::tempdir().unwrap();
    let home = tmp.path().join("home");
    let project = tmp.path().join("proj");
    fs::create_dir_all(&home).unwrap();
    seed(&project);

    fubber(&home, &project).args(["init", "."]).assert().success();
    fubber(&home, &project)
        .args(["search", "(unclosed"])
        .assert()
        .failure()
        .code(1);
}

#[test]
fn unknown_arguments_fail_with_code_3() {
    let tmp = tempfile::tempdir().unwrap();
    let home = tmp.path().join("home");
    fs::create_dir_all(&home).unwrap();

    fubber(&home, tmp.path())
        .arg("frobnicate")
        .assert()
        .failure()
        .code(3);
}

#[test]
fn init_missing_directory_fails() {
    let tmp = tempfile::tempdir().unwrap();
    let home = tmp.path().join("home");
    fs::create_dir_all(&home).unwrap();

    fubber(&home, tmp.path())
        .args(["init", "does-not-exist"])
        .assert()
        .failure()
        .code(1);
}

#[test]
fn update_reports_throttle_and_changes() {
    let tmp = tempfile::tempdir().unwrap();
    let home = tmp.path().join("home");
    let project = tmp.path().join("proj");
    fs::create_dir_all(&home).unwrap();
    seed(&project);

    fubber(&home, &project).args(["init", "."]).assert().success();
    fubber(&home, &project).arg("index").assert().success();

    let out = fubber(&home, &project).arg("update").assert().success();
    let stdout = String::from_utf8(out.get_output().stdout.clone()).unwrap();
    assert!(stdout.contains("checked"), "stdout: {stdout}");

    // Within the default 60s throttle the second run is suppressed.
    let out = fubber(&home, &project).arg("update").assert().success();
    let stdout = String::from_utf8(out.get_output().stdout.clone()).unwrap();
    assert!(stdout.contains("throttled"), "stdout: {stdout}");
}
