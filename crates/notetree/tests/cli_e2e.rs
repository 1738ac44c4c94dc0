#![allow(deprecated)]

use assert_cmd::cargo::cargo_bin;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::new(cargo_bin("notetree"));
        cmd.env("NOTETREE_DATA", self.dir.path())
            .env_remove("NOTETREE_NOTEBOOK_FILE")
            .env_remove("NOTETREE_LOG")
            .current_dir(self.dir.path());
        cmd
    }

    fn run(&self, args: &[&str]) {
        self.cmd().args(args).assert().success();
    }

    fn notebook(&self) -> String {
        fs::read_to_string(self.dir.path().join("notebook.json")).unwrap()
    }
}

#[test]
fn test_init_creates_notebook_file() {
    let sb = Sandbox::new();
    sb.cmd()
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created notebook"));
    assert!(sb.notebook().contains("\"RootPage\""));

    sb.cmd()
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn test_add_and_tree() {
    let sb = Sandbox::new();
    sb.run(&["add", "0", "Projects"]);
    sb.run(&["add", "0.0", "Garden", "Plan", "--content", "beans"]);

    sb.cmd()
        .arg("tree")
        .assert()
        .success()
        .stdout(predicate::str::contains("0 New Notebook (1)"))
        .stdout(predicate::str::contains("  0.0 Projects (1)"))
        .stdout(predicate::str::contains("    0.0.0 Garden Plan"));
}

#[test]
fn test_move_rewrites_links_on_disk() {
    let sb = Sandbox::new();
    sb.run(&["add", "0", "A", "--content", "see [B]([0,1])"]);
    sb.run(&["add", "0", "B", "--content", "see [A]([0,0])"]);
    sb.run(&["move", "0.0", "1"]);

    sb.cmd()
        .args(["show", "0.0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("see [A]([0,1])"));
    sb.cmd()
        .args(["show", "0.1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("see [B]([0,0])"));

    sb.run(&["move", "0.1", "-1"]);
    assert!(sb.notebook().contains("see [B]([0,1])"));
}

#[test]
fn test_content_from_stdin() {
    let sb = Sandbox::new();
    sb.cmd()
        .args(["add", "0", "Piped"])
        .write_stdin("from a pipe")
        .assert()
        .success();
    sb.cmd()
        .args(["show", "0.0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("from a pipe"));
}

#[test]
fn test_search_json_output() {
    let sb = Sandbox::new();
    sb.run(&["add", "0", "Soup", "--content", "tomato soup"]);
    sb.run(&["add", "0", "Bread", "--content", "flour"]);

    sb.cmd()
        .args(["search", "soup", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"total_pages\": 1"))
        .stdout(predicate::str::contains("\"title\": \"Soup\""));
}

#[test]
fn test_rejection_is_not_a_failure() {
    let sb = Sandbox::new();
    sb.run(&["add", "0", "Only"]);
    sb.cmd()
        .args(["promote", "0.0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("top-level"));
}

#[test]
fn test_invalid_path_fails() {
    let sb = Sandbox::new();
    sb.cmd()
        .args(["show", "x.y"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn test_export_page_and_import_page() {
    let sb = Sandbox::new();
    sb.run(&["add", "0", "Trip", "--content", "see [Map]([0,0,0])"]);
    sb.run(&["add", "0.0", "Map", "--content", "back to [Trip]([0,0])"]);
    sb.run(&["export-page", "0.0", "-o", "trip.json"]);
    assert!(sb.dir.path().join("trip.json").exists());

    sb.run(&["add", "0", "Archive"]);
    sb.cmd()
        .args(["import-page", "0.1", "trip.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported \"Trip\""));
    sb.cmd()
        .args(["show", "0.1.0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("see [Map]([0,1,0,0])"));
}

#[test]
fn test_export_archive_and_single_file() {
    let sb = Sandbox::new();
    sb.run(&["add", "0", "Notes", "--content", "# Heading"]);
    sb.run(&["export", "-o", "book.tar.gz"]);
    assert!(sb.dir.path().join("book.tar.gz").exists());

    sb.run(&["export", "--single", "All Notes"]);
    let merged = fs::read_to_string(sb.dir.path().join("All Notes.md")).unwrap();
    assert!(merged.starts_with("# All Notes"));
    assert!(merged.contains("### Heading"));
}

#[test]
fn test_images_and_doctor() {
    let sb = Sandbox::new();
    fs::write(sb.dir.path().join("cat.png"), [1u8, 2, 3]).unwrap();
    sb.run(&["add", "0", "Pets", "--content", "![cat](cat.png)"]);
    sb.run(&["image", "add", "cat.png"]);
    sb.run(&["image", "mv", "cat.png", "kitten.png"]);

    sb.cmd()
        .args(["image", "ls"])
        .assert()
        .success()
        .stdout(predicate::str::contains("kitten.png (3 B)"));
    sb.cmd()
        .arg("doctor")
        .assert()
        .success()
        .stdout(predicate::str::contains("No problems found."));

    sb.run(&["image", "rm", "kitten.png"]);
    sb.cmd()
        .arg("doctor")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"kitten.png\" is not in the notebook"));
}

#[test]
fn test_templates() {
    let sb = Sandbox::new();
    sb.run(&["template", "add", "Daily", "--content", "## Today"]);
    sb.run(&["template", "use", "daily", "0", "Monday"]);
    sb.cmd()
        .args(["show", "0.0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("## Today"));
}

#[test]
fn test_config_reads_file_in_data_dir() {
    let sb = Sandbox::new();
    fs::write(
        sb.dir.path().join("notetree.toml"),
        "root_title = \"Lab Book\"\n",
    )
    .unwrap();
    sb.cmd()
        .args(["config", "root_title"])
        .assert()
        .success()
        .stdout(predicate::str::diff("Lab Book\n"));
    sb.cmd()
        .arg("tree")
        .assert()
        .success()
        .stdout(predicate::str::contains("0 Lab Book"));
}

#[test]
fn test_file_flag_overrides_location() {
    let sb = Sandbox::new();
    sb.run(&["--file", "other.json", "add", "0", "Elsewhere"]);
    assert!(sb.dir.path().join("other.json").exists());
    assert!(!sb.dir.path().join("notebook.json").exists());
}
