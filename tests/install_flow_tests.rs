//! End-to-end installation runs against fake installer scripts
//!
//! These exercise the full binary: catalog loading, sequencing, the
//! unprivileged/privileged retry ladder and the final summary. Unix only,
//! since the fake installers are shell scripts.

#![cfg(unix)]

mod common;

use assert_cmd::Command;
use predicates::prelude::*;
use serial_test::serial;

use common::TestWorkspace;

#[allow(deprecated)]
fn silentpush_cmd() -> Command {
    Command::cargo_bin("silentpush").unwrap()
}

#[test]
#[serial]
fn test_install_all_succeeds() {
    let workspace = TestWorkspace::new();
    let first = workspace.fake_installer("first.sh", 0);
    let second = workspace.fake_installer("second.sh", 0);
    workspace.write_catalog(&[
        ("First", &first.display().to_string()),
        ("Second", &second.display().to_string()),
    ]);

    silentpush_cmd()
        .current_dir(&workspace.path)
        .args(["install", "--all", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 of 2 package(s) installed"));
}

#[test]
#[serial]
fn test_install_selected_package_only() {
    let workspace = TestWorkspace::new();
    let wanted = workspace.fake_installer("wanted.sh", 0);
    let marker = workspace.path.join("other-ran");
    let other = workspace.fake_installer_script(
        "other.sh",
        &format!("touch {}; exit 0", marker.display()),
    );
    workspace.write_catalog(&[
        ("Wanted", &wanted.display().to_string()),
        ("Other", &other.display().to_string()),
    ]);

    silentpush_cmd()
        .current_dir(&workspace.path)
        .args(["install", "--yes", "Wanted"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 of 1 package(s) installed"));

    assert!(!marker.exists());
}

#[test]
#[serial]
fn test_install_retries_privileged_after_rejection() {
    let workspace = TestWorkspace::new();
    let attempts = workspace.path.join("attempts");
    // Fails with 1603 on the first attempt, succeeds on the second
    let flaky = workspace.fake_installer_script(
        "flaky.sh",
        &format!(
            "echo run >> {f}; [ $(wc -l < {f}) -ge 2 ] && exit 0; exit 1603",
            f = attempts.display()
        ),
    );
    workspace.write_catalog(&[("Flaky", &flaky.display().to_string())]);

    silentpush_cmd()
        .current_dir(&workspace.path)
        .args(["install", "--all", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 of 1 package(s) installed"));

    let runs = std::fs::read_to_string(&attempts).unwrap();
    assert_eq!(runs.lines().count(), 2);
}

#[test]
#[serial]
fn test_install_reports_partial_failure() {
    let workspace = TestWorkspace::new();
    let good = workspace.fake_installer("good.sh", 0);
    let bad = workspace.fake_installer("bad.sh", 5);
    workspace.write_catalog(&[
        ("Good", &good.display().to_string()),
        ("Bad", &bad.display().to_string()),
    ]);

    silentpush_cmd()
        .current_dir(&workspace.path)
        .args(["install", "--all", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 of 2 package(s) installed"))
        .stdout(predicate::str::contains("1 package(s) failed"));
}

#[test]
#[serial]
fn test_install_times_out_hung_installer() {
    let workspace = TestWorkspace::new();
    let hang = workspace.fake_installer_script("hang.sh", "sleep 30");
    workspace.write_catalog(&[("Hang", &hang.display().to_string())]);

    silentpush_cmd()
        .current_dir(&workspace.path)
        .args(["install", "--all", "--yes", "--timeout", "1"])
        .timeout(std::time::Duration::from_secs(20))
        .assert()
        .success()
        .stdout(predicate::str::contains("0 of 1 package(s) installed"));
}

#[test]
#[serial]
fn test_install_missing_installer_fails_but_run_continues() {
    let workspace = TestWorkspace::new();
    let good = workspace.fake_installer("good.sh", 0);
    workspace.write_catalog(&[
        ("Ghost", "/nonexistent/ghost-setup.sh"),
        ("Good", &good.display().to_string()),
    ]);

    silentpush_cmd()
        .current_dir(&workspace.path)
        .args(["install", "--all", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 of 2 package(s) installed"));
}

#[test]
#[serial]
fn test_install_special_package_copies_tree() {
    let workspace = TestWorkspace::new();
    workspace.write_file("payload/data.bin", "payload-bytes");
    workspace.write_file("payload/nested/more.bin", "nested-bytes");
    let source = workspace.path.join("payload");
    let dest = workspace.path.join("deployed");

    let special = serde_json::json!({
        "special_installs": [{
            "name": "BulkFiles",
            "type": "whole_tree",
            "source_root": source,
            "dest_root": dest,
        }]
    });
    workspace.write_file("special_config.json", &special.to_string());
    // Installer path is bogus on purpose; the special strategy must win
    workspace.write_catalog(&[("BulkFiles", "/nonexistent/bulk-setup.exe")]);

    silentpush_cmd()
        .current_dir(&workspace.path)
        .args(["install", "--all", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 of 1 package(s) installed"));

    assert!(workspace.file_exists("deployed/data.bin"));
    assert!(workspace.file_exists("deployed/nested/more.bin"));
}
