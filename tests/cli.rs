use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

fn setup_test_directory() -> tempfile::TempDir {
    let dir = tempdir().unwrap();

    // Empty directories that should be preserved
    fs::create_dir_all(dir.path().join("assets/icons")).unwrap();
    fs::create_dir_all(dir.path().join("src/components/empty1")).unwrap();

    // An excluded dependency directory that must never be touched
    fs::create_dir_all(dir.path().join("node_modules/pkg")).unwrap();

    // A directory with real content
    fs::create_dir_all(dir.path().join("docs")).unwrap();
    fs::write(dir.path().join("docs/guide.md"), "# Guide").unwrap();

    dir
}

fn buddha() -> Command {
    Command::cargo_bin("git-buddha").unwrap()
}

#[test]
fn test_preserves_empty_directories() {
    let dir = setup_test_directory();

    buddha()
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Preserved:"))
        .stdout(predicate::str::contains("Enlightenment complete. 2 directories preserved."));

    assert!(dir.path().join("assets/icons/.gitkeep").is_file());
    assert!(dir.path().join("src/components/empty1/.gitkeep").is_file());
    assert!(!dir.path().join("node_modules/pkg/.gitkeep").exists());
    assert!(!dir.path().join("docs/.gitkeep").exists());
}

#[test]
fn test_second_run_is_already_enlightened() {
    let dir = setup_test_directory();

    buddha().arg(dir.path()).assert().success();
    buddha()
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Already enlightened"));
}

#[test]
fn test_zen_mode_only_enforces_policy() {
    let dir = setup_test_directory();

    buddha()
        .arg(dir.path())
        .arg("--zen")
        .assert()
        .success()
        .stdout(predicate::str::contains("in harmony with the universe"))
        .stdout(predicate::str::contains("Preserved:").not());

    // "assets/" is enforced by the built-in policy, src/ is not
    assert!(dir.path().join("assets/icons/.gitkeep").is_file());
    assert!(!dir.path().join("src/components/empty1/.gitkeep").exists());
}

#[test]
fn test_config_file_policy_applies_under_zen() {
    let dir = setup_test_directory();
    let config_dir = tempdir().unwrap();
    let config = config_dir.path().join("buddha.toml");
    fs::write(&config, "[policy]\n\"src/\" = \"enforce\"\n").unwrap();

    buddha()
        .arg(dir.path())
        .arg("--zen")
        .arg("--config")
        .arg(&config)
        .assert()
        .success();

    assert!(dir.path().join("src/components/empty1/.gitkeep").is_file());
    // The file's policy table replaced the built-in one
    assert!(!dir.path().join("assets/icons/.gitkeep").exists());
}

#[test]
fn test_readme_mode() {
    let dir = setup_test_directory();

    buddha()
        .arg(dir.path())
        .args(["--mode", "readme"])
        .assert()
        .success();

    let readme = fs::read_to_string(dir.path().join("assets/icons/README.md")).unwrap();
    assert!(readme.contains("icon"));
}

#[test]
fn test_invalid_mode_is_rejected() {
    let dir = setup_test_directory();

    buddha()
        .arg(dir.path())
        .args(["--mode", "zip"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid mode"));
}

#[test]
fn test_exclude_flag_skips_directory() {
    let dir = setup_test_directory();

    buddha()
        .arg(dir.path())
        .arg("-x")
        .arg("components")
        .assert()
        .success();

    assert!(dir.path().join("assets/icons/.gitkeep").is_file());
    assert!(!dir.path().join("src/components/empty1/.gitkeep").exists());
}

#[test]
fn test_no_cleanup_flag_keeps_placeholder() {
    let dir = setup_test_directory();

    buddha().arg(dir.path()).assert().success();
    fs::write(dir.path().join("assets/icons/logo.svg"), "<svg/>").unwrap();

    buddha().arg(dir.path()).arg("--no-cleanup").assert().success();
    assert!(dir.path().join("assets/icons/.gitkeep").is_file());

    buddha()
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Released:"));
    assert!(!dir.path().join("assets/icons/.gitkeep").exists());
}

#[test]
fn test_log_file_written() {
    let dir = setup_test_directory();

    buddha().arg(dir.path()).assert().success();

    let log = fs::read_to_string(dir.path().join(".git-buddha.json")).unwrap();
    assert!(log.contains("\"keep_created\""));
}

#[test]
fn test_diagram_flag_prints_tree() {
    let dir = setup_test_directory();

    buddha()
        .arg(dir.path())
        .arg("--diagram")
        .assert()
        .success()
        .stdout(predicate::str::contains("icons/ [.gitkeep]"));
}

#[test]
fn test_watch_flag_is_accepted() {
    let dir = setup_test_directory();

    buddha()
        .arg(dir.path())
        .arg("--watch")
        .assert()
        .success()
        .stderr(predicate::str::contains("not implemented"));
}

#[test]
fn test_missing_root_is_fatal() {
    let dir = tempdir().unwrap();

    buddha()
        .arg(dir.path().join("does-not-exist"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("No valid root directory"));
}

#[test]
fn test_bad_stale_after_is_fatal() {
    let dir = setup_test_directory();

    buddha()
        .arg(dir.path())
        .args(["--stale-after", "soon"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid staleness threshold"));
}

#[test]
fn test_zen_still_prints_requested_diagram() {
    let dir = setup_test_directory();

    buddha()
        .arg(dir.path())
        .arg("--zen")
        .arg("--diagram")
        .assert()
        .success()
        .stdout(predicate::str::contains("icons/ [.gitkeep]"))
        .stdout(predicate::str::contains("in harmony with the universe"));
}

#[test]
fn test_zen_reports_warn_rule_directories() {
    let dir = setup_test_directory();
    fs::create_dir_all(dir.path().join("logs")).unwrap();

    buddha()
        .arg(dir.path())
        .arg("--zen")
        .assert()
        .success()
        .stdout(predicate::str::contains("Unpreserved:"))
        .stdout(predicate::str::contains("logs"));

    assert!(!dir.path().join("logs/.gitkeep").exists());
    let log = fs::read_to_string(dir.path().join(".git-buddha.json")).unwrap();
    assert!(log.contains("\"warned\""));
}

#[test]
fn test_zen_still_prints_failures() {
    let dir = setup_test_directory();
    // A directory named like the placeholder cannot be removed as a file
    fs::create_dir_all(dir.path().join("broken/.gitkeep/inner")).unwrap();
    fs::write(dir.path().join("broken/data.txt"), "x").unwrap();

    buddha()
        .arg(dir.path())
        .arg("--zen")
        .assert()
        .success()
        .stdout(predicate::str::contains("Failed:"))
        .stdout(predicate::str::contains("Preserved:").not());
}

#[test]
fn test_placeholder_mode_cleans_up_after_fill() {
    let dir = setup_test_directory();

    buddha()
        .arg(dir.path())
        .args(["--mode", "placeholder"])
        .assert()
        .success();
    assert!(dir.path().join("assets/icons/placeholder").is_file());

    fs::write(dir.path().join("assets/icons/logo.svg"), "<svg/>").unwrap();
    buddha()
        .arg(dir.path())
        .args(["--mode", "placeholder"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Released:"));
    assert!(!dir.path().join("assets/icons/placeholder").exists());
}
