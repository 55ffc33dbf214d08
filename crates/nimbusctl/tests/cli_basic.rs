use assert_cmd::Command;
use predicates::prelude::*;

/// Helper to create a test command
fn nimbusctl() -> Command {
    Command::cargo_bin("nimbusctl").unwrap()
}

#[test]
fn test_help_flag() {
    nimbusctl()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("marketplace add-ons"))
        .stdout(predicate::str::contains("EXAMPLES:"));
}

#[test]
fn test_version_flag() {
    nimbusctl()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("nimbusctl"))
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_version_subcommand() {
    nimbusctl()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_no_args_shows_help() {
    nimbusctl()
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("Usage:"));
}

#[test]
fn test_invalid_subcommand() {
    nimbusctl()
        .arg("frobnicate")
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("unrecognized subcommand"));
}

#[test]
fn test_wait_flags_require_wait() {
    nimbusctl()
        .args(["disk", "remove", "data-0", "--wait-timeout", "60"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("--wait"));
}

#[test]
fn test_no_profile_is_a_diagnostic() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");
    std::fs::write(&config, "").unwrap();

    nimbusctl()
        .env_remove("NIMBUSCTL_PROFILE")
        .args(["image", "list"])
        .arg("--config-file")
        .arg(&config)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("No profile configured"))
        .stderr(predicate::str::contains("profile set"));
}
