use assert_cmd::prelude::*;
use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;

/// Tests that `--help` is handled successfully by the CLI.
///
/// This test verifies:
/// 1. Running `evento-cli --help` exits successfully
/// 2. The help text names the command groups
/// 3. No unexpected stderr output is produced
#[test]
fn test_cli_help_success() {
    let mut cmd = cargo_bin_cmd!("evento-cli");

    let assert = cmd.arg("--help").assert().success();

    let out = assert.get_output();
    let stdout = String::from_utf8_lossy(&out.stdout);
    for group in ["user", "event", "booking", "enquiry", "auth", "admin"] {
        assert!(stdout.contains(group), "expected `{}` in help:\n{}", group, stdout);
    }
    assert!(
        out.stderr.is_empty(),
        "expected empty stderr for --help, got:\n{}",
        String::from_utf8_lossy(&out.stderr)
    );
}

/// An unreachable server is reported as a connection problem, not a crash
#[test]
fn test_cli_get_event_unreachable_server() {
    let tokens = TempDir::new().unwrap();
    let mut cmd = cargo_bin_cmd!("evento-cli");

    let assert = cmd
        .args(["--server-url", "http://127.0.0.1:9", "event", "get", "evt_123456789"])
        .env("EVENTO_TOKEN_FILE", tokens.path().join("session.token"))
        .assert()
        .failure();

    let stderr = String::from_utf8_lossy(&assert.get_output().stderr).to_string();
    assert!(
        stderr.contains("Could not connect to server at http://127.0.0.1:9"),
        "unexpected stderr:\n{}",
        stderr
    );
}

#[test]
fn test_cli_rejects_unknown_command() {
    let mut cmd = cargo_bin_cmd!("evento-cli");
    cmd.arg("tickets").assert().failure();
}
