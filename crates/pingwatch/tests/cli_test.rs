//! Integration tests for the `pingwatch` CLI binary.
//!
//! Argument parsing, help output and shell completions run without a
//! server; the registry commands run against a wiremock server.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `pingwatch` binary with env isolation.
///
/// Clears all `PINGWATCH_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn pingwatch_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("pingwatch");
    cmd.env("HOME", "/tmp/pingwatch-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/pingwatch-cli-test-nonexistent")
        .env_remove("PINGWATCH_PROFILE")
        .env_remove("PINGWATCH_SERVER")
        .env_remove("PINGWATCH_OUTPUT")
        .env_remove("PINGWATCH_INSECURE")
        .env_remove("PINGWATCH_TIMEOUT")
        .env_remove("RUST_LOG");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

fn registry_body() -> serde_json::Value {
    json!({
        "sites": {
            "S02": {
                "site_name": "North Tower",
                "location": "Ridge",
                "responsible_person": "Ops",
                "contact_phone": "555-0100",
                "active": true,
                "active_devices": ["GSM-1", "ESP"]
            },
            "S01": {
                "site_name": "Quarry",
                "location": "East pit",
                "responsible_person": "Sam",
                "contact_phone": "555-0142",
                "active": false,
                "active_devices": []
            }
        }
    })
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = pingwatch_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    pingwatch_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("PING-WATCH")
            .and(predicate::str::contains("sites"))
            .and(predicate::str::contains("watch"))
            .and(predicate::str::contains("connect")),
    );
}

#[test]
fn test_version_flag() {
    pingwatch_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("pingwatch"));
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    pingwatch_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_zsh() {
    pingwatch_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

// ── Error cases ─────────────────────────────────────────────────────

#[test]
fn test_invalid_subcommand() {
    let output = pingwatch_cmd().arg("foobar").output().unwrap();
    assert!(!output.status.success());
    let text = combined_output(&output);
    assert!(
        text.contains("unrecognized") || text.contains("foobar"),
        "Expected error mentioning invalid subcommand:\n{text}"
    );
}

#[test]
fn test_unknown_device_rejected_by_parser() {
    pingwatch_cmd()
        .args(["sites", "create", "S03", "--name", "x", "--device", "LORA"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("LORA"));
}

#[test]
fn test_active_and_inactive_conflict() {
    pingwatch_cmd()
        .args(["sites", "update", "S03", "--active", "--inactive"])
        .assert()
        .code(2);
}

#[test]
fn test_unknown_profile() {
    pingwatch_cmd()
        .args(["--profile", "depot", "sites", "list"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("depot"));
}

#[test]
fn test_non_http_server_is_a_usage_error() {
    pingwatch_cmd()
        .args(["--server", "mqtt://broker:1883", "sites", "list"])
        .assert()
        .code(2);
}

#[test]
fn test_unreachable_server() {
    pingwatch_cmd()
        .args(["--server", "http://127.0.0.1:9", "--timeout", "2", "sites", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("127.0.0.1"));
}

#[test]
fn test_delete_without_tty_requires_yes() {
    pingwatch_cmd()
        .args(["--server", "http://127.0.0.1:9", "sites", "delete", "S01"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--yes"));
}

#[test]
fn test_handoff_without_site_is_rejected() {
    pingwatch_cmd()
        .args([
            "--server",
            "http://127.0.0.1:9",
            "sites",
            "add",
            "--from-handoff",
            "/config?devices=ESP",
        ])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("from-handoff"));
}

// ── Registry against a mock server ──────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_sites_list_plain_keeps_server_order() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/sites"))
        .respond_with(ResponseTemplate::new(200).set_body_json(registry_body()))
        .mount(&server)
        .await;

    pingwatch_cmd()
        .args(["--server", &server.uri(), "-o", "plain", "sites", "list"])
        .assert()
        .success()
        .stdout("S02\nS01\n");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_sites_list_table_shows_status_and_devices() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/sites"))
        .respond_with(ResponseTemplate::new(200).set_body_json(registry_body()))
        .mount(&server)
        .await;

    pingwatch_cmd()
        .args(["--server", &server.uri(), "--color", "never", "sites", "list"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("North Tower")
                .and(predicate::str::contains("Inactive"))
                .and(predicate::str::contains("(off: GSM-2)")),
        );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_empty_registry_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/sites"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"sites": {}})))
        .mount(&server)
        .await;

    pingwatch_cmd()
        .args(["--server", &server.uri(), "sites", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No sites configured yet"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_sites_get_missing_site() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/sites/S77"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": "Site not found"})))
        .mount(&server)
        .await;

    pingwatch_cmd()
        .args(["--server", &server.uri(), "sites", "get", "S77"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("sites list"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_handoff_creates_prefilled_site() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/sites"))
        .and(body_json(json!({
            "site_id": "S14",
            "site_name": "S14",
            "location": "",
            "responsible_person": "",
            "contact_email": "",
            "contact_phone": "",
            "active": true,
            "active_devices": ["GSM-1", "ESP"]
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"message": "Site added successfully"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    pingwatch_cmd()
        .args([
            "--server",
            &server.uri(),
            "--color",
            "never",
            "sites",
            "add",
            "--from-handoff",
            "/config?add=S14&devices=ESP,GSM-1",
        ])
        .assert()
        .success()
        .stderr(predicate::str::contains("Site added successfully"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_create_rejection_shows_server_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/sites"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"error": "Site ID already exists"})),
        )
        .mount(&server)
        .await;

    pingwatch_cmd()
        .args(["--server", &server.uri(), "sites", "create", "S02", "--name", "Dup"])
        .assert()
        .code(6)
        .stderr(predicate::str::contains("Site ID already exists"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_delete_with_yes() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/sites/S01"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    pingwatch_cmd()
        .args(["--server", &server.uri(), "--color", "never", "-y", "sites", "delete", "S01"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Site deleted successfully"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_slow_server_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/sites"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(registry_body())
                .set_delay(std::time::Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    pingwatch_cmd()
        .args(["--server", &server.uri(), "--timeout", "1", "sites", "list"])
        .assert()
        .code(8)
        .stderr(predicate::str::contains("timed out").and(predicate::str::contains("0s").not()));
}
