//! Integration tests for the `edgeform` CLI binary.
//!
//! Offline paths (schemas, validation, dry runs) run against the binary
//! alone; controller-bound commands run against a wiremock server.
#![allow(clippy::unwrap_used)]

use std::io::Write;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `edgeform` binary with env isolation.
///
/// Clears all `EDGEFORM_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn edgeform_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("edgeform");
    cmd.env("HOME", "/tmp/edgeform-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/edgeform-cli-test-nonexistent")
        .env("NO_COLOR", "1")
        .env_remove("EDGEFORM_PROFILE")
        .env_remove("EDGEFORM_CONTROLLER")
        .env_remove("EDGEFORM_TOKEN")
        .env_remove("EDGEFORM_OUTPUT")
        .env_remove("EDGEFORM_INSECURE")
        .env_remove("EDGEFORM_TIMEOUT")
        .env_remove("EDGEFORM_PASSWORD")
        .env_remove("RUST_LOG");
    cmd
}

/// An `edgeform` command aimed at `server` with a session token.
fn against(server: &MockServer) -> assert_cmd::Command {
    let mut cmd = edgeform_cmd();
    cmd.args(["--controller", &server.uri(), "--token", "test-token"]);
    cmd
}

fn json_file(value: &serde_json::Value) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{value}").unwrap();
    file
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

const APP_FLAGS: &[&str] = &[
    "--name",
    "nginx",
    "--type",
    "container",
    "--app-version",
    "1.25",
    "--vendor",
    "F5",
    "--cores",
    "2",
    "--memory",
    "512",
    "--source",
    "docker.io/nginx:1.25",
];

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = edgeform_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    edgeform_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("apps")
            .and(predicate::str::contains("policies"))
            .and(predicate::str::contains("nodes"))
            .and(predicate::str::contains("validate")),
    );
}

#[test]
fn test_version_flag() {
    edgeform_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("edgeform"));
}

#[test]
fn test_completions_zsh() {
    edgeform_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

#[test]
fn test_completions_bash() {
    edgeform_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

// ── Schemas ─────────────────────────────────────────────────────────

#[test]
fn test_schema_list() {
    edgeform_cmd()
        .args(["schema", "list", "--output", "plain"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("traffic-policy")
                .and(predicate::str::contains("node-interface-policy"))
                .and(predicate::str::contains("app")),
        );
}

#[test]
fn test_schema_show_json_carries_patterns() {
    edgeform_cmd()
        .args(["schema", "show", "traffic_policy", "-o", "json"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("\"traffic_rules\"")
                .and(predicate::str::contains("Please, enter a valid IP address.")),
        );
}

#[test]
fn test_schema_show_unknown_type() {
    edgeform_cmd()
        .args(["schema", "show", "zone"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unknown resource type"));
}

// ── Offline validation ──────────────────────────────────────────────

#[test]
fn test_validate_reports_every_violation() {
    let doc = json_file(&json!({
        "name": "edge-default",
        "traffic_rules": [{
            "priority": 0,
            "source": { "ip_filter": { "address": "999.1.1.1", "protocol": "gre" } }
        }]
    }));

    edgeform_cmd()
        .args(["validate", "traffic-policy", "--output", "plain", "--from-file"])
        .arg(doc.path())
        .assert()
        .code(9)
        .stdout(
            predicate::str::contains("traffic_rules[0].priority: Priority must be in [1..65535]")
                .and(predicate::str::contains(
                    "traffic_rules[0].source.ip_filter.address: Please, enter a valid IP address.",
                ))
                .and(predicate::str::contains(
                    "traffic_rules[0].source.ip_filter.protocol",
                )),
        );
}

#[test]
fn test_validate_accepts_a_valid_document() {
    let doc = json_file(&json!({
        "name": "edge-default",
        "traffic_rules": [{ "priority": "10", "target": { "action": "drop" } }]
    }));

    edgeform_cmd()
        .args(["validate", "traffic-policy", "-F"])
        .arg(doc.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("is valid"));
}

#[test]
fn test_validate_rejects_malformed_json() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{{ not json").unwrap();

    edgeform_cmd()
        .args(["validate", "app", "-F"])
        .arg(file.path())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("invalid JSON"));
}

// ── Dry runs ────────────────────────────────────────────────────────

#[test]
fn test_app_create_dry_run_builds_lists() {
    let output = edgeform_cmd()
        .args(["apps", "create", "--dry-run", "-o", "json"])
        .args(APP_FLAGS)
        .args(["--port", "80/tcp", "--port", "53/udp", "--feature", "sriov=true"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));

    let body: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(body["name"], "nginx");
    assert_eq!(body["cores"], 2);
    assert_eq!(body["ports"][1], json!({ "port": 53, "protocol": "udp" }));
    assert_eq!(body["epafeatures"][0], json!({ "key": "sriov", "value": "true" }));
}

#[test]
fn test_app_create_dry_run_lists_missing_fields() {
    edgeform_cmd()
        .args(["apps", "create", "--dry-run", "--name", "nginx", "-o", "plain"])
        .assert()
        .code(9)
        .stdout(
            predicate::str::contains("vendor: Vendor is required")
                .and(predicate::str::contains("cores: Cores is required")),
        );
}

#[test]
fn test_policy_create_set_appends_rules() {
    let output = edgeform_cmd()
        .args(["policies", "create", "--dry-run", "-o", "json"])
        .args(["--set", "name=edge-default"])
        .args(["--set", "traffic_rules[0].priority=10"])
        .args(["--set", "traffic_rules[1].priority=20"])
        .args(["--set", "traffic_rules[1].source.ip_filter.address=10.0.0.1"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));

    let body: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let rules = body["traffic_rules"].as_array().unwrap();
    assert_eq!(rules.len(), 2);
    assert_eq!(rules[1]["source"]["ip_filter"]["address"], "10.0.0.1");
    assert!(rules[0].get("source").is_none());
}

#[test]
fn test_policy_create_requires_input() {
    edgeform_cmd()
        .args(["policies", "create"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("nothing to create"));
}

#[test]
fn test_set_read_only_field_is_rejected() {
    edgeform_cmd()
        .args(["policies", "create", "--dry-run", "--set", "id=tp-1"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("read-only"));
}

// ── Configuration ───────────────────────────────────────────────────

#[test]
fn test_show_without_controller() {
    edgeform_cmd()
        .args(["apps", "show", "a1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No controller configured"));
}

#[test]
fn test_config_show_no_config() {
    edgeform_cmd().args(["config", "show"]).assert().success();
}

#[test]
fn test_invalid_output_format() {
    let output = edgeform_cmd()
        .args(["--output", "invalid", "schema", "list"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let text = combined_output(&output);
    assert!(
        text.contains("invalid") || text.contains("possible values"),
        "Expected error about valid output formats:\n{text}"
    );
}

// ── Controller round trips ──────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_app_create_posts_and_prints_saved_model() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/apps"))
        .and(header("authorization", "Bearer test-token"))
        .and(body_partial_json(json!({
            "name": "nginx",
            "type": "container",
            "cores": 2,
            "ports": [{ "port": 80, "protocol": "tcp" }]
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "app-42",
            "name": "nginx"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let output = against(&server)
        .args(["apps", "create", "-o", "plain", "--port", "80/tcp"])
        .args(APP_FLAGS)
        .output()
        .unwrap();

    assert!(output.status.success(), "{}", combined_output(&output));
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "app-42");
    assert!(String::from_utf8_lossy(&output.stderr).contains("Successfully added app."));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_policy_update_fetches_edits_and_patches() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/traffic_policies/tp-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "tp-1",
            "name": "edge-default",
            "traffic_rules": [{ "priority": "10" }]
        })))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/traffic_policies/tp-1"))
        .and(body_partial_json(json!({
            "traffic_rules": [{ "priority": 10 }, { "priority": 20 }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "tp-1",
            "name": "edge-default"
        })))
        .expect(1)
        .mount(&server)
        .await;

    against(&server)
        .args(["policies", "update", "tp-1", "-o", "plain"])
        .args(["--set", "traffic_rules[1].priority=20"])
        .assert()
        .success()
        .stdout(predicate::str::contains("tp-1"))
        .stderr(predicate::str::contains("Successfully updated traffic policy."));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_server_message_is_shown_on_conflict() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/apps"))
        .respond_with(ResponseTemplate::new(409).set_body_string("App name already taken"))
        .mount(&server)
        .await;

    against(&server)
        .args(["apps", "create"])
        .args(APP_FLAGS)
        .assert()
        .code(6)
        .stderr(predicate::str::contains("App name already taken"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_invalid_app_is_never_sent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    against(&server)
        .args(["apps", "create", "--name", "nginx", "--cores", "99"])
        .assert()
        .code(9)
        .stdout(predicate::str::contains("Cores must be in [1..8]"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unauthorized_suggests_login() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/nodes/n-1"))
        .respond_with(ResponseTemplate::new(401).set_body_string("token expired"))
        .mount(&server)
        .await;

    against(&server)
        .args(["nodes", "show", "n-1"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("edgeform login"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_nodes_list_accepts_bare_array() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/nodes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "n-1", "name": "edge-1", "location": "lab", "serial": "SN1" },
            { "id": "n-2", "name": "edge-2", "location": "roof", "serial": "SN2" }
        ])))
        .mount(&server)
        .await;

    against(&server)
        .args(["nodes", "list", "-o", "plain"])
        .assert()
        .success()
        .stdout(predicate::str::diff("n-1\nn-2\n"));
}
