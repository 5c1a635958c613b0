// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(clippy::unwrap_used)]
//! End-to-end runs of the `build_api` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn config_dir(&self) -> PathBuf {
        self.path("config")
    }

    fn input(&self, json: &str) -> PathBuf {
        let path = self.path("input.json");
        fs::write(&path, json).unwrap();
        path
    }

    fn build_api(&self) -> Command {
        let mut cmd = Command::cargo_bin("build_api").unwrap();
        cmd.env("BUILD_API_CONFIG_DIR", self.config_dir()).env_remove("RUST_LOG");
        cmd
    }

    fn call(&self, method: &str, input: &Path, extra: &[&str]) -> Command {
        let mut cmd = self.build_api();
        cmd.arg(method)
            .arg("--input-json")
            .arg(input)
            .arg("--output-json")
            .arg(self.path("output.json"))
            .args(extra);
        cmd
    }

    fn output(&self) -> serde_json::Value {
        serde_json::from_str(&fs::read_to_string(self.path("output.json")).unwrap()).unwrap()
    }
}

#[test]
fn list_services_prints_every_method() {
    let ws = Workspace::new();
    ws.build_api()
        .arg("--list-services")
        .assert()
        .success()
        .stdout(predicate::str::contains("chromite.api.ApiService/GetVersion"))
        .stdout(predicate::str::contains("chromite.api.TestApiService/InputOutputMethod"));
}

#[test]
fn get_version_writes_pretty_output() {
    let ws = Workspace::new();
    let input = ws.input("{}");
    ws.call("chromite.api.ApiService/GetVersion", &input, &[])
        .assert()
        .code(0);
    let raw = fs::read_to_string(ws.path("output.json")).unwrap();
    assert!(raw.contains('\n'), "{raw}");
    assert_eq!(ws.output()["major"], 1);
}

#[test]
fn echo_call_round_trips_through_files() {
    let ws = Workspace::new();
    let input = ws.input(r#"{"id":"Input ID"}"#);
    ws.call(ECHO, &input, &[]).assert().success();
    assert_eq!(ws.output()["result"], "Input ID");
}

const ECHO: &str = "chromite.api.TestApiService/InputOutputMethod";

#[test]
fn validate_only_reports_invalid_input() {
    let ws = Workspace::new();
    let input = ws.input("{}");
    ws.call(ECHO, &input, &["--validate-only"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("id is required"));
    assert!(!ws.path("output.json").exists());
}

#[test]
fn valid_input_exits_zero() {
    let ws = Workspace::new();
    let input = ws.input(r#"{"id":"ok"}"#);
    ws.call(ECHO, &input, &["--validate-only"]).assert().code(0);
    assert!(ws.path("output.json").is_file());
}

#[test]
fn mock_failure_writes_the_error_response() {
    let ws = Workspace::new();
    let input = ws.input("{}");
    ws.call(ECHO, &input, &["--mock-failure"]).assert().code(5);
    assert_eq!(ws.output()["result"], "mock failure");
}

#[test]
fn conflicting_call_types_are_a_usage_error() {
    let ws = Workspace::new();
    let input = ws.input("{}");
    ws.call(ECHO, &input, &["--mock-call", "--mock-invalid"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn unknown_method_is_unrecoverable() {
    let ws = Workspace::new();
    let input = ws.input("{}");
    ws.call("chromite.api.ApiService/Missing", &input, &[])
        .assert()
        .code(2)
        .stderr(predicate::str::contains(
            "unknown method: chromite.api.ApiService/Missing",
        ));
}

#[test]
fn missing_input_file_is_unrecoverable() {
    let ws = Workspace::new();
    ws.call("chromite.api.ApiService/GetVersion", &ws.path("nope.json"), &[])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn malformed_service_method_is_rejected() {
    let ws = Workspace::new();
    let input = ws.input("{}");
    ws.call("GetVersion", &input, &[])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("expected Service/Method"));
}

#[test]
fn runs_never_write_preferences() {
    let ws = Workspace::new();
    ws.build_api().arg("--list-services").assert().success();
    let input = ws.input("{}");
    ws.call("chromite.api.ApiService/GetVersion", &input, &[])
        .assert()
        .success();
    assert!(!ws.config_dir().exists());
}

#[test]
fn saved_preferences_are_respected() {
    let ws = Workspace::new();
    ws.build_api()
        .args(["--save-prefs", "--pretty-output", "false"])
        .assert()
        .success();
    let saved = ws.config_dir().join("build_api.json");
    let stored: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&saved).unwrap()).unwrap();
    assert_eq!(stored["pretty_output"], false);
    assert_eq!(stored["log_filter"], "info");

    let input = ws.input("{}");
    ws.call("chromite.api.ApiService/GetVersion", &input, &[])
        .assert()
        .success();
    let raw = fs::read_to_string(ws.path("output.json")).unwrap();
    assert_eq!(raw, r#"{"bug":0,"major":1,"minor":0}"#);

    ws.call("chromite.api.ApiService/GetVersion", &input, &["--pretty-output", "true"])
        .assert()
        .success();
    let raw = fs::read_to_string(ws.path("output.json")).unwrap();
    assert!(raw.contains('\n'), "{raw}");
}

#[test]
fn unreadable_preferences_fall_back_to_defaults() {
    let ws = Workspace::new();
    fs::create_dir_all(ws.config_dir()).unwrap();
    fs::write(ws.config_dir().join("build_api.json"), "{not json").unwrap();
    let input = ws.input("{}");
    ws.call("chromite.api.ApiService/GetVersion", &input, &[])
        .assert()
        .success()
        .stderr(predicate::str::contains("using default preferences"));
}
