//! Integration tests for argument parsing and the read-only commands.

#![allow(clippy::expect_used)]

use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn puppet_provision() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("puppet-provision"));
    cmd.env("NO_COLOR", "1")
        .env_remove("PUPPET_PROVISION_CONTEXT")
        .env_remove("PUPPET_PROVISION_SUDO");
    cmd
}

/// Write `contents` as `name` into a fresh temp dir.
fn context_file(name: &str, contents: &str) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join(name);
    std::fs::write(&path, contents).expect("write context");
    (dir, path)
}

const VALID_JSON: &str = r#"{
    "node_id": "vm_1",
    "node_name": "web",
    "operation": "configure",
    "properties": {
        "puppet_config": {
            "environment": "My Env",
            "server": "puppet.example.com",
            "tags": ["a", "b"],
            "node_name_prefix": "pfx-",
            "add_operation_tag": true
        }
    }
}"#;

// --- Help and version ---

#[test]
fn test_cli_no_args_shows_help() {
    puppet_provision()
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Usage:"));
}

#[test]
fn test_cli_help_lists_subcommands() {
    puppet_provision()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("validate"))
        .stdout(predicate::str::contains("render-config"))
        .stdout(predicate::str::contains("install"))
        .stdout(predicate::str::contains("provision"));
}

#[test]
fn test_cli_version_flag_shows_name() {
    puppet_provision()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("puppet-provision"));
}

// --- validate ---

#[test]
fn test_validate_accepts_valid_context() {
    let (_dir, path) = context_file("context.json", VALID_JSON);
    puppet_provision()
        .arg("--context")
        .arg(&path)
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("my_env"))
        .stdout(predicate::str::contains("a,b,cloudify_operation_configure"));
}

#[test]
fn test_validate_reads_context_from_env() {
    let (_dir, path) = context_file("context.json", VALID_JSON);
    puppet_provision()
        .env("PUPPET_PROVISION_CONTEXT", &path)
        .arg("validate")
        .assert()
        .success();
}

#[test]
fn test_no_color_env_accepts_any_value() {
    let (_dir, path) = context_file("context.json", VALID_JSON);
    for value in ["1", "true", "0", ""] {
        puppet_provision()
            .env("NO_COLOR", value)
            .arg("--context")
            .arg(&path)
            .arg("validate")
            .assert()
            .success()
            .stdout(predicate::str::contains("my_env"));
    }
    puppet_provision()
        .arg("--no-color")
        .arg("--context")
        .arg(&path)
        .arg("validate")
        .assert()
        .success();
}

#[test]
fn test_validate_accepts_yaml_context() {
    let yaml = "\
node_id: vm_1
properties:
  puppet_config:
    environment: e1
    server: puppet
";
    let (_dir, path) = context_file("context.yaml", yaml);
    puppet_provision()
        .arg("--context")
        .arg(&path)
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("e1"));
}

#[test]
fn test_validate_invalid_environment_names_field_and_value() {
    let ctx = r#"{"node_id":"vm_1","properties":{"puppet_config":{"environment":"E!1","server":"p"}}}"#;
    let (_dir, path) = context_file("context.json", ctx);
    puppet_provision()
        .arg("--context")
        .arg(&path)
        .arg("validate")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("puppet_config.environment"))
        .stderr(predicate::str::contains("E!1"));
}

#[test]
fn test_validate_missing_server_is_reported() {
    let ctx = r#"{"node_id":"vm_1","properties":{"puppet_config":{"environment":"e1"}}}"#;
    let (_dir, path) = context_file("context.json", ctx);
    puppet_provision()
        .arg("--context")
        .arg(&path)
        .arg("validate")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("puppet_config.server is missing"));
}

#[test]
fn test_validate_reserved_fact_key_is_rejected() {
    let ctx = r#"{"node_id":"vm_1","properties":{"puppet_config":
        {"environment":"e1","server":"p","facts":{"cloudify":1}}}}"#;
    let (_dir, path) = context_file("context.json", ctx);
    puppet_provision()
        .arg("--context")
        .arg(&path)
        .arg("validate")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("reserved key 'cloudify'"));
}

#[test]
fn test_missing_context_file_fails() {
    let dir = tempfile::tempdir().expect("tempdir");
    puppet_provision()
        .arg("--context")
        .arg(dir.path().join("absent.json"))
        .arg("validate")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("absent.json"));
}

// --- render-config ---

#[test]
fn test_render_config_prints_agent_configuration() {
    let (_dir, path) = context_file("context.json", VALID_JSON);
    puppet_provision()
        .arg("--context")
        .arg(&path)
        .arg("render-config")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("# This file was generated by Cloudify\n[main]\n"))
        .stdout(predicate::str::contains("    environment = my_env\n"))
        .stdout(predicate::str::contains("    server = puppet.example.com\n"))
        .stdout(predicate::str::contains("    node_name_value = pfx-vm_1\n"))
        .stdout(predicate::str::is_match(r"certname = \d{12}-pfx-vm_1\n").expect("regex"));
}
