// crates/access-handler-config/tests/config_validation.rs
// ============================================================================
// Module: Config Validation Tests
// Description: Section-level parsing and bounds checks.
// Purpose: Ensure every section defaults sensibly and rejects bad values.
// ============================================================================

//! ## Overview
//! Parses representative `access-handler.toml` documents and checks both the
//! accepted shapes and the fail-closed rejections for each section.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    clippy::use_debug,
    reason = "Test-only assertions and helpers are permitted."
)]

use std::path::PathBuf;
use std::time::Duration;

use access_handler_config::AccessHandlerConfig;
use access_handler_config::AuditSinkKind;
use access_handler_config::ConfigError;
use access_handler_config::DEFAULT_HEALTH_CONCURRENCY;
use access_handler_core::DEFAULT_LOCAL_COMMAND;
use access_handler_core::FailurePolicy;
use access_handler_core::RuntimeMode;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn invalid_message(toml: &str) -> String {
    match AccessHandlerConfig::from_toml_str(toml) {
        Err(ConfigError::Invalid(message)) => message,
        other => panic!("expected invalid config, got {other:?}"),
    }
}

// ============================================================================
// SECTION: Accepted Shapes
// ============================================================================

#[test]
fn defaults_select_remote_collect_and_stderr() {
    let config = AccessHandlerConfig::from_toml_str("").unwrap();
    assert_eq!(config.runtime.mode, RuntimeMode::Remote);
    assert_eq!(config.runtime.local.command, DEFAULT_LOCAL_COMMAND);
    assert_eq!(config.health.concurrency, DEFAULT_HEALTH_CONCURRENCY);
    assert_eq!(config.health.failure_policy, FailurePolicy::Collect);
    assert_eq!(config.health.describe_timeout(), None);
    assert_eq!(config.audit.sink, AuditSinkKind::Stderr);
}

#[test]
fn full_document_parses() {
    let config = AccessHandlerConfig::from_toml_str(
        r#"
[runtime]
mode = "local"

[runtime.aws]
region = "ap-southeast-2"
profile = "governance"

[runtime.local]
command = ["bin/handler", "--stdio"]

[health]
concurrency = 16
failure_policy = "fail_fast"
describe_timeout_ms = 30000

[audit]
sink = "file"
path = "logs/health.jsonl"
"#,
    )
    .unwrap();
    assert_eq!(config.runtime.mode, RuntimeMode::Local);
    assert_eq!(config.runtime.aws.region.as_deref(), Some("ap-southeast-2"));
    assert_eq!(config.runtime.aws.profile.as_deref(), Some("governance"));
    assert_eq!(config.runtime.local.command, vec!["bin/handler", "--stdio"]);
    assert_eq!(config.health.concurrency, 16);
    assert_eq!(config.health.failure_policy, FailurePolicy::FailFast);
    assert_eq!(config.health.describe_timeout(), Some(Duration::from_secs(30)));
    assert_eq!(config.audit.sink, AuditSinkKind::File);
    assert_eq!(config.audit.path, Some(PathBuf::from("logs/health.jsonl")));
}

#[test]
fn none_sink_disables_audit() {
    let config = AccessHandlerConfig::from_toml_str("[audit]\nsink = \"none\"\n").unwrap();
    assert_eq!(config.audit.sink, AuditSinkKind::Disabled);
}

// ============================================================================
// SECTION: Rejections
// ============================================================================

#[test]
fn unknown_mode_is_a_parse_error() {
    let err = AccessHandlerConfig::from_toml_str("[runtime]\nmode = \"hybrid\"\n").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn concurrency_bounds_are_enforced() {
    assert!(invalid_message("[health]\nconcurrency = 0\n").contains("health.concurrency"));
    assert!(invalid_message("[health]\nconcurrency = 65\n").contains("health.concurrency"));
    assert!(AccessHandlerConfig::from_toml_str("[health]\nconcurrency = 64\n").is_ok());
}

#[test]
fn describe_timeout_bounds_are_enforced() {
    assert!(
        invalid_message("[health]\ndescribe_timeout_ms = 0\n").contains("describe_timeout_ms")
    );
    assert!(
        invalid_message("[health]\ndescribe_timeout_ms = 900001\n")
            .contains("describe_timeout_ms")
    );
}

#[test]
fn file_sink_requires_path() {
    assert!(invalid_message("[audit]\nsink = \"file\"\n").contains("audit.path"));
    assert!(invalid_message("[audit]\nsink = \"file\"\npath = \"  \"\n").contains("audit.path"));
}

#[test]
fn path_fields_are_length_bounded() {
    let long_component = "a".repeat(300);
    let audit = format!("[audit]\nsink = \"file\"\npath = \"logs/{long_component}.jsonl\"\n");
    assert_eq!(invalid_message(&audit), "audit.path component too long");

    let long_path = "a/".repeat(2_100);
    let command = format!("[runtime.local]\ncommand = [\"{long_path}python\"]\n");
    assert_eq!(invalid_message(&command), "runtime.local.command[0] exceeds max length");
}

#[test]
fn local_command_must_name_a_program() {
    assert!(invalid_message("[runtime.local]\ncommand = []\n").contains("runtime.local.command"));
    assert!(
        invalid_message("[runtime.local]\ncommand = [\" \"]\n").contains("runtime.local.command")
    );
}

#[test]
fn region_must_be_well_formed() {
    assert!(invalid_message("[runtime.aws]\nregion = \"US East\"\n").contains("runtime.aws.region"));
    assert!(invalid_message("[runtime.aws]\nregion = \"\"\n").contains("runtime.aws.region"));
    assert!(invalid_message("[runtime.aws]\nprofile = \"\"\n").contains("runtime.aws.profile"));
}
