// crates/access-handler-health/tests/audit_sinks.rs
// ============================================================================
// Module: Health Audit Sink Tests
// Description: JSON-line audit output and config-driven engine wiring.
// Purpose: Ensure audit records are machine-readable and sinks follow config.
// ============================================================================

//! ## Overview
//! Exercises [`FileAuditSink`], [`audit_sink_from_config`], and
//! [`HealthCheckEngine::from_config`].

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

use std::sync::Arc;
use std::time::Duration;

use access_handler_config::AccessHandlerConfig;
use access_handler_config::AuditConfig;
use access_handler_config::AuditSinkKind;
use access_handler_core::DeploymentLocator;
use access_handler_core::FailurePolicy;
use access_handler_core::InMemoryDeploymentStore;
use access_handler_core::InvocationContext;
use access_handler_core::RuntimeError;
use access_handler_health::DeploymentCheckEvent;
use access_handler_health::FileAuditSink;
use access_handler_health::HealthAuditSink;
use access_handler_health::HealthCheckEngine;
use access_handler_health::HealthCheckError;
use access_handler_health::HealthPhase;
use access_handler_health::HealthPhaseEvent;
use access_handler_health::HealthRunEvent;
use access_handler_health::RunCounts;
use access_handler_health::RunOutcome;
use access_handler_health::audit_sink_from_config;
use serde_json::Value;

fn read_lines(path: &std::path::Path) -> Vec<Value> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

#[test]
fn file_sink_appends_json_lines() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("health.log");
    let sink = FileAuditSink::new(&path).unwrap();

    sink.record_phase(&HealthPhaseEvent::new(HealthPhase::Checking, Some(2)));
    let failure = Err(RuntimeError::Timeout {
        timeout_ms: 50,
    });
    sink.record_check(&DeploymentCheckEvent::new(
        &DeploymentLocator::new("d1"),
        &failure,
        Duration::from_millis(51),
    ));
    sink.record_run(&HealthRunEvent::new(
        RunOutcome::PartialFailure,
        RunCounts {
            healthy: 1,
            unhealthy: 0,
            failed: 1,
            persisted: 1,
        },
        Some("1 of 2 deployment checks failed".to_string()),
    ));

    let lines = read_lines(&path);
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0]["event"], "health_check_phase");
    assert_eq!(lines[0]["phase"], "checking");
    assert_eq!(lines[0]["deployments"], 2);
    assert_eq!(lines[1]["event"], "deployment_check");
    assert_eq!(lines[1]["locator"], "d1");
    assert_eq!(lines[1]["outcome"], "failed");
    assert_eq!(lines[1]["failure_kind"], "unreachable");
    assert_eq!(lines[1]["elapsed_ms"], 51);
    assert_eq!(lines[2]["event"], "health_check_run");
    assert_eq!(lines[2]["outcome"], "partial_failure");
    assert_eq!(lines[2]["failed"], 1);
}

#[test]
fn file_sink_preserves_existing_lines() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("health.log");
    std::fs::write(&path, "{\"event\":\"earlier\"}\n").unwrap();

    let sink = FileAuditSink::new(&path).unwrap();
    sink.record_phase(&HealthPhaseEvent::new(HealthPhase::Listing, None));

    let lines = read_lines(&path);
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["event"], "earlier");
    assert!(lines[1]["deployments"].is_null());
}

#[test]
fn file_sink_without_path_is_rejected() {
    let config = AuditConfig {
        sink: AuditSinkKind::File,
        path: None,
    };
    let Err(err) = audit_sink_from_config(&config) else {
        panic!("expected missing path error");
    };
    assert_eq!(err.kind(), std::io::ErrorKind::InvalidInput);
}

#[test]
fn file_sink_in_missing_directory_fails_to_open() {
    let dir = tempfile::tempdir().unwrap();
    let config = AuditConfig {
        sink: AuditSinkKind::File,
        path: Some(dir.path().join("missing").join("health.log")),
    };
    assert!(audit_sink_from_config(&config).is_err());
}

#[tokio::test]
async fn engine_from_config_uses_configured_sink_and_tuning() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("audit.log");
    let document = format!(
        r#"
[health]
concurrency = 2
failure_policy = "fail_fast"
describe_timeout_ms = 1500

[audit]
sink = "file"
path = "{}"
"#,
        log.display()
    );
    let config = AccessHandlerConfig::from_toml_str(&document).unwrap();
    let engine =
        HealthCheckEngine::from_config(&config, Arc::new(InMemoryDeploymentStore::new())).unwrap();
    assert_eq!(engine.config().concurrency, 2);
    assert_eq!(engine.config().failure_policy, FailurePolicy::FailFast);
    assert_eq!(engine.config().describe_timeout, Some(Duration::from_millis(1500)));

    let report = engine.check_all(&InvocationContext::new()).await.unwrap();
    assert_eq!(report.total(), 0);

    let events: Vec<String> = read_lines(&log)
        .iter()
        .map(|line| line["event"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(events.last().map(String::as_str), Some("health_check_run"));
    assert_eq!(events.iter().filter(|event| *event == "health_check_phase").count(), 4);
}

#[test]
fn engine_from_config_reports_unopenable_sink() {
    let config = AccessHandlerConfig {
        audit: AuditConfig {
            sink: AuditSinkKind::File,
            path: None,
        },
        ..AccessHandlerConfig::default()
    };
    let result = HealthCheckEngine::from_config(&config, Arc::new(InMemoryDeploymentStore::new()));
    assert!(matches!(result, Err(HealthCheckError::Audit(_))));
}
