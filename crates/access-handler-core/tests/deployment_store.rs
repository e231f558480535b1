// crates/access-handler-core/tests/deployment_store.rs
// ============================================================================
// Module: In-Memory Deployment Store Tests
// Description: Listing and batch writes against the in-memory store.
// Purpose: Ensure deterministic listing and last-writer-wins batch semantics.
// ============================================================================

//! ## Overview
//! Exercises the in-memory [`DeploymentStore`] used by engine tests and local
//! demos, plus the deployment record's wire form.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

use access_handler_core::Deployment;
use access_handler_core::DeploymentLocator;
use access_handler_core::DeploymentStore;
use access_handler_core::Diagnostic;
use access_handler_core::DiagnosticLevel;
use access_handler_core::InMemoryDeploymentStore;

#[tokio::test]
async fn lists_deployments_in_locator_order() {
    let store = InMemoryDeploymentStore::with_deployments([
        Deployment::new("c", "111111111111", "us-east-1"),
        Deployment::new("a", "111111111111", "us-east-1"),
        Deployment::new("b", "111111111111", "us-east-1"),
    ]);
    let listed = store.list_deployments().await.unwrap();
    let locators: Vec<&str> = listed.iter().map(|d| d.locator.as_str()).collect();
    assert_eq!(locators, vec!["a", "b", "c"]);
}

#[tokio::test]
async fn put_batch_overwrites_existing_records() {
    let store = InMemoryDeploymentStore::new();
    store.register(Deployment::new("a", "111111111111", "us-east-1")).unwrap();

    let mut updated = Deployment::new("a", "111111111111", "us-east-1");
    updated.healthy = true;
    updated.diagnostics.push(Diagnostic::new(DiagnosticLevel::Info, "ok"));
    let added = Deployment::new("z", "222222222222", "eu-west-1");
    store.put_batch(&[updated.clone(), added]).await.unwrap();

    assert_eq!(store.get(&DeploymentLocator::new("a")).unwrap(), Some(updated));
    assert_eq!(store.list_deployments().await.unwrap().len(), 2);
}

#[test]
fn deployment_serializes_with_camel_case_fields() {
    let mut deployment = Deployment::new("a", "111111111111", "us-east-1");
    deployment.diagnostics.push(Diagnostic::new(DiagnosticLevel::Warning, "slow"));
    let value = serde_json::to_value(&deployment).unwrap();
    assert_eq!(value["locator"], "a");
    assert_eq!(value["diagnostics"][0]["level"], "warning");
    assert!(value.get("targetSchema").is_none());

    let parsed: Deployment = serde_json::from_value(value).unwrap();
    assert_eq!(parsed, deployment);
}

#[test]
fn diagnostics_filter_by_severity() {
    let mut deployment = Deployment::new("a", "111111111111", "us-east-1");
    deployment.diagnostics = vec![
        Diagnostic::new(DiagnosticLevel::Info, "checked"),
        Diagnostic::new(DiagnosticLevel::Error, "broken"),
    ];
    let severe: Vec<&str> = deployment
        .diagnostics_at_least(DiagnosticLevel::Warning)
        .map(|d| d.message.as_str())
        .collect();
    assert_eq!(severe, vec!["broken"]);
}
