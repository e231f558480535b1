// crates/access-handler-core/src/core/policy.rs
// ============================================================================
// Module: Runtime and Check Policies
// Description: Explicit mode and failure-policy selectors.
// Purpose: Replace hidden process state with values passed at construction.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Runtime selection and batch failure handling are explicit values threaded
//! through constructors. Nothing in this crate reads them from process state.

use serde::Deserialize;
use serde::Serialize;

/// Command line used to start the local development harness.
///
/// The program path is relative to the harness working directory.
pub const DEFAULT_LOCAL_COMMAND: &[&str] = &[".venv/bin/python", "-m", "provider.local_runtime"];

/// Selects which runtime variant serves a deployment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuntimeMode {
    /// Invoke the deployed cloud function.
    #[default]
    Remote,
    /// Invoke a local development harness.
    Local,
}

/// How a batch health check reacts to a failed deployment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Attempt every deployment, persist successes, report failures together.
    #[default]
    Collect,
    /// Abort on failure and persist nothing.
    ///
    /// The reported failure is the earliest-listed failing deployment, even
    /// when a later-listed one fails sooner.
    FailFast,
}
