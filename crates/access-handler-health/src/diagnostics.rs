// crates/access-handler-health/src/diagnostics.rs
// ============================================================================
// Module: Describe Aggregation
// Description: Folds a describe response into a deployment record.
// Purpose: Derive health, diagnostics, and schema drift from one response.
// Dependencies: access-handler-core
// ============================================================================

//! ## Overview
//! [`apply_describe`] is the pure half of a deployment check. It replaces the
//! deployment's diagnostics with the logs of the latest response and
//! recomputes health from it.
//!
//! Invariants:
//! - `healthy` is the AND of every config-validation entry's `success`; an
//!   empty validation map is healthy.
//! - Diagnostics are replaced, never appended, and follow config-field order.
//! - Schema drift adds a warning diagnostic but never changes `healthy`.
//! - The last-known target schema is set on first observation and otherwise
//!   left untouched.

// ============================================================================
// SECTION: Imports
// ============================================================================

use access_handler_core::Deployment;
use access_handler_core::Diagnostic;
use access_handler_core::DiagnosticLevel;
use access_handler_core::ProviderDescribe;
use access_handler_core::drifted_kinds;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Deployment record produced by a successful check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentUpdate {
    /// Updated deployment, ready to persist.
    pub deployment: Deployment,
    /// Whether the reported target schema differs from the last-known one.
    pub schema_drift: bool,
}

// ============================================================================
// SECTION: Aggregation
// ============================================================================

/// Applies a describe response to `deployment`.
#[must_use]
pub fn apply_describe(mut deployment: Deployment, describe: &ProviderDescribe) -> DeploymentUpdate {
    deployment.diagnostics = describe
        .config_validation
        .values()
        .flat_map(|entry| entry.logs.iter().cloned())
        .collect();
    deployment.healthy = describe.all_config_valid();
    deployment.provider = Some(describe.provider.clone());

    let mut schema_drift = false;
    if let Some(reported) = &describe.schema {
        match &deployment.target_schema {
            None => deployment.target_schema = Some(reported.target.clone()),
            Some(known) => {
                let drifted = drifted_kinds(known, &reported.target);
                if !drifted.is_empty() {
                    schema_drift = true;
                    deployment.diagnostics.push(Diagnostic::new(
                        DiagnosticLevel::Warning,
                        format!(
                            "provider {} reports a changed target schema for: {}",
                            describe.provider.version,
                            drifted.join(", ")
                        ),
                    ));
                }
            }
        }
    }

    DeploymentUpdate {
        deployment,
        schema_drift,
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
