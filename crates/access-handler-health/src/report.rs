// crates/access-handler-health/src/report.rs
// ============================================================================
// Module: Health Reports
// Description: Per-run results for administrative surfaces.
// Purpose: Summarize checked deployments and failures in listing order.
// Dependencies: access-handler-core, serde
// ============================================================================

//! ## Overview
//! A [`HealthReport`] lists every deployment of a run exactly once, either as a
//! [`DeploymentSummary`] or a [`DeploymentFailure`], each in listing order.

use access_handler_core::DeploymentLocator;
use access_handler_core::Diagnostic;
use access_handler_core::FailureKind;
use access_handler_core::RuntimeError;
use serde::Serialize;

use crate::diagnostics::DeploymentUpdate;

/// Health of one successfully checked deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentSummary {
    /// Deployment identity.
    pub locator: DeploymentLocator,
    /// Health computed by this run.
    pub healthy: bool,
    /// Diagnostics recorded by this run.
    pub diagnostics: Vec<Diagnostic>,
    /// Whether the reported target schema drifted.
    pub schema_drift: bool,
}

impl From<&DeploymentUpdate> for DeploymentSummary {
    fn from(update: &DeploymentUpdate) -> Self {
        Self {
            locator: update.deployment.locator.clone(),
            healthy: update.deployment.healthy,
            diagnostics: update.deployment.diagnostics.clone(),
            schema_drift: update.schema_drift,
        }
    }
}

/// Deployment whose check produced no usable response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentFailure {
    /// Deployment identity.
    pub locator: DeploymentLocator,
    /// Failure classification.
    pub kind: FailureKind,
    /// Error message.
    pub message: String,
}

impl DeploymentFailure {
    /// Builds a failure record from a runtime error.
    #[must_use]
    pub fn new(locator: DeploymentLocator, error: &RuntimeError) -> Self {
        Self {
            locator,
            kind: error.failure_kind(),
            message: error.to_string(),
        }
    }
}

/// Outcome of one health-check run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    /// Checked deployments in listing order.
    pub deployments: Vec<DeploymentSummary>,
    /// Failed deployments in listing order.
    pub failures: Vec<DeploymentFailure>,
    /// Number of deployments written back to the store.
    pub persisted: usize,
}

impl HealthReport {
    /// Total deployments covered by the run.
    #[must_use]
    pub fn total(&self) -> usize {
        self.deployments.len() + self.failures.len()
    }

    /// Deployments checked healthy.
    #[must_use]
    pub fn healthy_count(&self) -> usize {
        self.deployments.iter().filter(|summary| summary.healthy).count()
    }

    /// Deployments checked unhealthy.
    #[must_use]
    pub fn unhealthy_count(&self) -> usize {
        self.deployments.iter().filter(|summary| !summary.healthy).count()
    }

    /// Deployments whose check failed.
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.failures.len()
    }

    /// Deployments reporting schema drift.
    #[must_use]
    pub fn drift_count(&self) -> usize {
        self.deployments.iter().filter(|summary| summary.schema_drift).count()
    }

    /// Returns the summary for `locator`, if it was checked.
    #[must_use]
    pub fn summary(&self, locator: &DeploymentLocator) -> Option<&DeploymentSummary> {
        self.deployments.iter().find(|summary| &summary.locator == locator)
    }
}
