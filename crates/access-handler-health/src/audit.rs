// crates/access-handler-health/src/audit.rs
// ============================================================================
// Module: Health Check Audit Logging
// Description: Structured audit events for health-check runs.
// Purpose: Emit JSON-line run records without a logging framework dependency.
// Dependencies: access-handler-config, access-handler-core, serde
// ============================================================================

//! ## Overview
//! Health-check runs emit three event kinds: `health_check_phase` when the
//! engine enters a phase, `deployment_check` per deployment, and
//! `health_check_run` when a run ends. Sinks decide where the JSON lines go;
//! recording never fails the run.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use access_handler_config::AuditConfig;
use access_handler_config::AuditSinkKind;
use access_handler_core::DeploymentLocator;
use access_handler_core::FailureKind;
use access_handler_core::RuntimeError;
use serde::Serialize;

use crate::diagnostics::DeploymentUpdate;
use crate::engine::HealthPhase;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Phase transition event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthPhaseEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Phase being entered.
    pub phase: HealthPhase,
    /// Number of deployments the phase covers, when known.
    pub deployments: Option<usize>,
}

impl HealthPhaseEvent {
    /// Creates a phase event stamped with the current time.
    #[must_use]
    pub fn new(phase: HealthPhase, deployments: Option<usize>) -> Self {
        Self {
            event: "health_check_phase",
            timestamp_ms: now_ms(),
            phase,
            deployments,
        }
    }
}

/// Result classification of a single deployment check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckOutcome {
    /// Describe succeeded and every config entry passed.
    Healthy,
    /// Describe succeeded and at least one config entry failed.
    Unhealthy,
    /// Describe did not produce a usable response.
    Failed,
}

/// Per-deployment check event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeploymentCheckEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Deployment locator.
    pub locator: String,
    /// Check outcome.
    pub outcome: CheckOutcome,
    /// Number of diagnostics recorded for the deployment.
    pub diagnostics: usize,
    /// Whether the reported target schema drifted.
    pub schema_drift: bool,
    /// Failure classification when the check failed.
    pub failure_kind: Option<FailureKind>,
    /// Error message when the check failed.
    pub error: Option<String>,
    /// Wall-clock duration of the check.
    pub elapsed_ms: u128,
}

impl DeploymentCheckEvent {
    /// Creates a check event for one deployment outcome.
    #[must_use]
    pub fn new(
        locator: &DeploymentLocator,
        result: &Result<DeploymentUpdate, RuntimeError>,
        elapsed: Duration,
    ) -> Self {
        let mut event = Self {
            event: "deployment_check",
            timestamp_ms: now_ms(),
            locator: locator.to_string(),
            outcome: CheckOutcome::Failed,
            diagnostics: 0,
            schema_drift: false,
            failure_kind: None,
            error: None,
            elapsed_ms: elapsed.as_millis(),
        };
        match result {
            Ok(update) => {
                event.outcome = if update.deployment.healthy {
                    CheckOutcome::Healthy
                } else {
                    CheckOutcome::Unhealthy
                };
                event.diagnostics = update.deployment.diagnostics.len();
                event.schema_drift = update.schema_drift;
            }
            Err(err) => {
                event.failure_kind = Some(err.failure_kind());
                event.error = Some(err.to_string());
            }
        }
        event
    }
}

/// Run completion classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    /// Every deployment was checked and persisted.
    Completed,
    /// Some deployments failed; successes were persisted.
    PartialFailure,
    /// The run stopped early and persisted nothing.
    Aborted,
    /// The caller cancelled the run; nothing was persisted.
    Cancelled,
}

/// Run summary event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthRunEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Run outcome.
    pub outcome: RunOutcome,
    /// Deployments checked healthy.
    pub healthy: usize,
    /// Deployments checked unhealthy.
    pub unhealthy: usize,
    /// Deployments whose check failed.
    pub failed: usize,
    /// Deployments written back to the store.
    pub persisted: usize,
    /// Error message when the run did not complete.
    pub error: Option<String>,
}

/// Run summary counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunCounts {
    /// Deployments checked healthy.
    pub healthy: usize,
    /// Deployments checked unhealthy.
    pub unhealthy: usize,
    /// Deployments whose check failed.
    pub failed: usize,
    /// Deployments written back to the store.
    pub persisted: usize,
}

impl HealthRunEvent {
    /// Creates a run event stamped with the current time.
    #[must_use]
    pub fn new(outcome: RunOutcome, counts: RunCounts, error: Option<String>) -> Self {
        Self {
            event: "health_check_run",
            timestamp_ms: now_ms(),
            outcome,
            healthy: counts.healthy,
            unhealthy: counts.unhealthy,
            failed: counts.failed,
            persisted: counts.persisted,
            error,
        }
    }
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Audit sink for health-check events.
pub trait HealthAuditSink: Send + Sync {
    /// Record a phase transition.
    fn record_phase(&self, event: &HealthPhaseEvent);

    /// Record a deployment check.
    fn record_check(&self, event: &DeploymentCheckEvent);

    /// Record a run summary.
    fn record_run(&self, event: &HealthRunEvent);
}

/// Audit sink that logs JSON lines to stderr.
pub struct StderrAuditSink;

impl StderrAuditSink {
    /// Writes one event as a JSON line.
    fn emit<T: Serialize>(event: &T) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

impl HealthAuditSink for StderrAuditSink {
    fn record_phase(&self, event: &HealthPhaseEvent) {
        Self::emit(event);
    }

    fn record_check(&self, event: &DeploymentCheckEvent) {
        Self::emit(event);
    }

    fn record_run(&self, event: &HealthRunEvent) {
        Self::emit(event);
    }
}

/// Audit sink that logs JSON lines to a file.
pub struct FileAuditSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileAuditSink {
    /// Opens the audit log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }

    /// Appends one event as a JSON line.
    fn emit<T: Serialize>(&self, event: &T) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

impl HealthAuditSink for FileAuditSink {
    fn record_phase(&self, event: &HealthPhaseEvent) {
        self.emit(event);
    }

    fn record_check(&self, event: &DeploymentCheckEvent) {
        self.emit(event);
    }

    fn record_run(&self, event: &HealthRunEvent) {
        self.emit(event);
    }
}

/// No-op audit sink.
pub struct NoopAuditSink;

impl HealthAuditSink for NoopAuditSink {
    fn record_phase(&self, _event: &HealthPhaseEvent) {}

    fn record_check(&self, _event: &DeploymentCheckEvent) {}

    fn record_run(&self, _event: &HealthRunEvent) {}
}

/// Builds the sink selected by the audit configuration.
///
/// # Errors
///
/// Returns an error when the file sink has no path or cannot be opened.
pub fn audit_sink_from_config(config: &AuditConfig) -> io::Result<Arc<dyn HealthAuditSink>> {
    match config.sink {
        AuditSinkKind::Stderr => Ok(Arc::new(StderrAuditSink)),
        AuditSinkKind::Disabled => Ok(Arc::new(NoopAuditSink)),
        AuditSinkKind::File => {
            let path = config.path.as_deref().ok_or_else(|| {
                io::Error::new(io::ErrorKind::InvalidInput, "audit.path is required")
            })?;
            Ok(Arc::new(FileAuditSink::new(path)?))
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns the current time in milliseconds since the epoch.
fn now_ms() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis()
}
