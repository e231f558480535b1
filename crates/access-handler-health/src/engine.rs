// crates/access-handler-health/src/engine.rs
// ============================================================================
// Module: Health Check Engine
// Description: Batch describe of every registered deployment.
// Purpose: Refresh deployment health and persist it in one batch write.
// Dependencies: access-handler-config, access-handler-core, access-handler-runtime, tokio
// ============================================================================

//! ## Overview
//! A run lists all deployments, describes each through its runtime with
//! bounded concurrency, folds each response into the deployment record, and
//! writes every updated record back in one batch. Each run is a full re-check.
//!
//! Invariants:
//! - Results are slotted by listing index; completion order never leaks into
//!   the report or the persisted batch.
//! - A cancelled run persists nothing.
//! - Under [`FailurePolicy::FailFast`] a failed check cancels every
//!   later-listed check, the earliest-listed failure is returned, and nothing
//!   is persisted.
//! - Under [`FailurePolicy::Collect`] every deployment is attempted and the
//!   successful checks are persisted even when others fail.
//! - There is no compare-and-swap between listing and persisting; concurrent
//!   writers lose to the batch write.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;
use std::time::Instant;

use access_handler_config::AccessHandlerConfig;
use access_handler_config::DEFAULT_HEALTH_CONCURRENCY;
use access_handler_config::HealthConfig;
use access_handler_core::Deployment;
use access_handler_core::DeploymentLocator;
use access_handler_core::DeploymentStore;
use access_handler_core::FailurePolicy;
use access_handler_core::InvocationContext;
use access_handler_core::ProviderDescribe;
use access_handler_core::RuntimeError;
use access_handler_core::RuntimeFactory;
use access_handler_core::StoreError;
use access_handler_runtime::RuntimeResolver;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::audit::DeploymentCheckEvent;
use crate::audit::HealthAuditSink;
use crate::audit::HealthPhaseEvent;
use crate::audit::HealthRunEvent;
use crate::audit::NoopAuditSink;
use crate::audit::RunCounts;
use crate::audit::RunOutcome;
use crate::audit::audit_sink_from_config;
use crate::diagnostics::DeploymentUpdate;
use crate::diagnostics::apply_describe;
use crate::report::DeploymentFailure;
use crate::report::DeploymentSummary;
use crate::report::HealthReport;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Engine phases, reported to the audit sink as they are entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthPhase {
    /// No run in progress; entered again when a run stops early.
    Idle,
    /// Listing registered deployments.
    Listing,
    /// Describing deployments.
    Checking,
    /// Writing the updated batch.
    Persisting,
    /// Run finished.
    Done,
}

/// Engine tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthCheckConfig {
    /// Maximum number of describe calls in flight.
    pub concurrency: usize,
    /// Batch reaction to a failed deployment.
    pub failure_policy: FailurePolicy,
    /// Optional per-deployment describe timeout.
    pub describe_timeout: Option<Duration>,
}

impl Default for HealthCheckConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_HEALTH_CONCURRENCY,
            failure_policy: FailurePolicy::default(),
            describe_timeout: None,
        }
    }
}

impl From<&HealthConfig> for HealthCheckConfig {
    fn from(config: &HealthConfig) -> Self {
        Self {
            concurrency: config.concurrency,
            failure_policy: config.failure_policy,
            describe_timeout: config.describe_timeout(),
        }
    }
}

/// Health-check run errors.
#[derive(Debug, Error)]
pub enum HealthCheckError {
    /// Listing or persisting deployments failed; nothing further was written.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// A deployment check failed under the fail-fast policy.
    ///
    /// When several checks fail, this is the earliest-listed one.
    #[error("deployment {locator} check failed: {source}")]
    Deployment {
        /// Deployment whose check failed first.
        locator: DeploymentLocator,
        /// Runtime failure of the check.
        source: RuntimeError,
    },
    /// Some deployment checks failed; successful checks were persisted.
    #[error("{} of {} deployment checks failed", .report.failed_count(), .report.total())]
    PartialFailure {
        /// Full run report, failures included.
        report: Box<HealthReport>,
    },
    /// The caller cancelled the run; nothing was persisted.
    #[error("health check cancelled")]
    Cancelled,
    /// A check task ended without producing a result.
    #[error("health check task failed: {0}")]
    Task(String),
    /// The configured audit sink could not be opened.
    #[error("audit sink unavailable: {0}")]
    Audit(String),
}

/// Result of one deployment check, tagged with its listing index.
struct CheckResult {
    /// Position of the deployment in the listing.
    index: usize,
    /// Updated record or the runtime failure.
    outcome: Result<DeploymentUpdate, RuntimeError>,
    /// Wall-clock duration of the check.
    elapsed: Duration,
}

// ============================================================================
// SECTION: Engine
// ============================================================================

/// Health-check engine over a deployment store and runtime factory.
pub struct HealthCheckEngine {
    /// Registered deployments.
    store: Arc<dyn DeploymentStore>,
    /// Runtime selection per deployment.
    runtimes: Arc<dyn RuntimeFactory>,
    /// Audit sink for run events.
    audit: Arc<dyn HealthAuditSink>,
    /// Engine tuning.
    config: HealthCheckConfig,
}

impl HealthCheckEngine {
    /// Creates an engine with default tuning and no audit output.
    #[must_use]
    pub fn new(store: Arc<dyn DeploymentStore>, runtimes: Arc<dyn RuntimeFactory>) -> Self {
        Self {
            store,
            runtimes,
            audit: Arc::new(NoopAuditSink),
            config: HealthCheckConfig::default(),
        }
    }

    /// Builds an engine from the loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns [`HealthCheckError::Audit`] when the audit sink cannot be opened.
    pub fn from_config(
        config: &AccessHandlerConfig,
        store: Arc<dyn DeploymentStore>,
    ) -> Result<Self, HealthCheckError> {
        let runtimes = Arc::new(RuntimeResolver::from_config(&config.runtime));
        let audit = audit_sink_from_config(&config.audit)
            .map_err(|err| HealthCheckError::Audit(err.to_string()))?;
        Ok(Self::new(store, runtimes)
            .with_audit(audit)
            .with_config(HealthCheckConfig::from(&config.health)))
    }

    /// Replaces the audit sink.
    #[must_use]
    pub fn with_audit(mut self, audit: Arc<dyn HealthAuditSink>) -> Self {
        self.audit = audit;
        self
    }

    /// Replaces the engine tuning.
    #[must_use]
    pub fn with_config(mut self, config: HealthCheckConfig) -> Self {
        self.config = config;
        self
    }

    /// Returns the engine tuning.
    #[must_use]
    pub const fn config(&self) -> &HealthCheckConfig {
        &self.config
    }

    /// Describes one deployment through its runtime.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError`] when no runtime serves the deployment or the
    /// describe call fails.
    pub async fn describe(
        &self,
        ctx: &InvocationContext,
        deployment: &Deployment,
    ) -> Result<ProviderDescribe, RuntimeError> {
        let call_ctx = ctx.child().with_optional_timeout(self.config.describe_timeout);
        let runtime = self.runtimes.runtime_for(deployment).await?;
        runtime.describe(&call_ctx).await
    }

    /// Checks every registered deployment and persists the results.
    ///
    /// # Errors
    ///
    /// - [`HealthCheckError::Store`] when listing or persisting fails.
    /// - [`HealthCheckError::Deployment`] for the earliest-listed failed check
    ///   under [`FailurePolicy::FailFast`].
    /// - [`HealthCheckError::PartialFailure`] when checks failed under
    ///   [`FailurePolicy::Collect`]; successful checks were persisted.
    /// - [`HealthCheckError::Cancelled`] when `ctx` is cancelled.
    pub async fn check_all(
        &self,
        ctx: &InvocationContext,
    ) -> Result<HealthReport, HealthCheckError> {
        self.enter(HealthPhase::Listing, None);
        let deployments = match self.store.list_deployments().await {
            Ok(deployments) => deployments,
            Err(err) => return Err(self.abort(RunCounts::default(), err.into())),
        };
        if ctx.is_cancelled() {
            return Err(self.abort(RunCounts::default(), HealthCheckError::Cancelled));
        }

        self.enter(HealthPhase::Checking, Some(deployments.len()));
        let outcomes = match self.check_each(ctx, &deployments).await {
            Ok(outcomes) => outcomes,
            Err(err) => return Err(self.abort(RunCounts::default(), err)),
        };

        let mut report = HealthReport::default();
        let mut batch = Vec::new();
        for (deployment, outcome) in deployments.iter().zip(outcomes) {
            match outcome {
                Ok(update) => {
                    report.deployments.push(DeploymentSummary::from(&update));
                    batch.push(update.deployment);
                }
                Err(err) => {
                    let locator = deployment.locator.clone();
                    report.failures.push(DeploymentFailure::new(locator, &err));
                }
            }
        }

        self.enter(HealthPhase::Persisting, Some(batch.len()));
        if !batch.is_empty()
            && let Err(err) = self.store.put_batch(&batch).await
        {
            return Err(self.abort(counts(&report), err.into()));
        }
        report.persisted = batch.len();
        self.enter(HealthPhase::Done, Some(report.total()));

        let run_counts = counts(&report);
        if report.failures.is_empty() {
            self.audit.record_run(&HealthRunEvent::new(RunOutcome::Completed, run_counts, None));
            return Ok(report);
        }
        let err = HealthCheckError::PartialFailure {
            report: Box::new(report),
        };
        self.audit.record_run(&HealthRunEvent::new(
            RunOutcome::PartialFailure,
            run_counts,
            Some(err.to_string()),
        ));
        Err(err)
    }

    /// Describes every deployment with bounded concurrency.
    ///
    /// Returns one outcome per deployment in listing order. Under
    /// [`FailurePolicy::FailFast`] a failure cancels every later-listed check
    /// while earlier-listed checks run to completion, so the reported failure
    /// is always the earliest-listed one.
    async fn check_each(
        &self,
        ctx: &InvocationContext,
        deployments: &[Deployment],
    ) -> Result<Vec<Result<DeploymentUpdate, RuntimeError>>, HealthCheckError> {
        let run_ctx = ctx.child().with_optional_timeout(self.config.describe_timeout);
        let permits = Arc::new(Semaphore::new(self.config.concurrency.max(1)));
        let mut call_ctxs = Vec::with_capacity(deployments.len());
        let mut tasks = JoinSet::new();
        for (index, deployment) in deployments.iter().cloned().enumerate() {
            let runtimes = Arc::clone(&self.runtimes);
            let permits = Arc::clone(&permits);
            let call_ctx = run_ctx.child();
            call_ctxs.push(call_ctx.clone());
            tasks.spawn(async move {
                let started = Instant::now();
                let outcome = match permits.acquire_owned().await {
                    Ok(_permit) if call_ctx.is_cancelled() => Err(RuntimeError::Cancelled),
                    Ok(_permit) => {
                        check_deployment(runtimes.as_ref(), &call_ctx, deployment).await
                    }
                    Err(_) => Err(RuntimeError::Cancelled),
                };
                CheckResult {
                    index,
                    outcome,
                    elapsed: started.elapsed(),
                }
            });
        }

        let mut slots: Vec<Option<Result<DeploymentUpdate, RuntimeError>>> =
            deployments.iter().map(|_| None).collect();
        let mut first_failure: Option<usize> = None;
        while let Some(joined) = tasks.join_next().await {
            let result = match joined {
                Ok(result) => result,
                Err(err) => {
                    run_ctx.cancel();
                    return Err(HealthCheckError::Task(err.to_string()));
                }
            };
            let Some(deployment) = deployments.get(result.index) else {
                run_ctx.cancel();
                return Err(HealthCheckError::Task("check index out of range".to_string()));
            };
            self.record_check(&deployment.locator, &result);
            if result.outcome.is_err() {
                if ctx.is_cancelled() {
                    run_ctx.cancel();
                    return Err(HealthCheckError::Cancelled);
                }
                if self.config.failure_policy == FailurePolicy::FailFast
                    && first_failure.is_none_or(|first| result.index < first)
                {
                    first_failure = Some(result.index);
                    for later in call_ctxs.iter().skip(result.index + 1) {
                        later.cancel();
                    }
                }
            }
            if let Some(slot) = slots.get_mut(result.index) {
                *slot = Some(result.outcome);
            }
        }
        if ctx.is_cancelled() {
            return Err(HealthCheckError::Cancelled);
        }
        if let Some(index) = first_failure {
            let failure = slots.get_mut(index).and_then(Option::take);
            return match (deployments.get(index), failure) {
                (Some(deployment), Some(Err(source))) => Err(HealthCheckError::Deployment {
                    locator: deployment.locator.clone(),
                    source,
                }),
                _ => Err(HealthCheckError::Task("failed check result missing".to_string())),
            };
        }
        slots
            .into_iter()
            .map(|slot| {
                slot.ok_or_else(|| HealthCheckError::Task("check produced no result".to_string()))
            })
            .collect()
    }

    /// Reports a phase transition.
    fn enter(&self, phase: HealthPhase, deployments: Option<usize>) {
        self.audit.record_phase(&HealthPhaseEvent::new(phase, deployments));
    }

    /// Reports one deployment check.
    fn record_check(&self, locator: &DeploymentLocator, result: &CheckResult) {
        self.audit.record_check(&DeploymentCheckEvent::new(
            locator,
            &result.outcome,
            result.elapsed,
        ));
    }

    /// Reports an early stop and returns the error.
    fn abort(&self, counts: RunCounts, err: HealthCheckError) -> HealthCheckError {
        let outcome = if matches!(err, HealthCheckError::Cancelled) {
            RunOutcome::Cancelled
        } else {
            RunOutcome::Aborted
        };
        self.enter(HealthPhase::Idle, None);
        self.audit.record_run(&HealthRunEvent::new(outcome, counts, Some(err.to_string())));
        err
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Describes one deployment and folds the response into its record.
async fn check_deployment(
    runtimes: &dyn RuntimeFactory,
    ctx: &InvocationContext,
    deployment: Deployment,
) -> Result<DeploymentUpdate, RuntimeError> {
    let runtime = runtimes.runtime_for(&deployment).await?;
    let describe = runtime.describe(ctx).await?;
    Ok(apply_describe(deployment, &describe))
}

/// Builds run counters from a report.
fn counts(report: &HealthReport) -> RunCounts {
    RunCounts {
        healthy: report.healthy_count(),
        unhealthy: report.unhealthy_count(),
        failed: report.failed_count(),
        persisted: report.persisted,
    }
}
