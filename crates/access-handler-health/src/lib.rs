// crates/access-handler-health/src/lib.rs
// ============================================================================
// Module: Access Handler Health Library
// Description: Health-check engine for registered access provider handlers.
// Purpose: Verify that every deployment is reachable, configured, and stable.
// Dependencies: access-handler-config, access-handler-core, access-handler-runtime
// ============================================================================

//! ## Overview
//! [`HealthCheckEngine`] lists registered deployments, describes each one
//! through the runtime that serves it, and persists refreshed health in one
//! batch. Runs are reported through a [`HealthAuditSink`] and summarized in a
//! [`HealthReport`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod diagnostics;
pub mod engine;
pub mod report;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::CheckOutcome;
pub use audit::DeploymentCheckEvent;
pub use audit::FileAuditSink;
pub use audit::HealthAuditSink;
pub use audit::HealthPhaseEvent;
pub use audit::HealthRunEvent;
pub use audit::NoopAuditSink;
pub use audit::RunCounts;
pub use audit::RunOutcome;
pub use audit::StderrAuditSink;
pub use audit::audit_sink_from_config;
pub use diagnostics::DeploymentUpdate;
pub use diagnostics::apply_describe;
pub use engine::HealthCheckConfig;
pub use engine::HealthCheckEngine;
pub use engine::HealthCheckError;
pub use engine::HealthPhase;
pub use report::DeploymentFailure;
pub use report::DeploymentSummary;
pub use report::HealthReport;
