// crates/access-handler-core/src/interfaces/mod.rs
// ============================================================================
// Module: Access Handler Interfaces
// Description: Backend-agnostic interfaces for handler runtimes and storage.
// Purpose: Define the contract surfaces used by the health-check engine.
// Dependencies: crate::core, async-trait, thiserror
// ============================================================================

//! ## Overview
//! Interfaces define how the control plane reaches handlers and the deployment
//! store without embedding backend-specific details. Runtime failures are split
//! by cause: infrastructure failures (the handler is unreachable) are kept apart
//! from contract violations (the handler answered with the wrong shape).
//!
//! Invariants:
//! - [`ProviderRuntime`] exposes exactly four operations.
//! - Grant and revoke carry no idempotency guarantee at this layer.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::context::InvocationContext;
use crate::core::Deployment;
use crate::core::LoadResourceResponse;
use crate::core::ProviderDescribe;

// ============================================================================
// SECTION: Runtime Errors
// ============================================================================

/// Handler invocation errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    /// Request payload could not be serialized; no call was made.
    #[error("payload encoding failed: {0}")]
    Encoding(String),
    /// Invocation failed at the infrastructure layer.
    #[error("handler transport error: {0}")]
    Transport(String),
    /// Handler executed and reported a failure.
    #[error("handler reported an error: {0}")]
    Handler(String),
    /// Response did not match the expected shape.
    #[error("handler response did not match the contract: {0}")]
    Deserialization(String),
    /// Invocation exceeded the caller's deadline.
    #[error("handler invocation timed out after {timeout_ms}ms")]
    Timeout {
        /// Deadline applied to the call, in milliseconds.
        timeout_ms: u64,
    },
    /// Invocation was cancelled by the caller.
    #[error("handler invocation cancelled")]
    Cancelled,
}

/// Health-reporting classification of a runtime failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The handler could not be reached.
    Unreachable,
    /// The handler broke the response contract.
    ContractViolation,
    /// The handler ran and failed.
    HandlerFailure,
    /// The caller stopped waiting.
    Cancelled,
}

impl FailureKind {
    /// Returns a stable label for the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unreachable => "unreachable",
            Self::ContractViolation => "contract_violation",
            Self::HandlerFailure => "handler_failure",
            Self::Cancelled => "cancelled",
        }
    }
}

impl RuntimeError {
    /// Classifies the error for health reporting.
    #[must_use]
    pub const fn failure_kind(&self) -> FailureKind {
        match self {
            Self::Transport(_)
            | Self::Timeout {
                ..
            } => FailureKind::Unreachable,
            Self::Encoding(_) | Self::Deserialization(_) => FailureKind::ContractViolation,
            Self::Handler(_) => FailureKind::HandlerFailure,
            Self::Cancelled => FailureKind::Cancelled,
        }
    }
}

// ============================================================================
// SECTION: Provider Runtime
// ============================================================================

/// Arguments identifying the target of a grant or revoke.
pub type TargetArgs = BTreeMap<String, String>;

/// Uniform capability set of a deployed access provider.
#[async_trait]
pub trait ProviderRuntime: Send + Sync {
    /// Requests the provider's identity and config validation.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError`] when the call fails or the response is malformed.
    async fn describe(&self, ctx: &InvocationContext) -> Result<ProviderDescribe, RuntimeError>;

    /// Grants `subject` access to the target.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError`] when the call fails or the handler rejects it.
    async fn grant(
        &self,
        ctx: &InvocationContext,
        subject: &str,
        target: &TargetArgs,
    ) -> Result<(), RuntimeError>;

    /// Revokes `subject` access to the target.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError`] when the call fails or the handler rejects it.
    async fn revoke(
        &self,
        ctx: &InvocationContext,
        subject: &str,
        target: &TargetArgs,
    ) -> Result<(), RuntimeError>;

    /// Runs a resource-loading task of the given kind.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError`] when the call fails or the response is malformed.
    async fn fetch_resources(
        &self,
        ctx: &InvocationContext,
        kind: &str,
        context: &Value,
    ) -> Result<LoadResourceResponse, RuntimeError>;
}

/// Raw request/response invoker for deployed cloud functions.
#[async_trait]
pub trait FunctionInvoker: Send + Sync {
    /// Invokes the function at `locator` synchronously and returns its response bytes.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::Transport`] on infrastructure failure and
    /// [`RuntimeError::Handler`] when the function reports an error.
    async fn invoke(&self, locator: &str, payload: Vec<u8>) -> Result<Vec<u8>, RuntimeError>;
}

/// Selects the runtime serving a deployment.
#[async_trait]
pub trait RuntimeFactory: Send + Sync {
    /// Returns the runtime bound to the deployment.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError`] when no runtime can be built for the deployment.
    async fn runtime_for(
        &self,
        deployment: &Deployment,
    ) -> Result<Box<dyn ProviderRuntime>, RuntimeError>;
}

// ============================================================================
// SECTION: Deployment Store
// ============================================================================

/// Deployment store errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Store I/O error.
    #[error("deployment store io error: {0}")]
    Io(String),
    /// Store data is invalid.
    #[error("deployment store invalid data: {0}")]
    Invalid(String),
    /// Store reported an error.
    #[error("deployment store error: {0}")]
    Store(String),
}

/// Store of registered deployments.
///
/// Writes are last-writer-wins; the store offers no compare-and-swap.
#[async_trait]
pub trait DeploymentStore: Send + Sync {
    /// Lists every registered deployment.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when listing fails.
    async fn list_deployments(&self) -> Result<Vec<Deployment>, StoreError>;

    /// Writes all deployments in one multi-item operation.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the write fails.
    async fn put_batch(&self, deployments: &[Deployment]) -> Result<(), StoreError>;
}
