// crates/access-handler-core/src/core/deployment.rs
// ============================================================================
// Module: Deployment Records
// Description: Registered handler deployments and their recorded health.
// Purpose: Provide the persisted record mutated by the health-check engine.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A [`Deployment`] is created when an operator registers a handler and is only
//! mutated by the health-check engine afterwards. It carries the most recent
//! health verdict, the diagnostics that produced it, and the last-known target
//! schema used for drift detection.
//!
//! Invariants:
//! - `healthy` is the logical AND of every config-validation entry seen in the
//!   most recent describe response.
//! - `diagnostics` hold only the lines recorded by the most recent check.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::core::describe::ProviderInfo;
use crate::core::identifiers::DeploymentLocator;
use crate::core::schema::TargetSchema;

// ============================================================================
// SECTION: Diagnostics
// ============================================================================

/// Severity of a diagnostic line reported by a provider.
///
/// Providers choose their own level labels. Known labels match without regard
/// to case and anything else decodes as [`DiagnosticLevel::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum DiagnosticLevel {
    /// Label not recognized.
    Unknown,
    /// Debug output.
    Debug,
    /// Informational line.
    Info,
    /// Positive confirmation of a check.
    Success,
    /// Non-fatal problem.
    Warning,
    /// Fatal problem.
    Error,
}

impl DiagnosticLevel {
    /// Returns a stable label for the level.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }

    /// Parses a provider-supplied level label.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        let label = label.trim();
        [
            ("debug", Self::Debug),
            ("info", Self::Info),
            ("success", Self::Success),
            ("warning", Self::Warning),
            ("warn", Self::Warning),
            ("error", Self::Error),
        ]
        .into_iter()
        .find_map(|(known, level)| label.eq_ignore_ascii_case(known).then_some(level))
        .unwrap_or(Self::Unknown)
    }
}

impl From<String> for DiagnosticLevel {
    fn from(label: String) -> Self {
        Self::from_label(&label)
    }
}

impl fmt::Display for DiagnosticLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single diagnostic line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Severity of the line.
    pub level: DiagnosticLevel,
    /// Human-readable message.
    pub message: String,
}

impl Diagnostic {
    /// Creates a new diagnostic line.
    #[must_use]
    pub fn new(level: DiagnosticLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }
}

// ============================================================================
// SECTION: Deployment
// ============================================================================

/// Registered handler deployment.
///
/// # Invariants
/// - `locator` is the identity; stores key records by it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deployment {
    /// Deployment identity.
    pub locator: DeploymentLocator,
    /// Cloud account hosting the handler.
    pub account: String,
    /// Cloud region hosting the handler.
    pub region: String,
    /// Result of the most recent health check.
    #[serde(default)]
    pub healthy: bool,
    /// Diagnostic lines recorded by the most recent health check.
    #[serde(default)]
    pub diagnostics: Vec<Diagnostic>,
    /// Provider identity reported by the most recent describe call.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<ProviderInfo>,
    /// Last-known target schema, keyed by target kind.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_schema: Option<BTreeMap<String, TargetSchema>>,
}

impl Deployment {
    /// Creates a newly registered deployment with no recorded health.
    #[must_use]
    pub fn new(
        locator: impl Into<DeploymentLocator>,
        account: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        Self {
            locator: locator.into(),
            account: account.into(),
            region: region.into(),
            healthy: false,
            diagnostics: Vec::new(),
            provider: None,
            target_schema: None,
        }
    }

    /// Returns the diagnostics at or above the given severity.
    pub fn diagnostics_at_least(
        &self,
        level: DiagnosticLevel,
    ) -> impl Iterator<Item = &Diagnostic> + '_ {
        self.diagnostics.iter().filter(move |diagnostic| diagnostic.level >= level)
    }
}
