// crates/access-handler-core/src/core/schema.rs
// ============================================================================
// Module: Provider Schema
// Description: Provider schema snapshots and structural schema comparison.
// Purpose: Detect drift between a registered schema and what a provider reports.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Providers publish a schema describing their configuration fields and the
//! arguments each target kind accepts. The comparison helpers here are pure and
//! side-effect free: a mismatch is a signal of a potentially breaking provider
//! change that callers must surface.
//!
//! Invariants:
//! - [`validate_target_schema`] is reflexive.
//! - Two target arguments match only when `id` and `resource_name` are equal;
//!   both-absent resource names are equal, one-absent is not.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Atomic unit of a target schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetArgument {
    /// Argument identifier.
    pub id: String,
    /// Resource kind the argument refers to, when it is resource-backed.
    #[serde(rename = "resourceName", default)]
    pub resource_name: Option<String>,
}

impl TargetArgument {
    /// Creates a target argument.
    #[must_use]
    pub fn new(id: impl Into<String>, resource_name: Option<&str>) -> Self {
        Self {
            id: id.into(),
            resource_name: resource_name.map(str::to_string),
        }
    }
}

/// Target arguments keyed by argument name.
pub type TargetSchema = BTreeMap<String, TargetArgument>;

/// Schema entry for one provider configuration field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigField {
    /// Whether the value is stored as a secret.
    #[serde(default)]
    pub secret: bool,
}

/// Provider schema: configuration fields and target kinds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderSchema {
    /// Configuration fields keyed by name.
    #[serde(default)]
    pub config: BTreeMap<String, ConfigField>,
    /// Target schemas keyed by target kind.
    #[serde(default)]
    pub target: BTreeMap<String, TargetSchema>,
}

/// Response to the schema operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaResponse {
    /// Provider version serving the schema.
    pub version: String,
    /// Published schema.
    pub schema: ProviderSchema,
}

// ============================================================================
// SECTION: Validation
// ============================================================================

/// Returns true when two target schemas are structurally equivalent.
#[must_use]
pub fn validate_target_schema(left: &TargetSchema, right: &TargetSchema) -> bool {
    if left.len() != right.len() {
        return false;
    }
    left.iter().all(|(key, expected)| {
        right.get(key).is_some_and(|actual| {
            expected.id == actual.id && expected.resource_name == actual.resource_name
        })
    })
}

/// Returns true when every target kind in both snapshots is equivalent.
#[must_use]
pub fn validate_target_kinds(
    left: &BTreeMap<String, TargetSchema>,
    right: &BTreeMap<String, TargetSchema>,
) -> bool {
    drifted_kinds(left, right).is_empty()
}

/// Lists the target kinds that differ between two snapshots, in sorted order.
///
/// A kind present on only one side counts as drifted.
#[must_use]
pub fn drifted_kinds(
    left: &BTreeMap<String, TargetSchema>,
    right: &BTreeMap<String, TargetSchema>,
) -> Vec<String> {
    let kinds: BTreeSet<&String> = left.keys().chain(right.keys()).collect();
    kinds
        .into_iter()
        .filter(|kind| match (left.get(*kind), right.get(*kind)) {
            (Some(expected), Some(actual)) => !validate_target_schema(expected, actual),
            _ => true,
        })
        .cloned()
        .collect()
}
