// crates/access-handler-core/src/core/describe.rs
// ============================================================================
// Module: Provider Describe
// Description: Identity and self-reported config validation of a provider.
// Purpose: Model the describe response returned by a handler.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! The describe response is produced by the provider itself. It reports who
//! the provider is, whether each of its configuration values is usable, and
//! optionally the schema it currently serves.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;

use crate::core::deployment::Diagnostic;
use crate::core::schema::ProviderSchema;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Provider identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderInfo {
    /// Publisher of the provider.
    pub publisher: String,
    /// Provider name.
    pub name: String,
    /// Provider version.
    pub version: String,
}

/// Validation outcome for one configuration field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigValidationEntry {
    /// Whether the configuration value is usable.
    pub success: bool,
    /// Diagnostic lines emitted while validating the value.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub logs: Vec<Diagnostic>,
}

/// Describe response returned by a handler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderDescribe {
    /// Provider identity.
    pub provider: ProviderInfo,
    /// Validation entries keyed by configuration field name.
    #[serde(default)]
    pub config_validation: BTreeMap<String, ConfigValidationEntry>,
    /// Schema currently served by the provider, when reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<ProviderSchema>,
}

impl ProviderDescribe {
    /// Returns true when every config-validation entry succeeded.
    #[must_use]
    pub fn all_config_valid(&self) -> bool {
        self.config_validation.values().all(|entry| entry.success)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Decodes an absent or `null` log list as empty.
fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<Diagnostic>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Diagnostic>>::deserialize(deserializer)?.unwrap_or_default())
}
