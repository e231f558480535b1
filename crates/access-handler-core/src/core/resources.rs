// crates/access-handler-core/src/core/resources.rs
// ============================================================================
// Module: Provider Resources
// Description: Resource discovery responses returned by providers.
// Purpose: Model the result of a resource-loading task.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Resource loading is task based: a provider answers a task with the
//! resources it found and may hand back follow-up tasks to run next.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Identity of a discovered resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceData {
    /// Resource identifier in the target system.
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
}

/// A discovered resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    /// Resource kind.
    #[serde(rename = "type")]
    pub kind: String,
    /// Resource identity.
    pub data: ResourceData,
}

/// Follow-up task handed back by a provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingTask {
    /// Task name.
    pub task: String,
    /// Opaque task context passed back on the next call.
    #[serde(default)]
    pub ctx: Value,
}

/// Response to a resource-loading task.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadResourceResponse {
    /// Resources discovered by the task.
    #[serde(default)]
    pub resources: Vec<Resource>,
    /// Follow-up tasks to run.
    #[serde(default)]
    pub pending_tasks: Vec<PendingTask>,
}
