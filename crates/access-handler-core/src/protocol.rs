// crates/access-handler-core/src/protocol.rs
// ============================================================================
// Module: Handler Payload Protocol
// Description: Request envelope and response decoding for handler calls.
// Purpose: Define the canonical wire format shared by every runtime.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Every call to a handler sends one JSON envelope `{"type": ..., "data": ...}`.
//! Operations that carry no payload omit `data` entirely rather than sending
//! `null`. Encoding failures abort before any transport call is made.
//!
//! Wire examples:
//! - `{"type":"describe"}`
//! - `{"type":"grant","data":{"subject":"alice@example.com","args":{"group":"admins"}}}`

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::interfaces::RuntimeError;
use crate::interfaces::TargetArgs;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum size of a handler response (bytes), the synchronous invocation ceiling.
pub const MAX_RESPONSE_BYTES: usize = 6 * 1024 * 1024;

// ============================================================================
// SECTION: Envelope
// ============================================================================

/// Grant and revoke payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessRequest {
    /// Subject receiving or losing access.
    pub subject: String,
    /// Target arguments.
    pub args: TargetArgs,
}

/// Resource-loading payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadResourcesRequest {
    /// Task (resource kind) to run.
    pub task: String,
    /// Opaque task context.
    pub ctx: Value,
}

/// Request envelope sent to a handler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum Payload {
    /// Grant access.
    Grant(AccessRequest),
    /// Revoke access.
    Revoke(AccessRequest),
    /// Report identity and config validation.
    Describe,
    /// Report the provider schema.
    Schema,
    /// Run a resource-loading task.
    LoadResources(LoadResourcesRequest),
}

impl Payload {
    /// Builds a grant envelope.
    #[must_use]
    pub fn grant(subject: impl Into<String>, args: TargetArgs) -> Self {
        Self::Grant(AccessRequest {
            subject: subject.into(),
            args,
        })
    }

    /// Builds a revoke envelope.
    #[must_use]
    pub fn revoke(subject: impl Into<String>, args: TargetArgs) -> Self {
        Self::Revoke(AccessRequest {
            subject: subject.into(),
            args,
        })
    }

    /// Builds a resource-loading envelope.
    #[must_use]
    pub fn load_resources(task: impl Into<String>, ctx: Value) -> Self {
        Self::LoadResources(LoadResourcesRequest {
            task: task.into(),
            ctx,
        })
    }

    /// Returns the wire name of the operation.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Grant(_) => "grant",
            Self::Revoke(_) => "revoke",
            Self::Describe => "describe",
            Self::Schema => "schema",
            Self::LoadResources(_) => "loadResources",
        }
    }

    /// Serializes the envelope to UTF-8 JSON.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::Encoding`] when the payload cannot be serialized.
    pub fn encode(&self) -> Result<Vec<u8>, RuntimeError> {
        serde_json::to_vec(self).map_err(|err| RuntimeError::Encoding(err.to_string()))
    }
}

// ============================================================================
// SECTION: Response Decoding
// ============================================================================

/// Decodes a handler response into the operation's result type.
///
/// # Errors
///
/// Returns [`RuntimeError::Deserialization`] when the response is oversized or
/// does not match the expected shape.
pub fn decode_response<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, RuntimeError> {
    if bytes.len() > MAX_RESPONSE_BYTES {
        return Err(RuntimeError::Deserialization(format!(
            "response of {} bytes exceeds limit of {MAX_RESPONSE_BYTES}",
            bytes.len()
        )));
    }
    serde_json::from_slice(bytes).map_err(|err| RuntimeError::Deserialization(err.to_string()))
}
