// crates/access-handler-core/src/core/mod.rs
// ============================================================================
// Module: Access Handler Core Types
// Description: Canonical deployment, describe, schema, and resource structures.
// Purpose: Provide stable, serializable types shared by runtimes and the engine.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Core types define the deployment record, the provider describe response,
//! provider schemas with their comparison helpers, and resource discovery
//! responses. Wire names follow the handler protocol (camelCase).

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod deployment;
pub mod describe;
pub mod identifiers;
pub mod policy;
pub mod resources;
pub mod schema;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use deployment::Deployment;
pub use deployment::Diagnostic;
pub use deployment::DiagnosticLevel;
pub use describe::ConfigValidationEntry;
pub use describe::ProviderDescribe;
pub use describe::ProviderInfo;
pub use identifiers::DeploymentLocator;
pub use identifiers::FUNCTION_LOCATOR_PREFIX;
pub use policy::DEFAULT_LOCAL_COMMAND;
pub use policy::FailurePolicy;
pub use policy::RuntimeMode;
pub use resources::LoadResourceResponse;
pub use resources::PendingTask;
pub use resources::Resource;
pub use resources::ResourceData;
pub use schema::ConfigField;
pub use schema::ProviderSchema;
pub use schema::SchemaResponse;
pub use schema::TargetArgument;
pub use schema::TargetSchema;
pub use schema::drifted_kinds;
pub use schema::validate_target_kinds;
pub use schema::validate_target_schema;
