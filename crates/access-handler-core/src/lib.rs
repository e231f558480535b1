// crates/access-handler-core/src/lib.rs
// ============================================================================
// Module: Access Handler Core Library
// Description: Public API surface for the access handler core.
// Purpose: Expose core types, the payload protocol, and runtime interfaces.
// Dependencies: crate::{core, context, interfaces, protocol, store}
// ============================================================================

//! ## Overview
//! Access handler core defines the uniform contract a governance control plane
//! uses to reach independently deployed access provider handlers: the request
//! envelope, the describe/schema/resource response types, the
//! [`ProviderRuntime`] capability set, and the deployment store interface. It is
//! backend-agnostic; concrete runtimes live in `access-handler-runtime`.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod context;
pub mod core;
pub mod interfaces;
pub mod protocol;
pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use context::InvocationContext;
pub use crate::core::*;
pub use interfaces::DeploymentStore;
pub use interfaces::FailureKind;
pub use interfaces::FunctionInvoker;
pub use interfaces::ProviderRuntime;
pub use interfaces::RuntimeError;
pub use interfaces::RuntimeFactory;
pub use interfaces::StoreError;
pub use interfaces::TargetArgs;
pub use protocol::MAX_RESPONSE_BYTES;
pub use protocol::Payload;
pub use protocol::decode_response;
pub use store::InMemoryDeploymentStore;
