// crates/access-handler-runtime/src/lib.rs
// ============================================================================
// Module: Access Handler Runtime Library
// Description: Concrete provider runtimes and the runtime resolver.
// Purpose: Reach deployed or local handlers through one capability set.
// Dependencies: access-handler-core, aws-config, aws-sdk-lambda, tokio
// ============================================================================

//! ## Overview
//! Two [`ProviderRuntime`](access_handler_core::ProviderRuntime) variants live
//! here. [`RemoteRuntime`] invokes a deployed cloud function through a
//! [`FunctionInvoker`](access_handler_core::FunctionInvoker);
//! [`LocalRuntime`] runs a development harness as a subprocess. The
//! [`RuntimeResolver`] picks between them from an explicit [`RuntimeMode`].
//!
//! [`RuntimeMode`]: access_handler_core::RuntimeMode

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod local;
pub mod remote;
pub mod resolver;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use local::LocalRuntime;
pub use remote::LambdaInvoker;
pub use remote::RemoteRuntime;
pub use resolver::RuntimeResolver;
pub use resolver::local_path_from_locator;
