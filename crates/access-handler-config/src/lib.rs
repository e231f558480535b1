// crates/access-handler-config/src/lib.rs
// ============================================================================
// Module: Access Handler Config Library
// Description: Configuration model and validation for access-handler.toml.
// Purpose: Single source of truth for runtime, health, and audit settings.
// Dependencies: access-handler-core, serde, toml
// ============================================================================

//! ## Overview
//! `access-handler-config` loads and validates the TOML configuration that
//! selects the runtime mode, bounds the health-check engine, and picks the
//! audit sink. Invalid input fails closed.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
