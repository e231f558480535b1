// crates/access-handler-core/src/core/identifiers.rs
// ============================================================================
// Module: Access Handler Identifiers
// Description: Canonical opaque identifiers for registered deployments.
// Purpose: Provide strongly typed, serializable locators with stable string forms.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A deployment is identified by its locator: a cloud function ARN for remote
//! handlers, or a filesystem path (optionally carrying the function ARN prefix)
//! for local development handlers. Locators are opaque and serialize as strings.
//! Interpretation happens at the runtime resolution boundary.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Prefix shared by every cloud function locator.
pub const FUNCTION_LOCATOR_PREFIX: &str = "arn:aws:lambda";

// ============================================================================
// SECTION: Identifier Types
// ============================================================================

/// Locator of a deployed access provider handler.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeploymentLocator(String);

impl DeploymentLocator {
    /// Creates a new deployment locator.
    #[must_use]
    pub fn new(locator: impl Into<String>) -> Self {
        Self(locator.into())
    }

    /// Builds the cloud function locator for a handler deployed in an account and region.
    #[must_use]
    pub fn for_function(function_name: &str, account: &str, region: &str) -> Self {
        Self(format!("{FUNCTION_LOCATOR_PREFIX}:{region}:{account}:function:{function_name}"))
    }

    /// Returns the locator as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true when the locator carries the cloud function prefix.
    #[must_use]
    pub fn is_function_locator(&self) -> bool {
        self.0.starts_with(FUNCTION_LOCATOR_PREFIX)
    }
}

impl fmt::Display for DeploymentLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for DeploymentLocator {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for DeploymentLocator {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::DeploymentLocator;

    #[test]
    fn function_locator_is_formatted_as_arn() {
        let locator = DeploymentLocator::for_function("okta-handler", "123456789012", "us-east-1");
        assert_eq!(
            locator.as_str(),
            "arn:aws:lambda:us-east-1:123456789012:function:okta-handler"
        );
        assert!(locator.is_function_locator());
        assert!(!DeploymentLocator::new("/tmp/provider").is_function_locator());
    }
}
