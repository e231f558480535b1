// crates/access-handler-core/src/store.rs
// ============================================================================
// Module: In-Memory Deployment Store
// Description: Simple in-memory deployment store for tests and local demos.
// Purpose: Provide a deterministic store implementation without external deps.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! This module provides a simple in-memory implementation of
//! [`DeploymentStore`]. Deployments are keyed by locator and listed in locator
//! order. It is not intended for production use.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::core::Deployment;
use crate::core::DeploymentLocator;
use crate::interfaces::DeploymentStore;
use crate::interfaces::StoreError;

// ============================================================================
// SECTION: In-Memory Store
// ============================================================================

/// In-memory deployment store for tests and examples.
#[derive(Debug, Default, Clone)]
pub struct InMemoryDeploymentStore {
    /// Deployment map protected by a mutex.
    deployments: Arc<Mutex<BTreeMap<DeploymentLocator, Deployment>>>,
}

impl InMemoryDeploymentStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding the given deployments.
    #[must_use]
    pub fn with_deployments(deployments: impl IntoIterator<Item = Deployment>) -> Self {
        let map = deployments
            .into_iter()
            .map(|deployment| (deployment.locator.clone(), deployment))
            .collect();
        Self {
            deployments: Arc::new(Mutex::new(map)),
        }
    }

    /// Registers or replaces a deployment.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store lock is poisoned.
    pub fn register(&self, deployment: Deployment) -> Result<(), StoreError> {
        let mut guard = self.lock()?;
        guard.insert(deployment.locator.clone(), deployment);
        Ok(())
    }

    /// Loads a deployment by locator.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store lock is poisoned.
    pub fn get(&self, locator: &DeploymentLocator) -> Result<Option<Deployment>, StoreError> {
        Ok(self.lock()?.get(locator).cloned())
    }

    /// Locks the deployment map.
    fn lock(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, BTreeMap<DeploymentLocator, Deployment>>, StoreError>
    {
        self.deployments
            .lock()
            .map_err(|_| StoreError::Store("deployment store mutex poisoned".to_string()))
    }
}

#[async_trait]
impl DeploymentStore for InMemoryDeploymentStore {
    async fn list_deployments(&self) -> Result<Vec<Deployment>, StoreError> {
        Ok(self.lock()?.values().cloned().collect())
    }

    async fn put_batch(&self, deployments: &[Deployment]) -> Result<(), StoreError> {
        let mut guard = self.lock()?;
        for deployment in deployments {
            guard.insert(deployment.locator.clone(), deployment.clone());
        }
        Ok(())
    }
}
