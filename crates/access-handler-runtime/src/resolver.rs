// crates/access-handler-runtime/src/resolver.rs
// ============================================================================
// Module: Runtime Resolver
// Description: Maps deployments to the runtime variant that serves them.
// Purpose: Select remote or local runtimes from an explicit mode value.
// Dependencies: access-handler-config, access-handler-core, aws-config, tokio
// ============================================================================

//! ## Overview
//! [`RuntimeResolver`] implements [`RuntimeFactory`] for the health-check
//! engine. The mode is fixed at construction; nothing is read from process
//! state at resolution time.
//!
//! In remote mode the resolver uses an injected [`FunctionInvoker`] when one is
//! set, otherwise it builds a [`LambdaInvoker`] from the shared SDK
//! configuration. That configuration is either supplied by the caller or loaded
//! once from the ambient environment on first use. One Lambda invoker is kept
//! per region and reused across calls and runs. In local mode the cloud
//! locator prefix is stripped to recover the provider's directory.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;

use access_handler_config::AwsRuntimeConfig;
use access_handler_config::RuntimeConfig;
use access_handler_core::DEFAULT_LOCAL_COMMAND;
use access_handler_core::Deployment;
use access_handler_core::FUNCTION_LOCATOR_PREFIX;
use access_handler_core::FunctionInvoker;
use access_handler_core::ProviderRuntime;
use access_handler_core::RuntimeError;
use access_handler_core::RuntimeFactory;
use access_handler_core::RuntimeMode;
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_config::Region;
use aws_config::SdkConfig;
use tokio::sync::OnceCell;

use crate::local::LocalRuntime;
use crate::remote::LambdaInvoker;
use crate::remote::RemoteRuntime;

// ============================================================================
// SECTION: Locator Mapping
// ============================================================================

/// Recovers a local provider path from a deployment locator.
///
/// A leading cloud function prefix and one following `:` are stripped; any
/// other locator is already a path.
#[must_use]
pub fn local_path_from_locator(locator: &str) -> PathBuf {
    let stripped = locator.strip_prefix(FUNCTION_LOCATOR_PREFIX).map_or(locator, |rest| {
        rest.strip_prefix(':').unwrap_or(rest)
    });
    PathBuf::from(stripped)
}

// ============================================================================
// SECTION: Resolver
// ============================================================================

/// Selects the [`ProviderRuntime`] variant for each deployment.
pub struct RuntimeResolver {
    /// Runtime variant served by this resolver.
    mode: RuntimeMode,
    /// Overrides applied when loading the ambient SDK configuration.
    aws: AwsRuntimeConfig,
    /// Harness command line for local runtimes.
    local_command: Vec<String>,
    /// Invoker override for remote runtimes.
    invoker: Option<Arc<dyn FunctionInvoker>>,
    /// Shared SDK configuration, supplied or loaded on first use.
    sdk_config: OnceCell<SdkConfig>,
    /// Lambda invokers keyed by deployment region.
    lambda_invokers: Mutex<BTreeMap<String, Arc<LambdaInvoker>>>,
}

impl RuntimeResolver {
    /// Creates a resolver for `mode` with default settings.
    #[must_use]
    pub fn new(mode: RuntimeMode) -> Self {
        Self {
            mode,
            aws: AwsRuntimeConfig::default(),
            local_command: DEFAULT_LOCAL_COMMAND.iter().map(|arg| (*arg).to_string()).collect(),
            invoker: None,
            sdk_config: OnceCell::new(),
            lambda_invokers: Mutex::new(BTreeMap::new()),
        }
    }

    /// Creates a resolver from the runtime configuration section.
    #[must_use]
    pub fn from_config(config: &RuntimeConfig) -> Self {
        let mut resolver =
            Self::new(config.mode).with_local_command(config.local.command.clone());
        resolver.aws = config.aws.clone();
        resolver
    }

    /// Uses `config` instead of loading the ambient SDK configuration.
    #[must_use]
    pub fn with_sdk_config(mut self, config: SdkConfig) -> Self {
        self.sdk_config = OnceCell::new_with(Some(config));
        self
    }

    /// Routes every remote call through `invoker`.
    #[must_use]
    pub fn with_invoker(mut self, invoker: Arc<dyn FunctionInvoker>) -> Self {
        self.invoker = Some(invoker);
        self
    }

    /// Replaces the local harness command line.
    #[must_use]
    pub fn with_local_command(mut self, command: Vec<String>) -> Self {
        self.local_command = command;
        self
    }

    /// Returns the configured mode.
    #[must_use]
    pub const fn mode(&self) -> RuntimeMode {
        self.mode
    }

    /// Returns the invoker serving `deployment` in remote mode.
    ///
    /// Without an injected invoker, deployments in the same region share one
    /// [`LambdaInvoker`].
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::Transport`] when the invoker cache is poisoned.
    pub async fn invoker_for(
        &self,
        deployment: &Deployment,
    ) -> Result<Arc<dyn FunctionInvoker>, RuntimeError> {
        if let Some(invoker) = &self.invoker {
            return Ok(Arc::clone(invoker));
        }
        let config = self.sdk_config.get_or_init(|| load_sdk_config(&self.aws)).await;
        let mut invokers = self
            .lambda_invokers
            .lock()
            .map_err(|_| RuntimeError::Transport("lambda invoker cache poisoned".to_string()))?;
        let invoker: Arc<dyn FunctionInvoker> =
            invokers.entry(deployment.region.clone()).or_insert_with(|| {
                Arc::new(LambdaInvoker::from_sdk_config(config, Some(deployment.region.as_str())))
            }).clone();
        Ok(invoker)
    }
}

impl std::fmt::Debug for RuntimeResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuntimeResolver")
            .field("mode", &self.mode)
            .field("aws", &self.aws)
            .field("local_command", &self.local_command)
            .field("invoker_override", &self.invoker.is_some())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl RuntimeFactory for RuntimeResolver {
    async fn runtime_for(
        &self,
        deployment: &Deployment,
    ) -> Result<Box<dyn ProviderRuntime>, RuntimeError> {
        match self.mode {
            RuntimeMode::Remote => {
                let invoker = self.invoker_for(deployment).await?;
                Ok(Box::new(RemoteRuntime::new(deployment.locator.clone(), invoker)))
            }
            RuntimeMode::Local => {
                let path = local_path_from_locator(deployment.locator.as_str());
                if path.as_os_str().is_empty() {
                    return Err(RuntimeError::Transport(format!(
                        "deployment {} has no local provider path",
                        deployment.locator
                    )));
                }
                Ok(Box::new(LocalRuntime::new(path).with_command(self.local_command.clone())))
            }
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Loads the ambient SDK configuration with configured overrides.
async fn load_sdk_config(aws: &AwsRuntimeConfig) -> SdkConfig {
    let mut loader = aws_config::defaults(BehaviorVersion::latest());
    if let Some(region) = &aws.region {
        loader = loader.region(Region::new(region.clone()));
    }
    if let Some(profile) = &aws.profile {
        loader = loader.profile_name(profile);
    }
    loader.load().await
}
