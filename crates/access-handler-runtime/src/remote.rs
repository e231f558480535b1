// crates/access-handler-runtime/src/remote.rs
// ============================================================================
// Module: Remote Runtime
// Description: Provider runtime backed by a deployed cloud function.
// Purpose: Send payload envelopes to a function and decode its responses.
// Dependencies: access-handler-core, aws-config, aws-sdk-lambda, serde_json
// ============================================================================

//! ## Overview
//! [`RemoteRuntime`] binds a deployment locator to a [`FunctionInvoker`] and
//! performs synchronous request/response calls. [`LambdaInvoker`] is the
//! production invoker. Infrastructure failures surface as
//! [`RuntimeError::Transport`]; a function that ran and raised surfaces as
//! [`RuntimeError::Handler`].
//!
//! No deadline is enforced here beyond the caller's [`InvocationContext`]; the
//! platform's per-invocation ceiling bounds every call.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use access_handler_core::DeploymentLocator;
use access_handler_core::FunctionInvoker;
use access_handler_core::InvocationContext;
use access_handler_core::LoadResourceResponse;
use access_handler_core::Payload;
use access_handler_core::ProviderDescribe;
use access_handler_core::ProviderRuntime;
use access_handler_core::RuntimeError;
use access_handler_core::SchemaResponse;
use access_handler_core::TargetArgs;
use access_handler_core::decode_response;
use async_trait::async_trait;
use aws_config::Region;
use aws_config::SdkConfig;
use aws_sdk_lambda::Client;
use aws_sdk_lambda::error::DisplayErrorContext;
use aws_sdk_lambda::primitives::Blob;
use aws_sdk_lambda::types::InvocationType;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

// ============================================================================
// SECTION: Lambda Invoker
// ============================================================================

/// [`FunctionInvoker`] backed by the Lambda `Invoke` API.
#[derive(Debug, Clone)]
pub struct LambdaInvoker {
    /// Lambda API client.
    client: Client,
}

impl LambdaInvoker {
    /// Wraps an existing Lambda client.
    #[must_use]
    pub const fn new(client: Client) -> Self {
        Self {
            client,
        }
    }

    /// Builds an invoker from shared SDK configuration.
    ///
    /// A non-empty `region` overrides the region carried by `config`.
    #[must_use]
    pub fn from_sdk_config(config: &SdkConfig, region: Option<&str>) -> Self {
        let mut builder = aws_sdk_lambda::config::Builder::from(config);
        if let Some(region) = region.filter(|region| !region.is_empty()) {
            builder = builder.region(Region::new(region.to_string()));
        }
        Self::new(Client::from_conf(builder.build()))
    }
}

#[async_trait]
impl FunctionInvoker for LambdaInvoker {
    async fn invoke(&self, locator: &str, payload: Vec<u8>) -> Result<Vec<u8>, RuntimeError> {
        let output = self
            .client
            .invoke()
            .function_name(locator)
            .invocation_type(InvocationType::RequestResponse)
            .payload(Blob::new(payload))
            .send()
            .await
            .map_err(|err| RuntimeError::Transport(DisplayErrorContext(&err).to_string()))?;
        let body = output.payload().map(|blob| blob.as_ref().to_vec()).unwrap_or_default();
        if let Some(kind) = output.function_error() {
            return Err(RuntimeError::Handler(function_error_message(kind, &body)));
        }
        Ok(body)
    }
}

/// Error body a function returns when it raises.
#[derive(Deserialize)]
struct FunctionErrorBody {
    /// Message raised by the handler.
    #[serde(rename = "errorMessage")]
    error_message: Option<String>,
}

/// Extracts the handler's error message, falling back to the error kind.
fn function_error_message(kind: &str, body: &[u8]) -> String {
    serde_json::from_slice::<FunctionErrorBody>(body)
        .ok()
        .and_then(|body| body.error_message)
        .filter(|message| !message.is_empty())
        .unwrap_or_else(|| format!("function error: {kind}"))
}

// ============================================================================
// SECTION: Remote Runtime
// ============================================================================

/// Runtime that invokes a deployed cloud function.
#[derive(Clone)]
pub struct RemoteRuntime {
    /// Function the runtime is bound to.
    locator: DeploymentLocator,
    /// Invoker used for every call.
    invoker: Arc<dyn FunctionInvoker>,
}

impl RemoteRuntime {
    /// Binds a runtime to `locator`.
    #[must_use]
    pub fn new(locator: DeploymentLocator, invoker: Arc<dyn FunctionInvoker>) -> Self {
        Self {
            locator,
            invoker,
        }
    }

    /// Returns the bound locator.
    #[must_use]
    pub const fn locator(&self) -> &DeploymentLocator {
        &self.locator
    }

    /// Requests the provider's config and target schema.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError`] when the call fails or the response is malformed.
    pub async fn schema(&self, ctx: &InvocationContext) -> Result<SchemaResponse, RuntimeError> {
        self.call(ctx, &Payload::Schema).await
    }

    /// Sends an envelope and returns the raw response bytes.
    async fn exchange(
        &self,
        ctx: &InvocationContext,
        payload: &Payload,
    ) -> Result<Vec<u8>, RuntimeError> {
        let bytes = payload.encode()?;
        ctx.run(self.invoker.invoke(self.locator.as_str(), bytes)).await
    }

    /// Sends an envelope and decodes the response.
    async fn call<T: DeserializeOwned>(
        &self,
        ctx: &InvocationContext,
        payload: &Payload,
    ) -> Result<T, RuntimeError> {
        let bytes = self.exchange(ctx, payload).await?;
        decode_response(&bytes)
    }
}

impl std::fmt::Debug for RemoteRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteRuntime").field("locator", &self.locator).finish_non_exhaustive()
    }
}

#[async_trait]
impl ProviderRuntime for RemoteRuntime {
    async fn describe(&self, ctx: &InvocationContext) -> Result<ProviderDescribe, RuntimeError> {
        self.call(ctx, &Payload::Describe).await
    }

    async fn grant(
        &self,
        ctx: &InvocationContext,
        subject: &str,
        target: &TargetArgs,
    ) -> Result<(), RuntimeError> {
        self.exchange(ctx, &Payload::grant(subject, target.clone())).await.map(|_| ())
    }

    async fn revoke(
        &self,
        ctx: &InvocationContext,
        subject: &str,
        target: &TargetArgs,
    ) -> Result<(), RuntimeError> {
        self.exchange(ctx, &Payload::revoke(subject, target.clone())).await.map(|_| ())
    }

    async fn fetch_resources(
        &self,
        ctx: &InvocationContext,
        kind: &str,
        context: &Value,
    ) -> Result<LoadResourceResponse, RuntimeError> {
        self.call(ctx, &Payload::load_resources(kind, context.clone())).await
    }
}
