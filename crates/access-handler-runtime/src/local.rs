// crates/access-handler-runtime/src/local.rs
// ============================================================================
// Module: Local Runtime
// Description: Provider runtime backed by a local development harness.
// Purpose: Exercise a provider under development without a deployed function.
// Dependencies: access-handler-core, tokio
// ============================================================================

//! ## Overview
//! [`LocalRuntime`] spawns the harness command once per call inside the
//! provider's working directory, writes the payload envelope to the child's
//! stdin and reads the JSON response from its stdout. All four operations are
//! supported, matching [`RemoteRuntime`](crate::RemoteRuntime).
//!
//! Invariants:
//! - A non-zero exit is a handler failure carrying the trimmed stderr.
//! - A child whose call is cancelled or times out is killed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io;
use std::path::Path;
use std::path::PathBuf;
use std::process::Output;
use std::process::Stdio;

use access_handler_core::DEFAULT_LOCAL_COMMAND;
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
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

// ============================================================================
// SECTION: Local Runtime
// ============================================================================

/// Runtime that runs a local harness as a subprocess.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalRuntime {
    /// Provider directory the harness runs in.
    working_dir: PathBuf,
    /// Program and arguments of the harness.
    command: Vec<String>,
}

impl LocalRuntime {
    /// Creates a runtime for the provider at `working_dir` using the default
    /// harness command.
    #[must_use]
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
            command: DEFAULT_LOCAL_COMMAND.iter().map(|arg| (*arg).to_string()).collect(),
        }
    }

    /// Replaces the harness command line.
    #[must_use]
    pub fn with_command(mut self, command: Vec<String>) -> Self {
        self.command = command;
        self
    }

    /// Returns the provider working directory.
    #[must_use]
    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    /// Returns the harness command line.
    #[must_use]
    pub fn command(&self) -> &[String] {
        &self.command
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
        ctx.run(self.spawn_and_wait(bytes)).await
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

    /// Runs the harness once, feeding `payload` on stdin.
    ///
    /// Dropping the returned future kills the child.
    async fn spawn_and_wait(&self, payload: Vec<u8>) -> Result<Vec<u8>, RuntimeError> {
        let (program, args) = self
            .command
            .split_first()
            .ok_or_else(|| RuntimeError::Transport("local command is empty".to_string()))?;
        let mut cmd = Command::new(self.resolve_program(program));
        cmd.args(args)
            .current_dir(&self.working_dir)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        let mut child = cmd.spawn().map_err(|err| {
            RuntimeError::Transport(format!("failed to spawn local handler {program}: {err}"))
        })?;
        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| RuntimeError::Transport("local handler stdin unavailable".to_string()))?;
        let write = async move {
            stdin.write_all(&payload).await?;
            stdin.shutdown().await
        };
        let (written, output) = tokio::join!(write, child.wait_with_output());
        let output = output.map_err(|err| {
            RuntimeError::Transport(format!("failed to wait for local handler: {err}"))
        })?;
        if !output.status.success() {
            return Err(RuntimeError::Handler(exit_failure_message(&output)));
        }
        // A harness may answer without draining stdin.
        if let Err(err) = written
            && err.kind() != io::ErrorKind::BrokenPipe
        {
            return Err(RuntimeError::Transport(format!(
                "failed to write local handler request: {err}"
            )));
        }
        Ok(output.stdout)
    }

    /// Resolves relative program paths against the working directory.
    fn resolve_program(&self, program: &str) -> PathBuf {
        let path = Path::new(program);
        if path.is_relative() && path.components().count() > 1 {
            self.working_dir.join(path)
        } else {
            path.to_path_buf()
        }
    }
}

/// Builds the handler error message for a failed harness run.
fn exit_failure_message(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        format!("local handler exited with {}", output.status)
    } else {
        trimmed.to_string()
    }
}

#[async_trait]
impl ProviderRuntime for LocalRuntime {
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
