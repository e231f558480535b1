// crates/access-handler-config/src/config.rs
// ============================================================================
// Module: Access Handler Configuration
// Description: Configuration loading and validation for the access handler.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: access-handler-core, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! The path comes from the caller, then the `ACCESS_HANDLER_CONFIG` environment
//! variable, then `access-handler.toml` in the working directory. Every section
//! is optional and falls back to its defaults, but any value that is present
//! must validate.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use access_handler_core::DEFAULT_LOCAL_COMMAND;
use access_handler_core::FailurePolicy;
use access_handler_core::RuntimeMode;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Limits and Defaults
// ============================================================================

/// Default config file name.
pub const DEFAULT_CONFIG_NAME: &str = "access-handler.toml";
/// Environment variable naming the config file.
pub const CONFIG_ENV_VAR: &str = "ACCESS_HANDLER_CONFIG";
/// Maximum size of a config file in bytes.
pub const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum length of a full path.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Default number of concurrent describe calls during a health check.
pub const DEFAULT_HEALTH_CONCURRENCY: usize = 8;
/// Upper bound on concurrent describe calls.
pub const MAX_HEALTH_CONCURRENCY: usize = 64;
/// Upper bound on the per-deployment describe timeout (15 minutes).
pub const MAX_DESCRIBE_TIMEOUT_MS: u64 = 900_000;
/// Maximum number of local command arguments, program included.
pub(crate) const MAX_LOCAL_COMMAND_ARGS: usize = 64;
/// Maximum length of a cloud region name.
pub(crate) const MAX_REGION_LENGTH: usize = 64;
/// Maximum length of a named credentials profile.
pub(crate) const MAX_PROFILE_LENGTH: usize = 128;

// ============================================================================
// SECTION: Config Model
// ============================================================================

/// Top-level access handler configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessHandlerConfig {
    /// Runtime selection and backend settings.
    #[serde(default)]
    pub runtime: RuntimeConfig,
    /// Health-check engine settings.
    #[serde(default)]
    pub health: HealthConfig,
    /// Audit sink settings.
    #[serde(default)]
    pub audit: AuditConfig,
}

impl AccessHandlerConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        Self::from_toml_str(content)
    }

    /// Parses and validates configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        if content.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.runtime.validate()?;
        self.health.validate()?;
        self.audit.validate()?;
        Ok(())
    }
}

/// Runtime selection and backend settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Which runtime variant serves deployments.
    #[serde(default)]
    pub mode: RuntimeMode,
    /// Cloud SDK overrides for the remote runtime.
    #[serde(default)]
    pub aws: AwsRuntimeConfig,
    /// Local harness settings.
    #[serde(default)]
    pub local: LocalRuntimeConfig,
}

impl RuntimeConfig {
    /// Validates runtime settings.
    fn validate(&self) -> Result<(), ConfigError> {
        self.aws.validate()?;
        self.local.validate()
    }
}

/// Cloud SDK overrides applied when loading the shared SDK configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AwsRuntimeConfig {
    /// Region applied when loading the shared SDK configuration.
    #[serde(default)]
    pub region: Option<String>,
    /// Named credentials profile.
    #[serde(default)]
    pub profile: Option<String>,
}

impl AwsRuntimeConfig {
    /// Validates region and profile names.
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(region) = &self.region {
            if region.is_empty() || region.len() > MAX_REGION_LENGTH {
                return Err(ConfigError::Invalid(
                    "runtime.aws.region must be 1..=64 characters".to_string(),
                ));
            }
            if !region.chars().all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-')
            {
                return Err(ConfigError::Invalid(
                    "runtime.aws.region must contain only lowercase letters, digits, and dashes"
                        .to_string(),
                ));
            }
        }
        if let Some(profile) = &self.profile
            && (profile.trim().is_empty() || profile.len() > MAX_PROFILE_LENGTH)
        {
            return Err(ConfigError::Invalid(
                "runtime.aws.profile must be 1..=128 characters".to_string(),
            ));
        }
        Ok(())
    }
}

/// Local development harness settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalRuntimeConfig {
    /// Program and arguments used to start the harness.
    #[serde(default = "default_local_command")]
    pub command: Vec<String>,
}

impl Default for LocalRuntimeConfig {
    fn default() -> Self {
        Self {
            command: default_local_command(),
        }
    }
}

impl LocalRuntimeConfig {
    /// Validates the harness command line.
    fn validate(&self) -> Result<(), ConfigError> {
        let Some(program) = self.command.first() else {
            return Err(ConfigError::Invalid("runtime.local.command must be non-empty".to_string()));
        };
        if self.command.len() > MAX_LOCAL_COMMAND_ARGS {
            return Err(ConfigError::Invalid(
                "runtime.local.command exceeds max argument count".to_string(),
            ));
        }
        validate_path_string("runtime.local.command[0]", program)
    }
}

/// Health-check engine settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthConfig {
    /// Maximum number of describe calls in flight.
    #[serde(default = "default_health_concurrency")]
    pub concurrency: usize,
    /// Batch reaction to a failed deployment.
    #[serde(default)]
    pub failure_policy: FailurePolicy,
    /// Optional per-deployment describe timeout in milliseconds.
    #[serde(default)]
    pub describe_timeout_ms: Option<u64>,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_HEALTH_CONCURRENCY,
            failure_policy: FailurePolicy::default(),
            describe_timeout_ms: None,
        }
    }
}

impl HealthConfig {
    /// Returns the describe timeout as a duration.
    #[must_use]
    pub fn describe_timeout(&self) -> Option<Duration> {
        self.describe_timeout_ms.map(Duration::from_millis)
    }

    /// Validates concurrency and timeout bounds.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.concurrency == 0 || self.concurrency > MAX_HEALTH_CONCURRENCY {
            return Err(ConfigError::Invalid("health.concurrency must be 1..=64".to_string()));
        }
        if let Some(timeout_ms) = self.describe_timeout_ms
            && (timeout_ms == 0 || timeout_ms > MAX_DESCRIBE_TIMEOUT_MS)
        {
            return Err(ConfigError::Invalid(
                "health.describe_timeout_ms must be 1..=900000".to_string(),
            ));
        }
        Ok(())
    }
}

/// Audit sink selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditSinkKind {
    /// JSON lines on stderr.
    #[default]
    Stderr,
    /// JSON lines appended to a file.
    File,
    /// Discard audit events.
    #[serde(rename = "none")]
    Disabled,
}

/// Audit sink settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Which sink receives audit events.
    #[serde(default)]
    pub sink: AuditSinkKind,
    /// Log file path for the file sink.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl AuditConfig {
    /// Validates the sink selection.
    fn validate(&self) -> Result<(), ConfigError> {
        match (self.sink, &self.path) {
            (AuditSinkKind::File, None) => {
                Err(ConfigError::Invalid("audit.path is required for the file sink".to_string()))
            }
            (AuditSinkKind::File, Some(path)) => {
                validate_path_string("audit.path", &path.to_string_lossy())
            }
            (AuditSinkKind::Stderr | AuditSinkKind::Disabled, _) => Ok(()),
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from the caller or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates the resolved config file path before it is opened.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    check_path_limits("config path", path)
}

/// Validates an operator-supplied path field (audit log, harness program).
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    check_path_limits(field, Path::new(trimmed))
}

/// Bounds a path handed to the filesystem or to process spawning.
///
/// Limits follow common filesystem maxima: 4096 bytes in total and 255 bytes
/// per component.
fn check_path_limits(label: &str, path: &Path) -> Result<(), ConfigError> {
    if path.as_os_str().len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{label} exceeds max length")));
    }
    let oversized = |component: std::path::Component<'_>| {
        component.as_os_str().len() > MAX_PATH_COMPONENT_LENGTH
    };
    if path.components().any(oversized) {
        return Err(ConfigError::Invalid(format!("{label} component too long")));
    }
    Ok(())
}

/// Default local harness command line.
fn default_local_command() -> Vec<String> {
    DEFAULT_LOCAL_COMMAND.iter().map(|arg| (*arg).to_string()).collect()
}

/// Default health-check concurrency.
const fn default_health_concurrency() -> usize {
    DEFAULT_HEALTH_CONCURRENCY
}
