// ABOUTME: Configuration for the Codex CLI runner — binary, model, directories, sandbox, overrides
// ABOUTME: Supports builder methods, environment variables, and an optional TOML config file
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 dravr.ai

use std::convert::Infallible;
use std::env;
use std::fmt;
use std::num::ParseIntError;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::overrides::ConfigOverrides;
use crate::types::RunnerError;

/// Binary name used to locate the Codex CLI on disk
pub const DEFAULT_BINARY: &str = "codex";

/// Model selected when none is configured
pub const DEFAULT_MODEL: &str = "gpt-5.2-codex";

/// Environment variable that overrides the binary locator
pub const ENV_BINARY: &str = "CODEX_BINARY";
const ENV_MODEL: &str = "CODEX_MODEL";
const ENV_TIMEOUT_SECS: &str = "CODEX_TIMEOUT_SECS";
const ENV_SANDBOX: &str = "CODEX_SANDBOX";
const ENV_CD: &str = "CODEX_CD";
const ENV_ADD_DIRS: &str = "CODEX_ADD_DIRS";
const ENV_FULL_AUTO: &str = "CODEX_FULL_AUTO";
const ENV_SKIP_GIT_REPO_CHECK: &str = "CODEX_SKIP_GIT_REPO_CHECK";

/// Sandbox policy passed to `codex exec --sandbox`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SandboxMode {
    /// `read-only`
    ReadOnly,
    /// `workspace-write`
    WorkspaceWrite,
    /// `danger-full-access`
    DangerFullAccess,
    /// Any other identifier understood by the installed CLI
    Other(String),
}

impl SandboxMode {
    /// Identifier passed on the command line
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::ReadOnly => "read-only",
            Self::WorkspaceWrite => "workspace-write",
            Self::DangerFullAccess => "danger-full-access",
            Self::Other(name) => name,
        }
    }
}

impl fmt::Display for SandboxMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SandboxMode {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim() {
            "read-only" => Self::ReadOnly,
            "workspace-write" => Self::WorkspaceWrite,
            "danger-full-access" => Self::DangerFullAccess,
            other => Self::Other(other.to_owned()),
        })
    }
}

impl From<String> for SandboxMode {
    fn from(value: String) -> Self {
        match value.parse() {
            Ok(mode) => mode,
            Err(never) => match never {},
        }
    }
}

impl From<SandboxMode> for String {
    fn from(value: SandboxMode) -> Self {
        value.as_str().to_owned()
    }
}

/// Configuration for a Codex runner instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodexConfig {
    /// Binary name or path; resolved when the runner is constructed
    pub binary: String,
    /// Model passed via `-m`
    pub model: String,
    /// Working directory handed to the CLI via `--cd`
    pub working_directory: Option<PathBuf>,
    /// Extra writable directories, one `--add-dir` each
    pub add_dirs: Vec<PathBuf>,
    /// Pass `--skip-git-repo-check`
    pub skip_git_repo_check: bool,
    /// Sandbox policy for model-generated commands
    pub sandbox: Option<SandboxMode>,
    /// Pass `--full-auto`
    pub full_auto: bool,
    /// Pass `--dangerously-bypass-approvals-and-sandbox`
    pub dangerously_bypass_approvals_and_sandbox: bool,
    /// `-c` overrides layered over the CLI's own config file
    pub overrides: Option<ConfigOverrides>,
    /// Maximum time to wait for `codex exec`; `None` waits indefinitely
    pub timeout: Option<Duration>,
}

impl Default for CodexConfig {
    fn default() -> Self {
        Self {
            binary: DEFAULT_BINARY.to_owned(),
            model: DEFAULT_MODEL.to_owned(),
            working_directory: None,
            add_dirs: Vec::new(),
            skip_git_repo_check: true,
            sandbox: None,
            full_auto: false,
            dangerously_bypass_approvals_and_sandbox: false,
            overrides: None,
            timeout: None,
        }
    }
}

impl CodexConfig {
    /// Create a configuration with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the binary name or path
    #[must_use]
    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    /// Set the model to use
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the `--cd` directory
    #[must_use]
    pub fn with_working_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_directory = Some(dir.into());
        self
    }

    /// Append an `--add-dir` directory
    #[must_use]
    pub fn with_add_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.add_dirs.push(dir.into());
        self
    }

    /// Toggle `--skip-git-repo-check`
    #[must_use]
    pub const fn with_skip_git_repo_check(mut self, enabled: bool) -> Self {
        self.skip_git_repo_check = enabled;
        self
    }

    /// Set the sandbox mode
    #[must_use]
    pub fn with_sandbox(mut self, mode: SandboxMode) -> Self {
        self.sandbox = Some(mode);
        self
    }

    /// Toggle `--full-auto`
    #[must_use]
    pub const fn with_full_auto(mut self, enabled: bool) -> Self {
        self.full_auto = enabled;
        self
    }

    /// Toggle `--dangerously-bypass-approvals-and-sandbox`
    #[must_use]
    pub const fn with_bypass_approvals_and_sandbox(mut self, enabled: bool) -> Self {
        self.dangerously_bypass_approvals_and_sandbox = enabled;
        self
    }

    /// Set the config overrides
    #[must_use]
    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        self.overrides = Some(overrides);
        self
    }

    /// Set the command timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build a configuration from `CODEX_*` environment variables
    ///
    /// Unset variables keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns a config error when a timeout or boolean variable cannot be parsed.
    pub fn from_env() -> Result<Self, RunnerError> {
        let mut config = Self::default();
        if let Ok(binary) = env::var(ENV_BINARY) {
            config.binary = binary;
        }
        if let Ok(model) = env::var(ENV_MODEL) {
            config.model = model;
        }
        if let Ok(raw) = env::var(ENV_TIMEOUT_SECS) {
            let timeout = parse_timeout(&raw).map_err(|e| {
                RunnerError::config(format!("{ENV_TIMEOUT_SECS} is not a valid u64: {e}"))
            })?;
            config.timeout = Some(timeout);
        }
        if let Ok(raw) = env::var(ENV_SANDBOX) {
            config.sandbox = Some(SandboxMode::from(raw));
        }
        if let Ok(dir) = env::var(ENV_CD) {
            config.working_directory = Some(PathBuf::from(dir));
        }
        if let Ok(raw) = env::var(ENV_ADD_DIRS) {
            config.add_dirs = parse_list(&raw).into_iter().map(PathBuf::from).collect();
        }
        if let Ok(raw) = env::var(ENV_FULL_AUTO) {
            config.full_auto = parse_flag(ENV_FULL_AUTO, &raw)?;
        }
        if let Ok(raw) = env::var(ENV_SKIP_GIT_REPO_CHECK) {
            config.skip_git_repo_check = parse_flag(ENV_SKIP_GIT_REPO_CHECK, &raw)?;
        }
        Ok(config)
    }
}

/// Parse a comma-separated list, dropping empty entries
#[must_use]
pub fn parse_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

/// Parse a timeout value from a string (in seconds)
///
/// # Errors
///
/// Returns an error if the string cannot be parsed as a `u64`.
pub fn parse_timeout(input: &str) -> Result<Duration, ParseIntError> {
    input.trim().parse::<u64>().map(Duration::from_secs)
}

fn parse_flag(key: &str, input: &str) -> Result<bool, RunnerError> {
    match input.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(RunnerError::config(format!(
            "{key} must be a boolean, got '{other}'"
        ))),
    }
}

#[cfg(feature = "config-file")]
mod file {
    use std::path::{Path, PathBuf};
    use std::time::Duration;

    use serde::Deserialize;
    use serde_json::Value;
    use tracing::debug;

    use super::{CodexConfig, SandboxMode};
    use crate::overrides::ConfigOverrides;
    use crate::types::RunnerError;

    /// On-disk shape of `config.toml`; every key is optional
    #[derive(Debug, Default, Deserialize)]
    #[serde(default, deny_unknown_fields)]
    struct ConfigFile {
        binary: Option<String>,
        model: Option<String>,
        cd: Option<PathBuf>,
        add_dirs: Vec<PathBuf>,
        skip_git_repo_check: Option<bool>,
        sandbox: Option<SandboxMode>,
        full_auto: Option<bool>,
        dangerously_bypass_approvals_and_sandbox: Option<bool>,
        timeout_secs: Option<u64>,
        overrides: Option<Value>,
    }

    impl CodexConfig {
        /// Parse a configuration from TOML text
        ///
        /// ```toml
        /// model = "gpt-5.2-codex"
        /// sandbox = "workspace-write"
        /// timeout_secs = 300
        ///
        /// [overrides]
        /// model_reasoning_effort = "high"
        /// ```
        pub fn from_toml_str(text: &str) -> Result<Self, RunnerError> {
            let file: ConfigFile = toml::from_str(text)
                .map_err(|e| RunnerError::config(format!("Invalid config file: {e}")))?;

            let defaults = Self::default();
            let overrides = match file.overrides {
                Some(value) => ConfigOverrides::from_value(value)?,
                None => None,
            };
            Ok(Self {
                binary: file.binary.unwrap_or(defaults.binary),
                model: file.model.unwrap_or(defaults.model),
                working_directory: file.cd,
                add_dirs: file.add_dirs,
                skip_git_repo_check: file
                    .skip_git_repo_check
                    .unwrap_or(defaults.skip_git_repo_check),
                sandbox: file.sandbox,
                full_auto: file.full_auto.unwrap_or(defaults.full_auto),
                dangerously_bypass_approvals_and_sandbox: file
                    .dangerously_bypass_approvals_and_sandbox
                    .unwrap_or(defaults.dangerously_bypass_approvals_and_sandbox),
                overrides,
                timeout: file.timeout_secs.map(Duration::from_secs),
            })
        }

        /// Load a configuration from a TOML file
        pub fn load(path: &Path) -> Result<Self, RunnerError> {
            let text = std::fs::read_to_string(path).map_err(|e| {
                RunnerError::config(format!(
                    "Failed to read config file {}: {e}",
                    path.display()
                ))
            })?;
            debug!(path = %path.display(), "Loading codex gateway config");
            Self::from_toml_str(&text)
        }
    }

    /// Default config file location (`<config_dir>/codex-gateway/config.toml`)
    #[must_use]
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("codex-gateway").join("config.toml"))
    }
}

#[cfg(feature = "config-file")]
pub use file::default_config_path;
