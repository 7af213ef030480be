// ABOUTME: Codex CLI runner implementing the `LlmProvider` trait
// ABOUTME: Stages schema/capture files, runs `codex exec`, and extracts the final message
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 dravr.ai

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use tempfile::TempDir;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::command::build_command_args;
use crate::config::CodexConfig;
use crate::discovery::resolve_binary;
use crate::process::{command_from_args, run_cli_command, CliOutput};
use crate::prompt::flatten_prompt;
use crate::response::{extract_response, failure_message};
use crate::schema::write_schema_file;
use crate::types::{
    CompletionRequest, CompletionResponse, LlmCapabilities, LlmProvider, RunnerError,
};

/// Maximum output size for a single `codex exec` invocation (50 MiB)
const MAX_OUTPUT_BYTES: usize = 50 * 1024 * 1024;

/// Health check timeout (10 seconds)
const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(10);

/// Health check output limit (4 KiB)
const HEALTH_CHECK_MAX_OUTPUT: usize = 4096;

/// File name the CLI writes its final message to, inside the scratch dir
const CAPTURE_FILE_NAME: &str = "last-message.txt";

/// Stages of a single completion call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallPhase {
    /// Nothing done yet
    Idle,
    /// Prompt flattened
    PromptBuilt,
    /// Output schema written to disk
    SchemaStaged,
    /// Argument vector assembled
    CommandBuilt,
    /// Child process running
    Executing,
    /// Reading the final message
    Extracting,
    /// Response returned
    Done,
    /// Error returned
    Failed,
}

impl fmt::Display for CallPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::PromptBuilt => "prompt_built",
            Self::SchemaStaged => "schema_staged",
            Self::CommandBuilt => "command_built",
            Self::Executing => "executing",
            Self::Extracting => "extracting",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Per-call resources: argument vector plus the scratch directory holding
/// the optional schema file and the capture file
///
/// Dropping the plan removes the scratch directory; [`InvocationPlan::close`]
/// does the same but logs a failed removal.
#[derive(Debug)]
pub struct InvocationPlan {
    /// Full argument vector, binary first
    pub args: Vec<String>,
    /// Schema file passed via `--output-schema`, if any
    pub schema_path: Option<PathBuf>,
    /// File passed via `--output-last-message`
    pub capture_path: PathBuf,
    scratch: TempDir,
}

impl InvocationPlan {
    /// Remove every staged file; failures are logged and swallowed
    pub fn close(self) {
        let dir = self.scratch.path().to_path_buf();
        if let Err(e) = self.scratch.close() {
            warn!(dir = %dir.display(), "Failed to clean up codex scratch directory: {e}");
        }
    }

    /// Directory holding this call's temp files
    #[must_use]
    pub fn scratch_dir(&self) -> &Path {
        self.scratch.path()
    }
}

/// Codex CLI runner
///
/// Implements `LlmProvider` by delegating to `codex exec`. The prompt is
/// delivered on stdin and the final assistant message is captured via
/// `--output-last-message`. Tool calling is not supported; a schema given
/// on the request is forwarded via `--output-schema`.
#[derive(Debug, Clone)]
pub struct CodexRunner {
    config: CodexConfig,
    binary_path: PathBuf,
}

impl CodexRunner {
    /// Create a runner, resolving the configured binary once
    ///
    /// # Errors
    ///
    /// Returns a `BinaryNotFound` error when the binary cannot be located.
    pub fn new(config: CodexConfig) -> Result<Self, RunnerError> {
        let binary_path = resolve_binary(&config.binary, None)?;
        Ok(Self {
            config,
            binary_path,
        })
    }

    /// Configuration this runner was built with
    #[must_use]
    pub const fn config(&self) -> &CodexConfig {
        &self.config
    }

    /// Resolved path of the Codex binary
    #[must_use]
    pub fn binary_path(&self) -> &Path {
        &self.binary_path
    }

    /// Run a completion and return only the response text
    pub async fn call(&self, request: &CompletionRequest) -> Result<String, RunnerError> {
        self.complete(request).await.map(|response| response.content)
    }

    /// Stage temp files and assemble the argument vector for one call
    ///
    /// Schema failures surface here, before any process is spawned; the
    /// scratch directory is dropped with the error.
    pub fn plan(&self, request: &CompletionRequest) -> Result<InvocationPlan, RunnerError> {
        let scratch = tempfile::Builder::new()
            .prefix("codex-exec-")
            .tempdir()
            .map_err(|e| {
                RunnerError::resource_io(format!("Failed to create scratch directory: {e}"))
            })?;

        let schema_path = match &request.response_model {
            Some(model) => {
                let path = write_schema_file(scratch.path(), model.as_ref())?;
                trace_phase(CallPhase::SchemaStaged);
                Some(path)
            }
            None => None,
        };

        let capture_path = scratch.path().join(CAPTURE_FILE_NAME);
        let args = build_command_args(
            &self.binary_path,
            &self.config,
            schema_path.as_deref(),
            &capture_path,
        );
        trace_phase(CallPhase::CommandBuilt);

        Ok(InvocationPlan {
            args,
            schema_path,
            capture_path,
            scratch,
        })
    }

    /// Execute a plan and turn the process result into response text
    async fn execute(
        &self,
        plan: &InvocationPlan,
        prompt: &str,
    ) -> Result<(String, Duration), RunnerError> {
        let mut cmd = command_from_args(&plan.args)?;
        trace_phase(CallPhase::Executing);
        let output = run_cli_command(
            &mut cmd,
            Some(prompt),
            self.config.timeout,
            MAX_OUTPUT_BYTES,
        )
        .await?;

        if output.exit_code != 0 {
            return Err(process_failure(&output));
        }

        trace_phase(CallPhase::Extracting);
        let content = extract_response(&output, &plan.capture_path).await?;
        Ok((content, output.duration))
    }
}

fn process_failure(output: &CliOutput) -> RunnerError {
    let message = failure_message(output);
    warn!(exit_code = output.exit_code, %message, "codex exec failed");
    RunnerError::process_failure(message)
}

fn trace_phase(phase: CallPhase) {
    debug!(%phase, "codex call transition");
}

#[async_trait]
impl LlmProvider for CodexRunner {
    fn name(&self) -> &'static str {
        "codex_cli"
    }

    fn display_name(&self) -> &'static str {
        "Codex CLI"
    }

    fn capabilities(&self) -> LlmCapabilities {
        // Codex has no system-prompt flag; system messages are flattened
        // into the stdin prompt like every other role.
        LlmCapabilities::JSON_MODE
    }

    fn default_model(&self) -> &str {
        &self.config.model
    }

    async fn complete(
        &self,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, RunnerError> {
        trace_phase(CallPhase::Idle);
        let prompt = flatten_prompt(&request.input);
        trace_phase(CallPhase::PromptBuilt);
        debug!(
            prompt_len = prompt.len(),
            structured = request.response_model.is_some(),
            model = %self.config.model,
            "Starting codex exec"
        );

        let plan = self.plan(request).inspect_err(|_| trace_phase(CallPhase::Failed))?;
        let result = self.execute(&plan, &prompt).await;
        plan.close();

        match result {
            Ok((content, duration)) => {
                trace_phase(CallPhase::Done);
                Ok(CompletionResponse {
                    content,
                    model: self.config.model.clone(),
                    duration,
                })
            }
            Err(e) => {
                trace_phase(CallPhase::Failed);
                Err(e)
            }
        }
    }

    async fn health_check(&self) -> Result<bool, RunnerError> {
        let mut cmd = Command::new(&self.binary_path);
        cmd.arg("--version");

        let output = run_cli_command(
            &mut cmd,
            None,
            Some(HEALTH_CHECK_TIMEOUT),
            HEALTH_CHECK_MAX_OUTPUT,
        )
        .await?;

        if output.exit_code == 0 {
            debug!(version = %output.stdout_text(), "Codex health check passed");
            Ok(true)
        } else {
            warn!(exit_code = output.exit_code, "Codex health check failed");
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ChatMessage;
    use serde_json::json;
    use std::sync::Arc;

    fn runner() -> CodexRunner {
        CodexRunner {
            config: CodexConfig::new().with_model("gpt-5"),
            binary_path: PathBuf::from("/opt/codex/bin/codex"),
        }
    }

    #[test]
    fn test_plan_without_schema_has_capture_only() {
        let plan = runner()
            .plan(&CompletionRequest::from_prompt("hi"))
            .unwrap();

        assert!(plan.schema_path.is_none());
        assert!(plan.capture_path.starts_with(plan.scratch_dir()));
        assert!(!plan.capture_path.exists());
        assert_eq!(plan.args[0], "/opt/codex/bin/codex");
        assert!(!plan.args.contains(&"--output-schema".to_owned()));
        assert_eq!(
            plan.args.last().map(String::as_str),
            plan.capture_path.to_str()
        );
    }

    #[test]
    fn test_plan_with_schema_stages_file() {
        let schema = Arc::new(json!({"type": "object"}));
        let request =
            CompletionRequest::new(vec![ChatMessage::user("hi")]).with_response_model(schema);
        let plan = runner().plan(&request).unwrap();

        let schema_path = plan.schema_path.clone().unwrap();
        assert!(schema_path.exists());
        let idx = plan.args.iter().position(|a| a == "--output-schema").unwrap();
        assert_eq!(plan.args[idx + 1], schema_path.to_string_lossy());

        let scratch = plan.scratch_dir().to_path_buf();
        plan.close();
        assert!(!schema_path.exists());
        assert!(!scratch.exists());
    }

    #[test]
    fn test_dropped_plan_removes_scratch_dir() {
        let plan = runner().plan(&CompletionRequest::from_prompt("hi")).unwrap();
        let scratch = plan.scratch_dir().to_path_buf();
        drop(plan);
        assert!(!scratch.exists());
    }

    #[test]
    fn test_plans_are_unique_per_call() {
        let runner = runner();
        let first = runner.plan(&CompletionRequest::from_prompt("a")).unwrap();
        let second = runner.plan(&CompletionRequest::from_prompt("b")).unwrap();
        assert_ne!(first.capture_path, second.capture_path);
    }

    #[test]
    fn test_missing_binary_fails_construction() {
        let err = CodexRunner::new(CodexConfig::new().with_binary("codex-missing-xyz-123"))
            .unwrap_err();
        assert_eq!(err.kind, crate::types::ErrorKind::BinaryNotFound);
    }

    #[test]
    fn test_provider_metadata() {
        let runner = runner();
        assert_eq!(runner.name(), "codex_cli");
        assert_eq!(runner.default_model(), "gpt-5");
        assert!(runner.capabilities().supports_json_mode());
        assert!(!runner.capabilities().supports_function_calling());
    }

    #[test]
    fn test_call_phase_display() {
        assert_eq!(CallPhase::SchemaStaged.to_string(), "schema_staged");
        assert_eq!(CallPhase::Failed.to_string(), "failed");
    }
}
