// ABOUTME: CLI entry point for the codex-gateway binary
// ABOUTME: Resolves configuration, reads the prompt, runs one completion, and prints the result
//
// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 dravr.ai

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use codex_gateway::config::default_config_path;
use codex_gateway::overrides::encode_overrides;
use codex_gateway::types::{CompletionRequest, LlmProvider, PromptInput, RunnerError};
use codex_gateway::{
    check_readiness, detect_version, CodexConfig, CodexRunner, ConfigOverrides, SandboxMode,
};
use serde_json::Value;
use tokio::io::AsyncReadExt;

/// codex-gateway — run a single completion through `codex exec`
#[derive(Parser)]
#[command(name = "codex-gateway", version, about)]
struct Cli {
    /// Prompt text; read from stdin when omitted
    prompt: Option<String>,

    /// JSON file holding a prompt string or a list of {role, content} messages
    #[arg(long, conflicts_with = "prompt")]
    messages: Option<PathBuf>,

    /// TOML config file (defaults to the user config dir, then CODEX_* env vars)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Codex binary name or path
    #[arg(long)]
    binary: Option<String>,

    /// Model passed to `codex exec -m`
    #[arg(short, long)]
    model: Option<String>,

    /// Working directory handed to the CLI via --cd
    #[arg(long)]
    cd: Option<PathBuf>,

    /// Additional writable directory (repeatable)
    #[arg(long = "add-dir")]
    add_dirs: Vec<PathBuf>,

    /// Sandbox mode (read-only, workspace-write, danger-full-access)
    #[arg(long)]
    sandbox: Option<String>,

    /// Pass --full-auto
    #[arg(long)]
    full_auto: bool,

    /// Pass --dangerously-bypass-approvals-and-sandbox
    #[arg(long)]
    dangerously_bypass_approvals_and_sandbox: bool,

    /// Do not pass --skip-git-repo-check
    #[arg(long)]
    require_git_repo: bool,

    /// Config override `key=value` (repeatable, applied after file overrides)
    #[arg(short = 'c', long = "override")]
    overrides: Vec<String>,

    /// JSON Schema file the final message must follow
    #[arg(long)]
    schema: Option<PathBuf>,

    /// Timeout in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Report binary version and login readiness instead of running a prompt
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr to keep stdout clean for the response
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = apply_flags(base_config(cli.config.as_deref())?, &cli);
    let runner = CodexRunner::new(config)?;

    if cli.check {
        let version = detect_version(runner.binary_path()).await?;
        let readiness = check_readiness(runner.binary_path()).await?;
        println!("binary:    {}", runner.binary_path().display());
        println!("version:   {}", version.version_string);
        println!("readiness: {readiness}");
        return Ok(());
    }

    let mut request = CompletionRequest {
        input: read_input(&cli).await?,
        response_model: None,
    };
    if let Some(path) = &cli.schema {
        request = request.with_response_model(Arc::new(read_json(path)?));
    }

    tracing::info!(
        binary = %runner.binary_path().display(),
        model = %runner.default_model(),
        "Running codex exec"
    );
    let response = runner.complete(&request).await?;
    println!("{}", response.content);
    Ok(())
}

/// Explicit file, then the default config file if present, then env vars
fn base_config(path: Option<&Path>) -> Result<CodexConfig, RunnerError> {
    if let Some(path) = path {
        return CodexConfig::load(path);
    }
    match default_config_path() {
        Some(default) if default.exists() => CodexConfig::load(&default),
        _ => CodexConfig::from_env(),
    }
}

fn apply_flags(mut config: CodexConfig, cli: &Cli) -> CodexConfig {
    if let Some(binary) = &cli.binary {
        config.binary.clone_from(binary);
    }
    if let Some(model) = &cli.model {
        config.model.clone_from(model);
    }
    if let Some(cd) = &cli.cd {
        config.working_directory = Some(cd.clone());
    }
    config.add_dirs.extend(cli.add_dirs.iter().cloned());
    if let Some(sandbox) = &cli.sandbox {
        config.sandbox = Some(SandboxMode::from(sandbox.clone()));
    }
    config.full_auto |= cli.full_auto;
    config.dangerously_bypass_approvals_and_sandbox |= cli.dangerously_bypass_approvals_and_sandbox;
    if cli.require_git_repo {
        config.skip_git_repo_check = false;
    }
    if !cli.overrides.is_empty() {
        let mut raw = encode_overrides(config.overrides.as_ref());
        for pair in &cli.overrides {
            raw.push("-c".to_owned());
            raw.push(pair.clone());
        }
        config.overrides = Some(ConfigOverrides::Raw(raw));
    }
    if let Some(secs) = cli.timeout_secs {
        config.timeout = Some(Duration::from_secs(secs));
    }
    config
}

async fn read_input(cli: &Cli) -> Result<PromptInput, RunnerError> {
    if let Some(path) = &cli.messages {
        return serde_json::from_value(read_json(path)?).map_err(|e| {
            RunnerError::config(format!("Invalid messages file {}: {e}", path.display()))
        });
    }
    if let Some(prompt) = &cli.prompt {
        return Ok(PromptInput::Text(prompt.clone()));
    }
    let mut text = String::new();
    tokio::io::stdin()
        .read_to_string(&mut text)
        .await
        .map_err(|e| RunnerError::resource_io(format!("Failed to read prompt from stdin: {e}")))?;
    Ok(PromptInput::Text(text))
}

fn read_json(path: &Path) -> Result<Value, RunnerError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| RunnerError::config(format!("Failed to read {}: {e}", path.display())))?;
    serde_json::from_str(&text)
        .map_err(|e| RunnerError::config(format!("Invalid JSON in {}: {e}", path.display())))
}
