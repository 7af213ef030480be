// ABOUTME: Completion gateway library driving the Codex CLI as an LLM provider
// ABOUTME: Re-exports the runner, configuration, request types, and pipeline stages
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 dravr.ai

//! # Codex Gateway — CLI Completion Runner
//!
//! Turns a chat-completion request into a single `codex exec` invocation:
//! messages are flattened into a prompt delivered on stdin, provider
//! configuration becomes command-line flags, an optional JSON Schema is
//! staged for `--output-schema`, and the final assistant message is read
//! back from the `--output-last-message` capture file.
//!
//! Every temp file created for a call is removed before the call returns,
//! whether it succeeds, fails, or times out.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use codex_gateway::{CodexConfig, CodexRunner};
//! use codex_gateway::types::{ChatMessage, CompletionRequest, LlmProvider};
//!
//! # async fn example() -> Result<(), codex_gateway::types::RunnerError> {
//! let runner = CodexRunner::new(CodexConfig::new().with_model("gpt-5.2-codex"))?;
//! let request = CompletionRequest::new(vec![ChatMessage::user("Hello!")]);
//! let response = runner.complete(&request).await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`types`] — Core types: `LlmProvider` trait, messages, requests, errors
//! - [`config`] — Runner configuration, sandbox modes, env and file loading
//! - [`prompt`] — Prompt flattening from raw text or messages
//! - [`overrides`] — `-c key=value` override encoding
//! - [`schema`] — Structured-output descriptors and schema files
//! - [`command`] — `codex exec` argument assembly
//! - [`process`] — Subprocess spawning with stdin, timeout, and output limits
//! - [`response`] — Final-message extraction and failure messages
//! - [`codex`] — The Codex CLI runner
//! - [`discovery`] — Binary resolution on `PATH`
//! - [`compat`] — Version detection
//! - [`auth`] — Login readiness checking

/// Core types: traits, messages, requests, responses, and errors
pub mod types;

/// Login readiness checking
pub mod auth;
/// Codex CLI runner
pub mod codex;
/// `codex exec` argument assembly
pub mod command;
/// Version detection for the installed CLI
pub mod compat;
/// Runner configuration
pub mod config;
/// Binary resolution
pub mod discovery;
/// Config override encoding
pub mod overrides;
/// Subprocess spawning with safety limits
pub mod process;
/// Prompt construction from messages
pub mod prompt;
/// Response extraction from capture file or stdout
pub mod response;
/// Structured-output schema descriptors and files
pub mod schema;

pub use auth::{check_readiness, ProviderReadiness};
pub use codex::{CallPhase, CodexRunner, InvocationPlan};
pub use compat::{detect_version, CliVersion};
pub use config::{CodexConfig, SandboxMode};
pub use discovery::{discover_codex, resolve_binary};
pub use overrides::ConfigOverrides;
pub use schema::{ResponseSchema, SchemaFor};
