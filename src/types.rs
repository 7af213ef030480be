// ABOUTME: Core types for the Codex completion gateway — errors, messages, requests, provider trait
// ABOUTME: Provides LlmProvider trait, CompletionRequest/Response, RunnerError, and capability flags
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 dravr.ai

//! # Core Types
//!
//! Self-contained type definitions shared by every stage of a gateway call:
//! the error taxonomy, the chat message model, the request/response pair,
//! and the [`LlmProvider`] contract implemented by the Codex runner.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::schema::ResponseSchema;

// ============================================================================
// Error Type
// ============================================================================

/// Error type for gateway operations
#[derive(Debug, Clone)]
pub struct RunnerError {
    /// Error category
    pub kind: ErrorKind,
    /// Human-readable error message
    pub message: String,
}

/// Categories of errors produced by the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Internal runner error (spawn or wait failure, unexpected state)
    Internal,
    /// Configuration error (invalid override input, bad config value)
    Config,
    /// Binary not found on `PATH` or at the configured location
    BinaryNotFound,
    /// The CLI process exited with a non-zero status
    ProcessFailure,
    /// The CLI process did not finish within the configured timeout
    Timeout,
    /// Writing the schema file or reading the capture file failed
    ResourceIo,
    /// The structured-output descriptor could not produce its schema
    Schema,
}

impl RunnerError {
    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Internal,
            message: message.into(),
        }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Config,
            message: message.into(),
        }
    }

    /// Create a binary-not-found error
    pub fn binary_not_found(binary: impl Into<String>, detail: impl fmt::Display) -> Self {
        Self {
            kind: ErrorKind::BinaryNotFound,
            message: format!(
                "Codex CLI not found: {} ({detail}). Install it and ensure it's on PATH.",
                binary.into()
            ),
        }
    }

    /// Create a process failure error; the message is kept verbatim
    pub fn process_failure(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::ProcessFailure,
            message: message.into(),
        }
    }

    /// Create a timeout error
    pub fn timeout(after: Duration) -> Self {
        Self {
            kind: ErrorKind::Timeout,
            message: format!("codex exec timed out after {after:?}"),
        }
    }

    /// Create a resource I/O error
    pub fn resource_io(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::ResourceIo,
            message: message.into(),
        }
    }

    /// Create a schema error
    pub fn schema(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Schema,
            message: message.into(),
        }
    }

    /// Returns `true` when the error is a timeout
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        self.kind == ErrorKind::Timeout
    }
}

impl fmt::Display for RunnerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl std::error::Error for RunnerError {}

// ============================================================================
// Capability Flags
// ============================================================================

bitflags::bitflags! {
    /// LLM provider capability flags
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
    pub struct LlmCapabilities: u8 {
        /// Provider supports function/tool calling
        const FUNCTION_CALLING = 0b0000_0001;
        /// Provider supports JSON-schema constrained output
        const JSON_MODE = 0b0000_0010;
    }
}

impl LlmCapabilities {
    /// Check if JSON-schema constrained output is supported
    #[must_use]
    pub const fn supports_json_mode(&self) -> bool {
        self.contains(Self::JSON_MODE)
    }

    /// Check if function calling is supported
    #[must_use]
    pub const fn supports_function_calling(&self) -> bool {
        self.contains(Self::FUNCTION_CALLING)
    }
}

// ============================================================================
// Message Types
// ============================================================================

/// Content of a chat message: plain text or a list of heterogeneous parts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    /// Plain text content
    Text(String),
    /// Multimodal parts, flattened to text when the prompt is built
    Parts(Vec<Value>),
}

impl From<&str> for MessageContent {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for MessageContent {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Vec<Value>> for MessageContent {
    fn from(value: Vec<Value>) -> Self {
        Self::Parts(value)
    }
}

/// A single message in a chat conversation
///
/// Both fields are optional so that loosely-shaped messages coming from an
/// orchestration layer deserialize without loss; the prompt builder fills
/// in `user` and the empty string.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message sender (free-form, e.g. `system`, `user`, `tool`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Content of the message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<MessageContent>,
}

impl ChatMessage {
    /// Create a new chat message
    #[must_use]
    pub fn new(role: impl Into<String>, content: impl Into<MessageContent>) -> Self {
        Self {
            role: Some(role.into()),
            content: Some(content.into()),
        }
    }

    /// Create a system message
    #[must_use]
    pub fn system(content: impl Into<MessageContent>) -> Self {
        Self::new("system", content)
    }

    /// Create a user message
    #[must_use]
    pub fn user(content: impl Into<MessageContent>) -> Self {
        Self::new("user", content)
    }

    /// Create an assistant message
    #[must_use]
    pub fn assistant(content: impl Into<MessageContent>) -> Self {
        Self::new("assistant", content)
    }
}

/// Prompt input: either a raw string or an ordered message sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PromptInput {
    /// Raw prompt text, passed through trimmed
    Text(String),
    /// Role/content messages, flattened into `ROLE: content` lines
    Messages(Vec<ChatMessage>),
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// A single completion request
#[derive(Clone)]
pub struct CompletionRequest {
    /// Prompt text or messages
    pub input: PromptInput,
    /// Structured-output descriptor for this call only
    pub response_model: Option<Arc<dyn ResponseSchema>>,
}

impl CompletionRequest {
    /// Create a request from a message sequence
    #[must_use]
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            input: PromptInput::Messages(messages),
            response_model: None,
        }
    }

    /// Create a request from a raw prompt string
    #[must_use]
    pub fn from_prompt(prompt: impl Into<String>) -> Self {
        Self {
            input: PromptInput::Text(prompt.into()),
            response_model: None,
        }
    }

    /// Ask the CLI to shape its final message after the given schema
    #[must_use]
    pub fn with_response_model(mut self, model: Arc<dyn ResponseSchema>) -> Self {
        self.response_model = Some(model);
        self
    }
}

impl fmt::Debug for CompletionRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionRequest")
            .field("input", &self.input)
            .field("response_model", &self.response_model.is_some())
            .finish()
    }
}

/// Response from a completion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    /// Final message text (schema-conformant JSON when a schema was given)
    pub content: String,
    /// Model used for generation
    pub model: String,
    /// Wall-clock duration of the CLI process
    pub duration: Duration,
}

// ============================================================================
// Provider Trait
// ============================================================================

/// LLM provider trait for chat completion
///
/// Implemented by runners that translate a [`CompletionRequest`] into a
/// single external-process invocation.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Unique provider identifier (e.g., `codex_cli`)
    fn name(&self) -> &'static str;

    /// Human-readable display name for the provider
    fn display_name(&self) -> &'static str;

    /// Provider capabilities
    fn capabilities(&self) -> LlmCapabilities;

    /// Model used when the request does not name one
    fn default_model(&self) -> &str;

    /// Perform a completion
    async fn complete(
        &self,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, RunnerError>;

    /// Check if the provider is healthy and ready to serve requests
    async fn health_check(&self) -> Result<bool, RunnerError>;
}
