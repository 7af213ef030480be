// ABOUTME: Prompt flattening from raw strings or ChatMessage sequences for CLI invocations
// ABOUTME: Builds `ROLE: content` lines delivered to the Codex CLI on stdin
//
// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 dravr.ai

use serde_json::Value;
use tracing::debug;

use crate::types::{ChatMessage, MessageContent, PromptInput};

/// Role used when a message does not carry one
const DEFAULT_ROLE: &str = "user";

/// Flatten a prompt input into a single newline-delimited string
///
/// Raw text is returned trimmed. Messages become `ROLE: content` lines
/// joined by `\n`, and the result is trimmed as a whole.
#[must_use]
pub fn flatten_prompt(input: &PromptInput) -> String {
    match input {
        PromptInput::Text(text) => text.trim().to_owned(),
        PromptInput::Messages(messages) => build_prompt(messages),
    }
}

/// Build a single prompt string from a slice of chat messages
#[must_use]
pub fn build_prompt(messages: &[ChatMessage]) -> String {
    let lines: Vec<String> = messages.iter().map(render_message).collect();
    let prompt = lines.join("\n").trim().to_owned();
    debug!(
        message_count = messages.len(),
        prompt_len = prompt.len(),
        "Built prompt from messages"
    );
    prompt
}

fn render_message(msg: &ChatMessage) -> String {
    let role = msg.role.as_deref().unwrap_or(DEFAULT_ROLE).to_uppercase();
    let content = match &msg.content {
        None => String::new(),
        Some(MessageContent::Text(text)) => text.clone(),
        Some(MessageContent::Parts(parts)) => parts
            .iter()
            .map(part_to_text)
            .collect::<Vec<_>>()
            .join(" "),
    };
    format!("{role}: {content}")
}

/// Strings contribute their raw text; everything else its compact JSON form
fn part_to_text(part: &Value) -> String {
    match part {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
