// ABOUTME: Binary resolution for the Codex CLI runner
// ABOUTME: Resolves names via PATH and explicit paths via `which`, with an env override
//
// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 dravr.ai

use std::env;
use std::path::PathBuf;

use tracing::debug;

use crate::config::{DEFAULT_BINARY, ENV_BINARY};
use crate::types::RunnerError;

/// Resolve a binary locator to an executable path
///
/// Resolution order:
/// 1. If `env_override` is `Some`, that value replaces `locator`
/// 2. The locator is resolved with `which`: bare names are searched on
///    `PATH`, anything containing a separator is checked in place
///
/// # Errors
///
/// Returns a `BinaryNotFound` error if the binary cannot be located.
pub fn resolve_binary(locator: &str, env_override: Option<&str>) -> Result<PathBuf, RunnerError> {
    let target = env_override.unwrap_or(locator);
    if target.trim().is_empty() {
        return Err(RunnerError::binary_not_found(target, "empty binary locator"));
    }

    let path = which::which(target).map_err(|e| RunnerError::binary_not_found(target, e))?;
    debug!(
        binary = target,
        path = %path.display(),
        overridden = env_override.is_some(),
        "Resolved Codex CLI binary"
    );
    Ok(path)
}

/// Locate the Codex CLI using `CODEX_BINARY` or the default name on `PATH`
///
/// # Errors
///
/// Returns a `BinaryNotFound` error if no binary can be located.
pub fn discover_codex() -> Result<PathBuf, RunnerError> {
    let env_override = env::var(ENV_BINARY).ok();
    resolve_binary(DEFAULT_BINARY, env_override.as_deref())
}
