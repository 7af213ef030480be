// ABOUTME: Auth readiness checking for the Codex CLI
// ABOUTME: Verifies that the binary is installed and logged in via `codex login status`
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 dravr.ai

use std::fmt;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::process::Command;
use tracing::{debug, warn};

use crate::process::{run_cli_command, CliOutput};
use crate::types::RunnerError;

/// Maximum time to wait for an auth-check command
const AUTH_CHECK_TIMEOUT: Duration = Duration::from_secs(15);

/// Maximum output size for auth-check commands (64 KiB)
const AUTH_CHECK_MAX_OUTPUT: usize = 64 * 1024;

/// Provider readiness status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProviderReadiness {
    /// CLI is installed and authenticated
    Ready,
    /// CLI is installed but not authenticated or misconfigured
    NotReady {
        /// Human-readable explanation of why the provider is not ready
        reason: String,
        /// Suggested action to fix the issue
        action: String,
    },
    /// CLI binary was not found at the expected path
    BinaryMissing {
        /// Path that was expected
        expected_binary: String,
    },
    /// Unable to determine readiness
    Unknown {
        /// Explanation of why readiness could not be determined
        reason: String,
    },
}

impl ProviderReadiness {
    /// Returns `true` when the provider is authenticated and ready to serve requests
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }
}

impl fmt::Display for ProviderReadiness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready => write!(f, "ready"),
            Self::NotReady { reason, action } => {
                write!(f, "not ready: {reason} (action: {action})")
            }
            Self::BinaryMissing { expected_binary } => {
                write!(f, "binary missing: {expected_binary}")
            }
            Self::Unknown { reason } => write!(f, "unknown: {reason}"),
        }
    }
}

/// Check whether the Codex CLI is logged in
///
/// A non-ready CLI is reported as `ProviderReadiness::NotReady`, not as an
/// error; a login check that cannot be spawned becomes `Unknown`.
pub async fn check_readiness(binary_path: &Path) -> Result<ProviderReadiness, RunnerError> {
    if !binary_path.exists() {
        return Ok(ProviderReadiness::BinaryMissing {
            expected_binary: binary_path.display().to_string(),
        });
    }

    let mut cmd = Command::new(binary_path);
    cmd.args(["login", "status"]);

    let output = run_cli_command(
        &mut cmd,
        None,
        Some(AUTH_CHECK_TIMEOUT),
        AUTH_CHECK_MAX_OUTPUT,
    )
    .await;

    match output {
        Ok(CliOutput { exit_code: 0, .. }) => {
            debug!("Codex login status: ready");
            Ok(ProviderReadiness::Ready)
        }
        Ok(cli_output) => {
            let stderr = cli_output.stderr_text();
            warn!(exit_code = cli_output.exit_code, %stderr, "Codex login check failed");
            Ok(ProviderReadiness::NotReady {
                reason: format!("Login check exited with code {}", cli_output.exit_code),
                action: "Run `codex login` to authenticate".to_owned(),
            })
        }
        Err(e) => Ok(ProviderReadiness::Unknown {
            reason: format!("Failed to run login check: {e}"),
        }),
    }
}
