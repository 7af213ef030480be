// ABOUTME: Version detection for the installed Codex CLI binary
// ABOUTME: Probes `codex --version` and checks it against the minimum supported release
//
// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 dravr.ai

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::process::Command;
use tracing::{debug, warn};

use crate::process::run_cli_command;
use crate::types::RunnerError;

/// Minimum supported `codex` release (major, minor, patch)
const CODEX_MIN_VERSION: (u32, u32, u32) = (0, 1, 0);

/// Version probe timeout
const VERSION_CHECK_TIMEOUT: Duration = Duration::from_secs(10);

/// Version probe output limit (4 KiB)
const VERSION_CHECK_MAX_OUTPUT: usize = 4096;

/// Detected version of a Codex CLI binary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CliVersion {
    /// Raw output of `--version`
    pub version_string: String,
    /// Parsed semantic version components (major, minor, patch)
    pub version: Option<(u32, u32, u32)>,
    /// Whether the binary meets the minimum version requirement
    pub meets_minimum_version: bool,
}

/// Run `codex --version` and parse the result
///
/// # Errors
///
/// Returns an error if the binary cannot be executed or exits non-zero.
pub async fn detect_version(binary_path: &Path) -> Result<CliVersion, RunnerError> {
    let mut cmd = Command::new(binary_path);
    cmd.arg("--version");
    let output = run_cli_command(
        &mut cmd,
        None,
        Some(VERSION_CHECK_TIMEOUT),
        VERSION_CHECK_MAX_OUTPUT,
    )
    .await?;

    if output.exit_code != 0 {
        return Err(RunnerError::process_failure(format!(
            "codex --version exited with code {}: {}",
            output.exit_code,
            output.stderr_text()
        )));
    }

    let mut version_string = output.stdout_text();
    if version_string.is_empty() {
        debug!("Version check returned empty stdout, using stderr");
        version_string = output.stderr_text();
    }
    Ok(evaluate_version(version_string))
}

fn evaluate_version(version_string: String) -> CliVersion {
    let version = parse_semver(&version_string);
    let meets_minimum_version = version.is_some_and(|v| v >= CODEX_MIN_VERSION);
    if !meets_minimum_version {
        let (major, minor, patch) = CODEX_MIN_VERSION;
        warn!(
            detected = %version_string,
            minimum = %format!("{major}.{minor}.{patch}"),
            "Codex CLI version is below minimum supported version",
        );
    }
    CliVersion {
        version_string,
        version,
        meets_minimum_version,
    }
}

/// Parse a semantic version string into (major, minor, patch)
///
/// Takes the first whitespace-separated token that looks like a version, so
/// "0.46.0", "v0.46.0" and "codex-cli 0.46.0" all parse.
#[must_use]
pub fn parse_semver(version_str: &str) -> Option<(u32, u32, u32)> {
    version_str.split_whitespace().find_map(parse_version_token)
}

fn parse_version_token(token: &str) -> Option<(u32, u32, u32)> {
    let token = token.strip_prefix('v').unwrap_or(token);
    // "0.47.0-alpha.2" keeps only the release part
    let release = token.split('-').next()?;
    let mut parts = release.split('.').map(|part| part.parse::<u32>().ok());
    let major = parts.next()??;
    let minor = parts.next()??;
    let patch = parts.next()??;
    Some((major, minor, patch))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_semver_codex_banner() {
        assert_eq!(parse_semver("codex-cli 0.46.0"), Some((0, 46, 0)));
    }

    #[test]
    fn test_parse_semver_with_prerelease() {
        assert_eq!(parse_semver("codex-cli 0.47.0-alpha.2"), Some((0, 47, 0)));
        assert_eq!(parse_semver("v1.2.3"), Some((1, 2, 3)));
    }

    #[test]
    fn test_parse_semver_invalid() {
        assert_eq!(parse_semver("codex-cli dev"), None);
        assert_eq!(parse_semver(""), None);
    }

    #[test]
    fn test_evaluate_version_against_minimum() {
        assert!(evaluate_version("codex-cli 0.46.0".to_owned()).meets_minimum_version);
        assert!(evaluate_version("codex-cli 0.1.0".to_owned()).meets_minimum_version);
        assert!(!evaluate_version("codex-cli 0.0.9".to_owned()).meets_minimum_version);
    }

    #[test]
    fn test_evaluate_version_unparseable_fails_minimum() {
        let version = evaluate_version("codex nightly".to_owned());
        assert_eq!(version.version, None);
        assert!(!version.meets_minimum_version);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_detect_version_from_script() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("codex");
        std::fs::write(&script, "#!/bin/sh\necho 'codex-cli 0.46.0'\n").unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let version = detect_version(&script).await.unwrap();
        assert_eq!(version.version, Some((0, 46, 0)));
        assert!(version.meets_minimum_version);
    }
}
