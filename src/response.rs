// ABOUTME: Final-message extraction from the `--output-last-message` capture file
// ABOUTME: Falls back to trimmed stdout when the CLI exits without writing the file
//
// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 dravr.ai

use std::io;
use std::path::Path;

use tokio::fs;
use tracing::debug;

use crate::process::CliOutput;
use crate::types::RunnerError;

/// Fallback failure text when the CLI gives no diagnostics at all
const GENERIC_FAILURE: &str = "codex exec failed";

/// Extract the response text for a finished process
///
/// An existing capture file always wins, even when empty: an empty file
/// means the agent produced no final message.
pub async fn extract_response(
    output: &CliOutput,
    capture_path: &Path,
) -> Result<String, RunnerError> {
    match fs::read(capture_path).await {
        Ok(bytes) => {
            let text = String::from_utf8(bytes).map_err(|e| {
                RunnerError::resource_io(format!("Capture file is not valid UTF-8: {e}"))
            })?;
            debug!(len = text.len(), "Read final message from capture file");
            Ok(text.trim().to_owned())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!("Capture file missing, falling back to stdout");
            Ok(output.stdout_text())
        }
        Err(e) => Err(RunnerError::resource_io(format!(
            "Failed to read capture file {}: {e}",
            capture_path.display()
        ))),
    }
}

/// Pick the message for a non-zero exit: stderr, then stdout, then a generic text
#[must_use]
pub fn failure_message(output: &CliOutput) -> String {
    let stderr = output.stderr_text();
    if !stderr.is_empty() {
        return stderr;
    }
    let stdout = output.stdout_text();
    if !stdout.is_empty() {
        return stdout;
    }
    GENERIC_FAILURE.to_owned()
}
