// ABOUTME: Subprocess spawning with stdin prompt delivery, timeout, and output-size limits
// ABOUTME: Wraps tokio::process::Command with structured output and error handling
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 dravr.ai

use std::process::Stdio;
use std::time::{Duration, Instant};

use crate::types::RunnerError;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::Command;
use tokio::time::timeout as tokio_timeout;
use tracing::{debug, warn};

/// Default maximum output size (10 MiB)
pub const DEFAULT_MAX_OUTPUT_BYTES: usize = 10 * 1024 * 1024;

/// Structured output from a CLI command execution
#[derive(Debug, Clone)]
pub struct CliOutput {
    /// Captured standard output bytes
    pub stdout: Vec<u8>,
    /// Captured standard error bytes
    pub stderr: Vec<u8>,
    /// Process exit code (-1 if the process was killed by a signal)
    pub exit_code: i32,
    /// Wall-clock duration of the command
    pub duration: Duration,
}

impl CliOutput {
    /// Standard output decoded lossily and trimmed
    #[must_use]
    pub fn stdout_text(&self) -> String {
        String::from_utf8_lossy(&self.stdout).trim().to_owned()
    }

    /// Standard error decoded lossily and trimmed
    #[must_use]
    pub fn stderr_text(&self) -> String {
        String::from_utf8_lossy(&self.stderr).trim().to_owned()
    }
}

/// Read up to `limit` bytes from a child pipe, then keep draining so the
/// child never blocks on a full pipe
async fn read_capped<R: AsyncRead + Unpin>(
    stream: Option<R>,
    limit: usize,
    stream_name: &'static str,
) -> Vec<u8> {
    let mut buf = Vec::new();
    let mut discarded = 0usize;
    if let Some(mut reader) = stream {
        let mut tmp = [0u8; 8192];
        loop {
            match reader.read(&mut tmp).await {
                Ok(0) | Err(_) => break,
                Ok(n) => {
                    let kept = n.min(limit.saturating_sub(buf.len()));
                    buf.extend_from_slice(&tmp[..kept]);
                    discarded += n - kept;
                }
            }
        }
    }
    if discarded > 0 {
        warn!(
            stream = stream_name,
            limit,
            discarded,
            "CLI output exceeded the size limit and was truncated"
        );
    }
    buf
}

/// Build a `Command` from an argument vector whose first element is the program
///
/// # Errors
///
/// Returns an internal error when the vector is empty.
pub fn command_from_args(args: &[String]) -> Result<Command, RunnerError> {
    let (program, rest) = args
        .split_first()
        .ok_or_else(|| RunnerError::internal("Cannot run an empty command line"))?;
    let mut cmd = Command::new(program);
    cmd.args(rest);
    Ok(cmd)
}

/// Run a CLI command, writing `input` to its stdin, with optional timeout
///
/// Stdout and stderr are captured regardless of exit status; the exit code
/// is reported, not interpreted. If the command does not exit within
/// `timeout` it is killed and a timeout error is returned. Output is capped
/// at `max_output_bytes` (0 selects the default cap).
///
/// # Errors
///
/// Returns `RunnerError` if:
/// - The process cannot be spawned (`Internal`)
/// - Waiting on the process fails (`Internal`)
/// - The process exceeds the timeout (`Timeout`)
pub async fn run_cli_command(
    cmd: &mut Command,
    input: Option<&str>,
    timeout: Option<Duration>,
    max_output_bytes: usize,
) -> Result<CliOutput, RunnerError> {
    let effective_max = if max_output_bytes == 0 {
        DEFAULT_MAX_OUTPUT_BYTES
    } else {
        max_output_bytes
    };

    cmd.stdin(if input.is_some() {
        Stdio::piped()
    } else {
        Stdio::null()
    });
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());
    cmd.kill_on_drop(true);

    let start = Instant::now();

    let mut child = cmd
        .spawn()
        .map_err(|e| RunnerError::internal(format!("Failed to spawn CLI process: {e}")))?;

    // Feed stdin from its own task so a child that writes before it reads
    // cannot deadlock against us; dropping the handle closes the pipe.
    if let (Some(mut stdin), Some(text)) = (child.stdin.take(), input) {
        let payload = text.as_bytes().to_vec();
        tokio::spawn(async move {
            if let Err(e) = stdin.write_all(&payload).await {
                debug!(error = %e, "CLI process closed stdin before reading the prompt");
            }
        });
    }

    let mut stdout_task = tokio::spawn(read_capped(
        child.stdout.take(),
        effective_max,
        "stdout",
    ));
    let mut stderr_task = tokio::spawn(read_capped(
        child.stderr.take(),
        effective_max,
        "stderr",
    ));

    // The deadline covers draining both pipes, not just the exit: a
    // background process can keep them open after the child is gone.
    let collect = async {
        let status = child.wait().await;
        let stdout = (&mut stdout_task).await.unwrap_or_default();
        let stderr = (&mut stderr_task).await.unwrap_or_default();
        (status, stdout, stderr)
    };
    let collected = match timeout {
        Some(limit) => tokio_timeout(limit, collect).await,
        None => Ok(collect.await),
    };

    let duration = start.elapsed();

    match collected {
        Ok((Ok(status), stdout, stderr)) => {
            let exit_code = status.code().unwrap_or(-1);

            debug!(
                exit_code,
                ?duration,
                stdout_len = stdout.len(),
                stderr_len = stderr.len(),
                "CLI command completed"
            );

            Ok(CliOutput {
                stdout,
                stderr,
                exit_code,
                duration,
            })
        }
        Ok((Err(e), _, _)) => Err(RunnerError::internal(format!(
            "Failed to wait for CLI process: {e}"
        ))),
        Err(_) => {
            warn!(?timeout, "CLI command timed out, killing process");
            if let Err(e) = child.kill().await {
                debug!(error = %e, "CLI process already exited before kill");
            }
            stdout_task.abort();
            stderr_task.abort();
            Err(RunnerError::timeout(duration))
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::types::ErrorKind;

    fn sh(script: &str) -> Command {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", script]);
        cmd
    }

    #[tokio::test]
    async fn test_captures_stdout_stderr_and_exit_code() {
        let mut cmd = sh("echo out; echo err >&2; exit 3");
        let output = run_cli_command(&mut cmd, None, None, 0).await.unwrap();
        assert_eq!(output.exit_code, 3);
        assert_eq!(output.stdout_text(), "out");
        assert_eq!(output.stderr_text(), "err");
    }

    #[tokio::test]
    async fn test_prompt_is_delivered_on_stdin() {
        let mut cmd = sh("cat");
        let output = run_cli_command(&mut cmd, Some("USER: hi\nASSISTANT: a b"), None, 0)
            .await
            .unwrap();
        assert_eq!(output.exit_code, 0);
        assert_eq!(output.stdout_text(), "USER: hi\nASSISTANT: a b");
    }

    #[tokio::test]
    async fn test_child_ignoring_stdin_still_completes() {
        let mut cmd = sh("echo done");
        let big = "x".repeat(1024 * 1024);
        let output = run_cli_command(&mut cmd, Some(&big), None, 0).await.unwrap();
        assert_eq!(output.stdout_text(), "done");
    }

    #[tokio::test]
    async fn test_timeout_kills_process() {
        let mut cmd = sh("sleep 5; echo late");
        let err = run_cli_command(&mut cmd, None, Some(Duration::from_millis(200)), 0)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Timeout);
    }

    #[tokio::test]
    async fn test_timeout_covers_pipes_held_by_background_process() {
        let mut cmd = sh("(sleep 5; echo late) & exit 0");
        let start = Instant::now();
        let err = run_cli_command(&mut cmd, None, Some(Duration::from_millis(300)), 0)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Timeout);
        assert!(start.elapsed() < Duration::from_secs(3));
    }

    #[tokio::test]
    async fn test_read_capped_reports_only_kept_bytes() {
        let data: &[u8] = &[7u8; 20_000];
        let buf = read_capped(Some(data), 100, "stdout").await;
        assert_eq!(buf, vec![7u8; 100]);
    }

    #[tokio::test]
    async fn test_output_is_capped() {
        let mut cmd = sh("head -c 100000 /dev/zero");
        let output = run_cli_command(&mut cmd, None, None, 1024).await.unwrap();
        assert_eq!(output.stdout.len(), 1024);
    }

    #[tokio::test]
    async fn test_spawn_failure_is_internal_error() {
        let mut cmd = Command::new("/nonexistent/codex-binary");
        let err = run_cli_command(&mut cmd, None, None, 0).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Internal);
    }

    #[test]
    fn test_command_from_empty_args_fails() {
        assert!(command_from_args(&[]).is_err());
    }
}
