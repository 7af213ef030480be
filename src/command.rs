// ABOUTME: Argument-vector assembly for `codex exec` invocations
// ABOUTME: Emits flags in the fixed order the Codex CLI expects, capture flag always last
//
// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 dravr.ai

use std::path::Path;

use crate::config::CodexConfig;
use crate::overrides::encode_overrides;

/// Non-interactive subcommand
const EXEC_SUBCOMMAND: &str = "exec";

/// Build the full argument vector, binary first
///
/// Order: binary, `exec`, `-m <model>`, `--cd`, `--skip-git-repo-check`,
/// `--sandbox`, `--full-auto`, `--dangerously-bypass-approvals-and-sandbox`,
/// `--add-dir` per directory, `-c` overrides, `--output-schema`,
/// `--output-last-message`.
#[must_use]
pub fn build_command_args(
    binary: &Path,
    config: &CodexConfig,
    schema_path: Option<&Path>,
    capture_path: &Path,
) -> Vec<String> {
    let mut args = vec![
        path_arg(binary),
        EXEC_SUBCOMMAND.to_owned(),
        "-m".to_owned(),
        config.model.clone(),
    ];

    if let Some(dir) = &config.working_directory {
        args.push("--cd".to_owned());
        args.push(path_arg(dir));
    }
    if config.skip_git_repo_check {
        args.push("--skip-git-repo-check".to_owned());
    }
    if let Some(mode) = &config.sandbox {
        args.push("--sandbox".to_owned());
        args.push(mode.as_str().to_owned());
    }
    if config.full_auto {
        args.push("--full-auto".to_owned());
    }
    if config.dangerously_bypass_approvals_and_sandbox {
        args.push("--dangerously-bypass-approvals-and-sandbox".to_owned());
    }
    for dir in &config.add_dirs {
        args.push("--add-dir".to_owned());
        args.push(path_arg(dir));
    }

    args.extend(encode_overrides(config.overrides.as_ref()));

    if let Some(schema) = schema_path {
        args.push("--output-schema".to_owned());
        args.push(path_arg(schema));
    }
    args.push("--output-last-message".to_owned());
    args.push(path_arg(capture_path));

    args
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SandboxMode;
    use crate::overrides::ConfigOverrides;
    use serde_json::json;

    const BIN: &str = "/usr/local/bin/codex";
    const OUT: &str = "/tmp/call/last-message.txt";

    #[test]
    fn test_minimal_invocation() {
        let config = CodexConfig::new()
            .with_model("gpt-5")
            .with_skip_git_repo_check(false);
        let args = build_command_args(Path::new(BIN), &config, None, Path::new(OUT));
        assert_eq!(
            args,
            vec![BIN, "exec", "-m", "gpt-5", "--output-last-message", OUT]
        );
    }

    #[test]
    fn test_default_config_skips_repo_check() {
        let args = build_command_args(Path::new(BIN), &CodexConfig::new(), None, Path::new(OUT));
        assert_eq!(
            args,
            vec![
                BIN,
                "exec",
                "-m",
                "gpt-5.2-codex",
                "--skip-git-repo-check",
                "--output-last-message",
                OUT
            ]
        );
    }

    #[test]
    fn test_every_flag_in_fixed_order() {
        let overrides = ConfigOverrides::from_value(json!({"a": 1, "b": "x"}))
            .unwrap()
            .unwrap();
        let config = CodexConfig::new()
            .with_model("o3")
            .with_working_directory("/repo")
            .with_sandbox(SandboxMode::WorkspaceWrite)
            .with_full_auto(true)
            .with_bypass_approvals_and_sandbox(true)
            .with_add_dir("/data")
            .with_add_dir("/cache")
            .with_overrides(overrides);

        let args = build_command_args(
            Path::new(BIN),
            &config,
            Some(Path::new("/tmp/call/schema.json")),
            Path::new(OUT),
        );

        assert_eq!(
            args,
            vec![
                BIN,
                "exec",
                "-m",
                "o3",
                "--cd",
                "/repo",
                "--skip-git-repo-check",
                "--sandbox",
                "workspace-write",
                "--full-auto",
                "--dangerously-bypass-approvals-and-sandbox",
                "--add-dir",
                "/data",
                "--add-dir",
                "/cache",
                "-c",
                "a=1",
                "-c",
                "b=\"x\"",
                "--output-schema",
                "/tmp/call/schema.json",
                "--output-last-message",
                OUT,
            ]
        );
    }

    #[test]
    fn test_raw_overrides_follow_add_dirs() {
        let config = CodexConfig::new()
            .with_skip_git_repo_check(false)
            .with_add_dir("/x")
            .with_overrides(ConfigOverrides::Raw(vec![
                "-c".to_owned(),
                "k=v".to_owned(),
            ]));
        let args = build_command_args(Path::new(BIN), &config, None, Path::new(OUT));
        assert_eq!(
            args,
            vec![
                BIN,
                "exec",
                "-m",
                "gpt-5.2-codex",
                "--add-dir",
                "/x",
                "-c",
                "k=v",
                "--output-last-message",
                OUT
            ]
        );
    }

    #[test]
    fn test_custom_sandbox_identifier_passes_through() {
        let config = CodexConfig::new()
            .with_skip_git_repo_check(false)
            .with_sandbox(SandboxMode::Other("future-mode".to_owned()));
        let args = build_command_args(Path::new(BIN), &config, None, Path::new(OUT));
        assert_eq!(&args[4..6], ["--sandbox", "future-mode"]);
    }

    #[test]
    fn test_capture_flag_is_always_last() {
        let config = CodexConfig::new().with_full_auto(true);
        let args = build_command_args(
            Path::new(BIN),
            &config,
            Some(Path::new("/s.json")),
            Path::new(OUT),
        );
        assert_eq!(&args[args.len() - 2..], ["--output-last-message", OUT]);
        assert_eq!(&args[args.len() - 4..args.len() - 2], ["--output-schema", "/s.json"]);
    }
}
