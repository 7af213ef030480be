// ABOUTME: Binary discovery tests that set `CODEX_BINARY` in their own process
// ABOUTME: Kept out of the unit tests so the env mutation cannot race other tests
//
// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 dravr.ai

#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;

use codex_gateway::discover_codex;
use codex_gateway::types::ErrorKind;

#[test]
fn codex_binary_env_var_selects_the_binary() {
    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("my-codex");
    fs::write(&script, "#!/bin/sh\nexit 0\n").unwrap();
    fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();

    std::env::set_var("CODEX_BINARY", &script);
    let resolved = discover_codex().unwrap();
    assert_eq!(
        fs::canonicalize(resolved).unwrap(),
        fs::canonicalize(&script).unwrap()
    );

    std::env::set_var("CODEX_BINARY", dir.path().join("missing-codex"));
    let err = discover_codex().unwrap_err();
    assert_eq!(err.kind, ErrorKind::BinaryNotFound);
    assert!(err.message.contains("missing-codex"));

    std::env::remove_var("CODEX_BINARY");
}
