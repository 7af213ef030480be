// ABOUTME: Codex `-c key=value` override encoding from raw flag lists or ordered key/value maps
// ABOUTME: Later overrides win inside the CLI, so emission order follows insertion order
//
// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 dravr.ai

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::types::RunnerError;

/// Flag that introduces a single config override
const OVERRIDE_FLAG: &str = "-c";

/// Config overrides applied on top of the CLI's static `config.toml`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOverrides {
    /// Pre-formed argument list, passed through as-is
    Raw(Vec<String>),
    /// Ordered key/value pairs, each encoded as `-c key=<json>`
    Map(Map<String, Value>),
}

impl ConfigOverrides {
    /// Decode overrides from a loosely typed JSON value
    ///
    /// `null` means no overrides, an array keeps only its string entries,
    /// and an object becomes an ordered map. Any other shape is rejected.
    pub fn from_value(value: Value) -> Result<Option<Self>, RunnerError> {
        match value {
            Value::Null => Ok(None),
            Value::Array(items) => {
                let total = items.len();
                let raw: Vec<String> = items
                    .into_iter()
                    .filter_map(|item| match item {
                        Value::String(s) => Some(s),
                        _ => None,
                    })
                    .collect();
                if raw.len() != total {
                    debug!(
                        dropped = total - raw.len(),
                        "Dropped non-string entries from raw override list"
                    );
                }
                Ok(Some(Self::Raw(raw)))
            }
            Value::Object(map) => Ok(Some(Self::Map(map))),
            other => Err(RunnerError::config(format!(
                "Config overrides must be null, a list of strings, or a mapping; got {other}"
            ))),
        }
    }

    /// Create an empty ordered map of overrides
    #[must_use]
    pub fn map() -> Self {
        Self::Map(Map::new())
    }

    /// Append a key/value override, serializing the value to JSON
    ///
    /// Values that cannot be represented as JSON are a configuration error.
    /// Calling this on a `Raw` list converts the pair into raw flags.
    pub fn with(
        mut self,
        key: impl Into<String>,
        value: impl Serialize,
    ) -> Result<Self, RunnerError> {
        let key = key.into();
        let value = serde_json::to_value(value).map_err(|e| {
            RunnerError::config(format!("Config override '{key}' is not serializable: {e}"))
        })?;
        match &mut self {
            Self::Map(map) => {
                map.insert(key, value);
            }
            Self::Raw(raw) => {
                if !value.is_null() {
                    raw.push(OVERRIDE_FLAG.to_owned());
                    raw.push(format!("{key}={value}"));
                }
            }
        }
        Ok(self)
    }
}

/// Encode optional overrides into command-line arguments
#[must_use]
pub fn encode_overrides(overrides: Option<&ConfigOverrides>) -> Vec<String> {
    match overrides {
        None => Vec::new(),
        Some(ConfigOverrides::Raw(raw)) => raw.clone(),
        Some(ConfigOverrides::Map(map)) => encode_map(map),
    }
}

fn encode_map(map: &Map<String, Value>) -> Vec<String> {
    let mut args = Vec::with_capacity(map.len() * 2);
    for (key, value) in map {
        if value.is_null() {
            continue;
        }
        // The CLI parses values as TOML; JSON literals are a compatible subset
        args.push(OVERRIDE_FLAG.to_owned());
        args.push(format!("{key}={value}"));
    }
    args
}
