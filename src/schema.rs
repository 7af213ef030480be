// ABOUTME: Structured-output descriptors and the temp file that carries their JSON Schema
// ABOUTME: Writes `--output-schema` files into the per-call scratch directory
//
// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 dravr.ai

use std::fmt;
use std::io::Write;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use schemars::JsonSchema;
use serde_json::Value;
use tracing::debug;

use crate::types::RunnerError;

/// Something that can describe the desired response shape as JSON Schema
pub trait ResponseSchema: Send + Sync {
    /// Produce the JSON Schema document
    fn json_schema(&self) -> Result<Value, RunnerError>;
}

/// A literal schema document
impl ResponseSchema for Value {
    fn json_schema(&self) -> Result<Value, RunnerError> {
        if self.is_object() || self.is_boolean() {
            Ok(self.clone())
        } else {
            Err(RunnerError::schema(
                "JSON Schema must be an object or a boolean",
            ))
        }
    }
}

/// Schema derived from a Rust type via `schemars`
pub struct SchemaFor<T>(PhantomData<fn() -> T>);

impl<T: JsonSchema> SchemaFor<T> {
    /// Create a descriptor for `T`
    #[must_use]
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T: JsonSchema> Default for SchemaFor<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for SchemaFor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SchemaFor<{}>", std::any::type_name::<T>())
    }
}

impl<T: JsonSchema> ResponseSchema for SchemaFor<T> {
    fn json_schema(&self) -> Result<Value, RunnerError> {
        let schema = schemars::schema_for!(T);
        serde_json::to_value(&schema)
            .map_err(|e| RunnerError::schema(format!("Failed to serialize JSON Schema: {e}")))
    }
}

/// Serialize a descriptor's schema to a uniquely named file inside `dir`
///
/// The file outlives this call; the caller owns `dir` and removes it
/// together with everything else staged for the invocation.
pub fn write_schema_file(dir: &Path, model: &dyn ResponseSchema) -> Result<PathBuf, RunnerError> {
    let schema = model.json_schema()?;
    let bytes = serde_json::to_vec(&schema)
        .map_err(|e| RunnerError::schema(format!("Failed to serialize JSON Schema: {e}")))?;

    let mut file = tempfile::Builder::new()
        .prefix("output-schema-")
        .suffix(".json")
        .tempfile_in(dir)
        .map_err(|e| RunnerError::resource_io(format!("Failed to create schema file: {e}")))?;
    file.write_all(&bytes)
        .and_then(|()| file.flush())
        .map_err(|e| RunnerError::resource_io(format!("Failed to write schema file: {e}")))?;

    let (_, path) = file
        .keep()
        .map_err(|e| RunnerError::resource_io(format!("Failed to persist schema file: {e}")))?;

    debug!(path = %path.display(), schema_len = bytes.len(), "Wrote output schema file");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(JsonSchema)]
    #[allow(dead_code)]
    struct Verdict {
        approved: bool,
        reason: String,
    }

    struct Broken;

    impl ResponseSchema for Broken {
        fn json_schema(&self) -> Result<Value, RunnerError> {
            Err(RunnerError::schema("descriptor exploded"))
        }
    }

    #[test]
    fn test_write_schema_file_round_trips_document() {
        let dir = tempfile::tempdir().unwrap();
        let schema = json!({"type": "object", "properties": {"answer": {"type": "integer"}}});

        let path = write_schema_file(dir.path(), &schema).unwrap();

        assert!(path.starts_with(dir.path()));
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("json"));
        let written: Value = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(written, schema);
    }

    #[test]
    fn test_each_schema_file_is_unique() {
        let dir = tempfile::tempdir().unwrap();
        let schema = json!({"type": "string"});
        let first = write_schema_file(dir.path(), &schema).unwrap();
        let second = write_schema_file(dir.path(), &schema).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_descriptor_failure_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let err = write_schema_file(dir.path(), &Broken).unwrap_err();
        assert_eq!(err.kind, crate::types::ErrorKind::Schema);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_literal_schema_must_be_object() {
        let err = json!("not a schema").json_schema().unwrap_err();
        assert_eq!(err.kind, crate::types::ErrorKind::Schema);
    }

    #[test]
    fn test_schema_for_derives_properties() {
        let schema = SchemaFor::<Verdict>::new().json_schema().unwrap();
        let properties = schema.get("properties").unwrap();
        assert!(properties.get("approved").is_some());
        assert!(properties.get("reason").is_some());
    }
}
