// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Scan result sinks
//!
//! A scan writes one JSON section and any binary artifacts into a
//! [`ResultSink`]. Storage beyond that is up to the caller.

use serde_json::{Map, Value};

use crate::error::Result;

/// Destination for scan results
pub trait ResultSink {
    /// Set a top-level section of the result document
    fn set_section(&mut self, key: &str, value: Value) -> Result<()>;

    /// Attach a named binary artifact
    ///
    /// `name` is stored as given; the media type travels alongside it.
    fn add_file(&mut self, name: &str, mime_type: Option<&str>, bytes: &[u8]) -> Result<()>;
}

/// Artifact held by [`MemoryResult`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub name: String,
    pub mime_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// In-memory result document
#[derive(Debug, Clone, Default)]
pub struct MemoryResult {
    sections: Map<String, Value>,
    files: Vec<StoredFile>,
}

impl MemoryResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Section by key
    pub fn section(&self, key: &str) -> Option<&Value> {
        self.sections.get(key)
    }

    /// Artifact bytes by name
    pub fn file(&self, name: &str) -> Option<&[u8]> {
        self.files
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.bytes.as_slice())
    }

    /// All artifacts in insertion order
    pub fn files(&self) -> &[StoredFile] {
        &self.files
    }

    /// Whole result document
    pub fn to_json(&self) -> Value {
        Value::Object(self.sections.clone())
    }
}

impl ResultSink for MemoryResult {
    fn set_section(&mut self, key: &str, value: Value) -> Result<()> {
        self.sections.insert(key.to_string(), value);
        Ok(())
    }

    fn add_file(&mut self, name: &str, mime_type: Option<&str>, bytes: &[u8]) -> Result<()> {
        self.files.retain(|f| f.name != name);
        self.files.push(StoredFile {
            name: name.to_string(),
            mime_type: mime_type.map(str::to_string),
            bytes: bytes.to_vec(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_memory_result_replaces_files() {
        let mut result = MemoryResult::new();
        result.add_file("a", Some("image/png"), b"one").unwrap();
        result.add_file("a", Some("image/png"), b"two").unwrap();

        assert_eq!(result.files().len(), 1);
        assert_eq!(result.file("a"), Some(&b"two"[..]));
        assert_eq!(result.file("b"), None);
    }

    #[test]
    fn test_memory_result_sections() {
        let mut result = MemoryResult::new();
        result.set_section("fingerprinting", json!({"canvas": {}})).unwrap();
        assert_eq!(result.to_json(), json!({"fingerprinting": {"canvas": {}}}));
    }

    #[test]
    fn test_artifact_keeps_bare_name_and_mime_type() {
        let mut result = MemoryResult::new();
        result
            .add_file("fingerprinting_canvas", Some("image/png"), b"img")
            .unwrap();
        result.add_file("raw", None, b"bytes").unwrap();

        assert_eq!(
            result.files(),
            &[
                StoredFile {
                    name: "fingerprinting_canvas".to_string(),
                    mime_type: Some("image/png".to_string()),
                    bytes: b"img".to_vec(),
                },
                StoredFile {
                    name: "raw".to_string(),
                    mime_type: None,
                    bytes: b"bytes".to_vec(),
                },
            ]
        );
        assert_eq!(result.file("fingerprinting_canvas"), Some(&b"img"[..]));
    }
}
