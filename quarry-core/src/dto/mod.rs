//! Data Transfer Objects for the compilation service
//!
//! Request bodies posted to the `*-async` endpoints and the JSON payloads
//! returned by the matching `*-result` endpoints.

pub mod compile;
pub mod verify;

use serde::{Deserialize, Serialize};

/// A single source file sent along with a compile or verify request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFile {
    /// Path relative to the project root, using `/` separators
    pub path: String,
    pub content: String,
}

impl SourceFile {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}
