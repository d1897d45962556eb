//! Compile DTOs

use serde::{Deserialize, Serialize};

use super::SourceFile;

/// Body posted to `compile-async`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompileRequest {
    /// Compiler version, `None` lets the service pick its default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub files: Vec<SourceFile>,
}

/// Payload returned by `compile-result`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompileResult {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub artifacts: Vec<Artifact>,
}

/// A named output of the compiler (bytecode, ABI, ...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    pub name: String,
    pub content: String,
    /// Free-form type tag chosen by the service (e.g. "abi", "bytecode")
    #[serde(rename = "type")]
    pub artifact_type: String,
}

impl CompileResult {
    /// Find an artifact by name
    pub fn artifact(&self, name: &str) -> Option<&Artifact> {
        self.artifacts.iter().find(|a| a.name == name)
    }

    /// All artifacts carrying the given type tag
    pub fn artifacts_of_type<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a Artifact> {
        self.artifacts
            .iter()
            .filter(move |a| a.artifact_type.eq_ignore_ascii_case(tag))
    }
}
