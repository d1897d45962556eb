//! Job domain types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Tag character marking a completed job
pub const COMPLETED_TAG: char = 'C';

/// Tag character marking a failed job
pub const ERRORED_TAG: char = 'E';

/// Opaque job handle returned by the service on submission
///
/// The service is trusted to hand out unique identifiers, so no validation of
/// the shape is performed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for JobId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for JobId {
    fn from(s: String) -> Self {
        JobId(s)
    }
}

impl From<&str> for JobId {
    fn from(s: &str) -> Self {
        JobId(s.to_string())
    }
}

/// Status of a job as reported by the `process_status` endpoint
///
/// The first character of the status text decides the state; the full text is
/// kept because the service puts its diagnostics there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    /// Terminal success, the result can be fetched
    Completed(String),
    /// Terminal failure, the text carries the diagnostic message
    Errored(String),
    /// Anything else, including an empty body
    InProgress(String),
}

impl JobStatus {
    /// Classify a raw status string by its first character
    pub fn parse(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        match raw.chars().next() {
            Some(COMPLETED_TAG) => JobStatus::Completed(raw),
            Some(ERRORED_TAG) => JobStatus::Errored(raw),
            _ => JobStatus::InProgress(raw),
        }
    }

    /// The status text exactly as the service returned it
    pub fn raw(&self) -> &str {
        match self {
            JobStatus::Completed(raw) | JobStatus::Errored(raw) | JobStatus::InProgress(raw) => {
                raw
            }
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobStatus::InProgress(_))
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, JobStatus::Completed(_))
    }

    pub fn is_errored(&self) -> bool {
        matches!(self, JobStatus::Errored(_))
    }

    /// Short label for display
    pub fn label(&self) -> &'static str {
        match self {
            JobStatus::Completed(_) => "Completed",
            JobStatus::Errored(_) => "Errored",
            JobStatus::InProgress(_) => "InProgress",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_tags() {
        assert!(JobStatus::parse("Completed").is_completed());
        assert!(JobStatus::parse("Errored: bad input").is_errored());
        assert!(JobStatus::parse("Error: bad input").is_errored());
        assert_eq!(
            JobStatus::parse("Running"),
            JobStatus::InProgress("Running".to_string())
        );
    }

    #[test]
    fn test_status_tag_is_case_sensitive() {
        assert!(!JobStatus::parse("completed").is_terminal());
        assert!(!JobStatus::parse("error").is_terminal());
    }

    #[test]
    fn test_empty_status_is_in_progress() {
        let status = JobStatus::parse("");
        assert!(!status.is_terminal());
        assert_eq!(status.raw(), "");
    }

    #[test]
    fn test_status_keeps_raw_text() {
        let status = JobStatus::parse("Errored: line 3: unexpected token");
        assert_eq!(status.raw(), "Errored: line 3: unexpected token");
        assert_eq!(status.to_string(), "Errored");
    }

    #[test]
    fn test_job_id_is_transparent() {
        let id = JobId::from("abc123");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"abc123\"");
        assert_eq!(id.to_string(), "abc123");
    }
}
