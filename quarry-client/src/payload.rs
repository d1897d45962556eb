//! Result payloads
//!
//! The result endpoints answer with JSON whose schema depends on the operation,
//! so the client hands back the raw body and lets the caller pick the type.

use serde::de::DeserializeOwned;

use crate::error::{ClientError, Result};
use quarry_core::domain::job::JobId;

/// Raw body fetched from a result endpoint for a completed job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobPayload {
    job_id: JobId,
    body: String,
}

impl JobPayload {
    pub fn new(job_id: JobId, body: impl Into<String>) -> Self {
        Self {
            job_id,
            body: body.into(),
        }
    }

    pub fn job_id(&self) -> &JobId {
        &self.job_id
    }

    pub fn text(&self) -> &str {
        &self.body
    }

    pub fn into_text(self) -> String {
        self.body
    }

    /// Decode the body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.body).map_err(|e| {
            ClientError::Parse(format!(
                "Failed to decode result of job {}: {}",
                self.job_id, e
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn test_json_payload() {
        let payload = JobPayload::new(JobId::from("abc123"), r#"{"ok":true}"#);
        let value: Value = payload.json().unwrap();
        assert_eq!(value["ok"], true);
        assert_eq!(payload.job_id().as_str(), "abc123");
    }

    #[test]
    fn test_invalid_json_is_a_parse_error() {
        let payload = JobPayload::new(JobId::from("abc123"), "not json");
        let err = payload.json::<Value>().unwrap_err();
        assert!(matches!(err, ClientError::Parse(msg) if msg.contains("abc123")));
    }
}
