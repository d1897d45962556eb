//! Error types for the Quarry client

use std::time::Duration;
use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur when using the Quarry client
#[derive(Debug, Error)]
pub enum ClientError {
    /// The HTTP request could not be completed
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// A status poll returned a non-success status code
    #[error("Status poll for job {job_id} failed (status {status}): {status_text}")]
    Poll {
        job_id: String,
        status: u16,
        status_text: String,
    },

    /// The service reported that the job failed
    #[error("Job {job_id} failed: {message}")]
    JobFailed {
        job_id: String,
        /// Full status text, as returned by the service
        message: String,
    },

    /// A result or metadata endpoint returned a non-success status code
    #[error("API error (status {status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Error message from the API
        message: String,
    },

    /// Failed to parse response
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// The wait was cancelled by the caller
    #[error("Waiting for job {job_id} was cancelled")]
    Cancelled { job_id: String },

    /// The job did not finish within the configured wait
    #[error("Job {job_id} did not finish within {elapsed:?}")]
    TimedOut { job_id: String, elapsed: Duration },

    /// The job did not finish within the configured number of polls
    #[error("Job {job_id} did not finish after {polls} status polls")]
    TooManyPolls { job_id: String, polls: u32 },

    /// Invalid client configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ClientError {
    /// Create an API error from status code and message
    pub fn api_error(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// The job id this error refers to, if any
    pub fn job_id(&self) -> Option<&str> {
        match self {
            Self::Poll { job_id, .. }
            | Self::JobFailed { job_id, .. }
            | Self::Cancelled { job_id }
            | Self::TimedOut { job_id, .. }
            | Self::TooManyPolls { job_id, .. } => Some(job_id),
            _ => None,
        }
    }

    /// Check if the remote service rejected the job itself
    pub fn is_job_failure(&self) -> bool {
        matches!(self, Self::JobFailed { .. })
    }

    /// Check if this error is worth retrying with a fresh submission
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_connect() || e.is_timeout(),
            Self::Poll { status, .. } | Self::Api { status, .. } => *status >= 500,
            Self::TimedOut { .. } => true,
            _ => false,
        }
    }
}
