//! Quarry HTTP Client
//!
//! A small, type-safe client for the asynchronous compilation and verification
//! service.
//!
//! The service never answers a compile or verify request directly. Instead it
//! hands out a job id, which is polled on `process_status` until it reports a
//! terminal state, after which the result is fetched from a per-operation
//! endpoint. This crate hides that sequence behind [`ServiceClient::submit_job`]
//! and [`ServiceClient::await_result`], plus typed helpers for compile and verify.
//!
//! # Example
//!
//! ```no_run
//! use quarry_client::ServiceClient;
//! use quarry_core::dto::SourceFile;
//! use quarry_core::dto::compile::CompileRequest;
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> quarry_client::Result<()> {
//!     let client = ServiceClient::new("http://localhost:3000");
//!
//!     let result = client
//!         .compile(
//!             &CompileRequest {
//!                 version: None,
//!                 files: vec![SourceFile::new("src/lib.rs", "// contract")],
//!             },
//!             &CancellationToken::new(),
//!         )
//!         .await?;
//!
//!     println!("Compiled {} artifact(s)", result.artifacts.len());
//!     Ok(())
//! }
//! ```

pub mod error;
mod jobs;
mod meta;
mod operations;
pub mod payload;
pub mod policy;

// Re-export commonly used types
pub use error::{ClientError, Result};
pub use payload::JobPayload;
pub use policy::PollPolicy;
pub use quarry_core::domain::job::{JobId, JobStatus};

use reqwest::{Client, Url};

/// HTTP client for the compilation service
///
/// Cheap to clone: clones share the underlying connection pool. Every awaited
/// job runs its own sequential poll loop, so one client can drive any number of
/// concurrent jobs.
#[derive(Debug, Clone)]
pub struct ServiceClient {
    /// Base URL of the service (e.g., "http://localhost:3000")
    base_url: String,
    /// HTTP client instance
    client: Client,
    /// Polling parameters used by `await_result`
    policy: PollPolicy,
}

impl ServiceClient {
    /// Create a new service client with the default poll policy
    ///
    /// # Example
    /// ```
    /// use quarry_client::ServiceClient;
    ///
    /// let client = ServiceClient::new("http://localhost:3000");
    /// ```
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Create a new service client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    ///
    /// # Example
    /// ```
    /// use quarry_client::ServiceClient;
    /// use reqwest::{Client, Url};
    /// use std::time::Duration;
    ///
    /// let http_client = Client::builder()
    ///     .timeout(Duration::from_secs(30))
    ///     .build()
    ///     .unwrap();
    ///
    /// let client = ServiceClient::with_client("http://localhost:3000", http_client);
    /// ```
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            policy: PollPolicy::default(),
        }
    }

    /// Replace the poll policy
    pub fn with_poll_policy(mut self, policy: PollPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Get the base URL of the service
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get the poll policy applied by `wait_process` and `await_result`
    pub fn poll_policy(&self) -> &PollPolicy {
        &self.policy
    }

    /// Build `<base_url>/<endpoint>[/<job_id>]`
    ///
    /// The endpoint may span several path segments. The job id is always a
    /// single percent-encoded segment, so ids containing `/`, `?` or `#`
    /// address exactly that job.
    fn url(&self, endpoint: &str, job_id: Option<&JobId>) -> Result<Url> {
        let mut url = Url::parse(&self.base_url).map_err(|e| {
            ClientError::InvalidConfig(format!("Invalid base URL '{}': {}", self.base_url, e))
        })?;

        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                ClientError::InvalidConfig(format!(
                    "Base URL '{}' cannot carry a path",
                    self.base_url
                ))
            })?;
            segments
                .pop_if_empty()
                .extend(endpoint.split('/').filter(|segment| !segment.is_empty()));
            if let Some(job_id) = job_id {
                segments.push(job_id.as_str());
            }
        }

        Ok(url)
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Handle an API response and return its body as text
    ///
    /// This method checks the status code and returns an appropriate error if
    /// the request failed.
    async fn handle_text_response(&self, response: reqwest::Response) -> Result<String> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        Ok(response.text().await?)
    }

    /// Handle an API response and deserialize JSON
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T> {
        let body = self.handle_text_response(response).await?;

        serde_json::from_str(&body)
            .map_err(|e| ClientError::Parse(format!("Failed to parse JSON response: {}", e)))
    }
}
