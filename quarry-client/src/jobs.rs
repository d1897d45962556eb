//! Job protocol: submit, poll, fetch

use std::future;

use serde_json::Value as JsonValue;
use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::ServiceClient;
use crate::error::{ClientError, Result};
use crate::payload::JobPayload;
use quarry_core::domain::job::{JobId, JobStatus};
use quarry_core::endpoints::PROCESS_STATUS;

impl ServiceClient {
    // =============================================================================
    // Submission
    // =============================================================================

    /// Submit a job to the service
    ///
    /// Sends a POST with the JSON payload when one is given, a GET otherwise.
    /// The response body is the job id. The HTTP status of the submission is
    /// not inspected, only the transport can fail here.
    ///
    /// # Arguments
    /// * `endpoint` - Logical endpoint name (e.g. "compile-async")
    /// * `payload` - Optional JSON body
    ///
    /// # Returns
    /// The id handed out by the service
    pub async fn submit_job(&self, endpoint: &str, payload: Option<&JsonValue>) -> Result<JobId> {
        let url = self.url(endpoint, None)?;
        let request = match payload {
            Some(body) => self.client.post(url).json(body),
            None => self.client.get(url),
        };

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!(endpoint, status = status.as_u16(), "Submission returned a non-success status");
        }

        let job_id = JobId::new(response.text().await?);
        info!(endpoint, job_id = %job_id, "Submitted job");

        Ok(job_id)
    }

    // =============================================================================
    // Polling
    // =============================================================================

    /// Probe the status of a job once
    ///
    /// # Arguments
    /// * `job_id` - The job to probe
    ///
    /// # Returns
    /// The classified status
    pub async fn job_status(&self, job_id: &JobId) -> Result<JobStatus> {
        let url = self.url(PROCESS_STATUS, Some(job_id))?;
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Poll {
                job_id: job_id.to_string(),
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        Ok(JobStatus::parse(response.text().await?))
    }

    /// Poll a job until it reaches a terminal state
    ///
    /// The poll interval is applied before every re-poll. Cancellation is
    /// checked before each poll and aborts in-flight requests and pending
    /// delays. The policy's `max_wait` and `max_polls` bound the loop.
    ///
    /// # Returns
    /// The `Completed` status; an `Errored` status becomes
    /// [`ClientError::JobFailed`]
    pub async fn wait_process(
        &self,
        job_id: &JobId,
        cancel: &CancellationToken,
    ) -> Result<JobStatus> {
        let started = Instant::now();
        let deadline = self.policy.max_wait.map(|max_wait| started + max_wait);
        let mut polls: u32 = 0;

        let cancelled = || ClientError::Cancelled {
            job_id: job_id.to_string(),
        };
        let timed_out = || ClientError::TimedOut {
            job_id: job_id.to_string(),
            elapsed: started.elapsed(),
        };

        loop {
            if cancel.is_cancelled() {
                warn!(job_id = %job_id, polls, "Job wait cancelled");
                return Err(cancelled());
            }

            if self.policy.max_polls.is_some_and(|max_polls| polls >= max_polls) {
                return Err(ClientError::TooManyPolls {
                    job_id: job_id.to_string(),
                    polls,
                });
            }

            polls += 1;
            let status = tokio::select! {
                _ = cancel.cancelled() => {
                    warn!(job_id = %job_id, polls, "Job wait cancelled");
                    return Err(cancelled());
                }
                _ = wait_until(deadline) => return Err(timed_out()),
                status = self.job_status(job_id) => status?,
            };

            debug!(job_id = %job_id, poll = polls, status = status.raw(), "Polled job status");

            match status {
                JobStatus::Completed(_) => {
                    info!(
                        job_id = %job_id,
                        polls,
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "Job completed"
                    );
                    return Ok(status);
                }
                JobStatus::Errored(message) => {
                    warn!(job_id = %job_id, polls, "Job failed");
                    return Err(ClientError::JobFailed {
                        job_id: job_id.to_string(),
                        message,
                    });
                }
                JobStatus::InProgress(_) => {}
            }

            tokio::select! {
                _ = cancel.cancelled() => {
                    warn!(job_id = %job_id, polls, "Job wait cancelled");
                    return Err(cancelled());
                }
                _ = wait_until(deadline) => return Err(timed_out()),
                _ = time::sleep(self.policy.interval) => {}
            }
        }
    }

    // =============================================================================
    // Results
    // =============================================================================

    /// Fetch the result of a completed job
    ///
    /// # Arguments
    /// * `job_id` - The completed job
    /// * `result_endpoint` - Result endpoint prefix (e.g. "compile-result")
    pub async fn fetch_result(&self, job_id: &JobId, result_endpoint: &str) -> Result<JobPayload> {
        let url = self.url(result_endpoint, Some(job_id))?;
        let response = self.client.get(url).send().await?;

        let body = self.handle_text_response(response).await?;
        debug!(job_id = %job_id, bytes = body.len(), "Fetched job result");

        Ok(JobPayload::new(job_id.clone(), body))
    }

    /// Wait for a job to complete and fetch its result
    ///
    /// Equivalent to [`ServiceClient::await_result_with_cancel`] with a token
    /// that is never cancelled.
    pub async fn await_result(&self, job_id: &JobId, result_endpoint: &str) -> Result<JobPayload> {
        self.await_result_with_cancel(job_id, result_endpoint, &CancellationToken::new())
            .await
    }

    /// Wait for a job to complete and fetch its result, honouring `cancel`
    ///
    /// The result endpoint is never called for a job that errored.
    pub async fn await_result_with_cancel(
        &self,
        job_id: &JobId,
        result_endpoint: &str,
        cancel: &CancellationToken,
    ) -> Result<JobPayload> {
        self.wait_process(job_id, cancel).await?;

        tokio::select! {
            _ = cancel.cancelled() => Err(ClientError::Cancelled {
                job_id: job_id.to_string(),
            }),
            payload = self.fetch_result(job_id, result_endpoint) => payload,
        }
    }
}

/// Resolves at `deadline`, or never when there is none
async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => time::sleep_until(deadline).await,
        None => future::pending::<()>().await,
    }
}
