//! Compile and verify operations

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::ServiceClient;
use crate::error::{ClientError, Result};
use quarry_core::domain::job::JobId;
use quarry_core::dto::compile::{CompileRequest, CompileResult};
use quarry_core::dto::verify::{VerifyRequest, VerifyResult};
use quarry_core::endpoints::{COMPILE_ASYNC, COMPILE_RESULT, VERIFY_ASYNC, VERIFY_RESULT};

impl ServiceClient {
    // =============================================================================
    // Compilation
    // =============================================================================

    /// Submit a compilation job without waiting for it
    pub async fn submit_compile(&self, req: &CompileRequest) -> Result<JobId> {
        self.submit_json(COMPILE_ASYNC, req).await
    }

    /// Compile a set of sources
    ///
    /// # Arguments
    /// * `req` - Sources and compiler version
    /// * `cancel` - Token that aborts the wait
    ///
    /// # Returns
    /// The artifacts produced by the compiler. A compiler failure surfaces as
    /// [`ClientError::JobFailed`] carrying the compiler output.
    ///
    /// # Example
    /// ```no_run
    /// # use quarry_client::ServiceClient;
    /// # use quarry_core::dto::SourceFile;
    /// # use quarry_core::dto::compile::CompileRequest;
    /// # use tokio_util::sync::CancellationToken;
    /// # async fn example() -> quarry_client::Result<()> {
    /// let client = ServiceClient::new("http://localhost:3000");
    /// let result = client.compile(&CompileRequest {
    ///     version: Some("0.5.1".to_string()),
    ///     files: vec![SourceFile::new("src/lib.rs", "// contract")],
    /// }, &CancellationToken::new()).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn compile(
        &self,
        req: &CompileRequest,
        cancel: &CancellationToken,
    ) -> Result<CompileResult> {
        let job_id = self.submit_compile(req).await?;
        let payload = self
            .await_result_with_cancel(&job_id, COMPILE_RESULT, cancel)
            .await?;

        let result: CompileResult = payload.json()?;
        info!(job_id = %job_id, artifacts = result.artifacts.len(), "Compilation finished");

        Ok(result)
    }

    // =============================================================================
    // Verification
    // =============================================================================

    /// Submit a verification job without waiting for it
    pub async fn submit_verify(&self, req: &VerifyRequest) -> Result<JobId> {
        self.submit_json(VERIFY_ASYNC, req).await
    }

    /// Verify deployed bytecode against a set of sources
    ///
    /// # Arguments
    /// * `req` - Deployment address, network and sources
    /// * `cancel` - Token that aborts the wait
    pub async fn verify(
        &self,
        req: &VerifyRequest,
        cancel: &CancellationToken,
    ) -> Result<VerifyResult> {
        let job_id = self.submit_verify(req).await?;
        let payload = self
            .await_result_with_cancel(&job_id, VERIFY_RESULT, cancel)
            .await?;

        let result: VerifyResult = payload.json()?;
        info!(job_id = %job_id, status = %result.status, "Verification finished");

        Ok(result)
    }

    async fn submit_json<T: Serialize>(&self, endpoint: &str, req: &T) -> Result<JobId> {
        let body = serde_json::to_value(req)
            .map_err(|e| ClientError::Parse(format!("Failed to encode request: {}", e)))?;

        self.submit_job(endpoint, Some(&body)).await
    }
}
