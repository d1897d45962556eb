//! Service metadata endpoints

use crate::ServiceClient;
use crate::error::Result;
use quarry_core::endpoints::{ALLOWED_VERSIONS, SERVICE_VERSION};

impl ServiceClient {
    /// List the compiler versions the service accepts
    pub async fn allowed_versions(&self) -> Result<Vec<String>> {
        let url = self.url(ALLOWED_VERSIONS, None)?;
        let response = self.client.get(url).send().await?;

        self.handle_response(response).await
    }

    /// Get the version string of the service
    pub async fn service_version(&self) -> Result<String> {
        let url = self.url(SERVICE_VERSION, None)?;
        let response = self.client.get(url).send().await?;

        let version = self.handle_text_response(response).await?;
        Ok(version.trim().to_string())
    }
}
