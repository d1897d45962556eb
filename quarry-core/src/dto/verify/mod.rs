//! Verify DTOs

use serde::{Deserialize, Serialize};

use super::SourceFile;

/// Body posted to `verify-async`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyRequest {
    /// Address of the deployed contract
    pub address: String,
    /// Network the contract was deployed to (e.g. "devnet", "testnet")
    pub network: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub files: Vec<SourceFile>,
}

/// Payload returned by `verify-result`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyResult {
    pub status: String,
    #[serde(default)]
    pub message: String,
}

impl VerifyResult {
    /// Whether the service accepted the sources as matching the deployment
    pub fn is_verified(&self) -> bool {
        let status = self.status.to_ascii_lowercase();
        status.starts_with("success") || status.starts_with("verified")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verified_statuses() {
        let ok: VerifyResult =
            serde_json::from_str(r#"{"status":"Success","message":"bytecode matches"}"#).unwrap();
        assert!(ok.is_verified());

        let mismatch: VerifyResult = serde_json::from_str(r#"{"status":"Mismatch"}"#).unwrap();
        assert!(!mismatch.is_verified());
        assert_eq!(mismatch.message, "");
    }
}
