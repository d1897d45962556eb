//! Configuration module
//!
//! Handles CLI configuration: the service URL and the poll policy.

use anyhow::{Context, Result};
use quarry_client::{PollPolicy, ServiceClient};
use std::time::Duration;

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// URL of the compilation service
    pub service_url: String,

    /// How jobs are polled
    pub poll_policy: PollPolicy,
}

impl Config {
    /// Build a configuration from raw CLI values
    ///
    /// A `max_wait_secs` of 0 disables the wait ceiling.
    pub fn new(service_url: String, poll_interval_ms: u64, max_wait_secs: u64) -> Self {
        let max_wait = (max_wait_secs > 0).then(|| Duration::from_secs(max_wait_secs));

        Self {
            service_url,
            poll_policy: PollPolicy::default()
                .with_interval(Duration::from_millis(poll_interval_ms))
                .with_max_wait(max_wait),
        }
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        if self.service_url.is_empty() {
            anyhow::bail!("service_url cannot be empty");
        }

        if !self.service_url.starts_with("http://") && !self.service_url.starts_with("https://") {
            anyhow::bail!("service_url must start with http:// or https://");
        }

        self.poll_policy
            .validate()
            .context("Invalid poll settings")?;

        Ok(())
    }

    /// Client configured with this service URL and poll policy
    pub fn client(&self) -> ServiceClient {
        ServiceClient::new(&self.service_url).with_poll_policy(self.poll_policy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = Config::new("http://localhost:3000".to_string(), 1000, 600);
        assert_eq!(config.poll_policy.interval, Duration::from_millis(1000));
        assert_eq!(config.poll_policy.max_wait, Some(Duration::from_secs(600)));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_max_wait_is_unbounded() {
        let config = Config::new("http://localhost:3000".to_string(), 1000, 0);
        assert_eq!(config.poll_policy.max_wait, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let config = Config::new("not-a-url".to_string(), 1000, 600);
        assert!(config.validate().is_err());

        let config = Config::new(String::new(), 1000, 600);
        assert!(config.validate().is_err());

        let config = Config::new("https://compiler.example".to_string(), 0, 600);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_client_uses_policy() {
        let config = Config::new("http://localhost:3000/".to_string(), 250, 60);
        let client = config.client();
        assert_eq!(client.base_url(), "http://localhost:3000");
        assert_eq!(client.poll_policy().interval, Duration::from_millis(250));
    }
}
