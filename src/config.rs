//! Configuration types for acquisition pipeline sessions

use crate::error::StreetshotError;
use crate::provider::http::{validate_base_url, DEFAULT_REQUEST_TIMEOUT};
use crate::query::SizeVariant;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for an acquisition pipeline session.
///
/// A usable configuration needs at least `base_url` and `api_key`; everything
/// else carries a working default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Base URL of the provider API, e.g. `https://imagery.example.com/v1`
    pub base_url: String,

    /// API key sent on every provider request
    pub api_key: String,

    /// Per-request timeout
    pub request_timeout: Duration,

    /// Size variant fetched when a download call does not name one
    pub size_variant: SizeVariant,

    /// Optional endpoint pinged once per fully processed image
    pub completion_url: Option<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_key: String::new(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            size_variant: SizeVariant::default(), // Default: small (640x480)
            completion_url: None,
        }
    }
}

impl PipelineConfig {
    /// Create a new configuration builder for fluent API construction
    ///
    /// # Examples
    ///
    /// ```rust
    /// use streetshot::PipelineConfig;
    ///
    /// let config = PipelineConfig::builder()
    ///     .base_url("https://imagery.example.com/v1")
    ///     .api_key("secret")
    ///     .build()
    ///     .unwrap();
    /// ```
    #[must_use]
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    /// Validate all configuration parameters
    ///
    /// # Errors
    /// - Empty or non-HTTP base URL
    /// - Empty API key
    /// - Zero request timeout
    /// - Invalid completion endpoint URL
    pub fn validate(&self) -> crate::Result<()> {
        validate_base_url(&self.base_url)?;

        if self.api_key.trim().is_empty() {
            return Err(StreetshotError::invalid_config(
                "API key must not be empty",
            ));
        }

        if self.request_timeout.is_zero() {
            return Err(StreetshotError::invalid_config(
                "Request timeout must be greater than zero",
            ));
        }

        if let Some(ref url) = self.completion_url {
            validate_base_url(url)?;
        }

        Ok(())
    }
}

/// Builder for `PipelineConfig`
#[derive(Debug, Default)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    /// Set the provider API base URL
    #[must_use]
    pub fn base_url<S: Into<String>>(mut self, url: S) -> Self {
        self.config.base_url = url.into();
        self
    }

    /// Set the provider API key
    #[must_use]
    pub fn api_key<S: Into<String>>(mut self, key: S) -> Self {
        self.config.api_key = key.into();
        self
    }

    /// Set the per-request timeout
    #[must_use]
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    /// Set the per-request timeout in whole seconds (convenience method)
    #[must_use]
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout = Duration::from_secs(secs);
        self
    }

    /// Set the default download size variant
    #[must_use]
    pub fn size_variant(mut self, variant: SizeVariant) -> Self {
        self.config.size_variant = variant;
        self
    }

    /// Set the completion endpoint pinged once per processed image
    #[must_use]
    pub fn completion_url<S: Into<String>>(mut self, url: S) -> Self {
        self.config.completion_url = Some(url.into());
        self
    }

    /// Build and validate the configuration
    ///
    /// # Errors
    /// Returns `StreetshotError::Config` when any parameter fails the checks
    /// in [`PipelineConfig::validate`].
    pub fn build(self) -> crate::Result<PipelineConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_minimal_configuration() {
        let config = PipelineConfig::builder()
            .base_url("https://imagery.example.com/v1")
            .api_key("secret")
            .build()
            .unwrap();

        assert_eq!(config.base_url, "https://imagery.example.com/v1");
        assert_eq!(config.size_variant, SizeVariant::Small);
        assert_eq!(config.request_timeout, DEFAULT_REQUEST_TIMEOUT);
        assert!(config.completion_url.is_none());
    }

    #[test]
    fn test_builder_chain() {
        let config = PipelineConfig::builder()
            .base_url("https://imagery.example.com/v1")
            .api_key("secret")
            .timeout_secs(5)
            .size_variant(SizeVariant::Large)
            .completion_url("https://tracker.example.com/complete")
            .build()
            .unwrap();

        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.size_variant, SizeVariant::Large);
        assert_eq!(
            config.completion_url.as_deref(),
            Some("https://tracker.example.com/complete")
        );
    }

    #[test]
    fn test_missing_required_fields_rejected() {
        let missing_url = PipelineConfig::builder().api_key("secret").build();
        assert!(matches!(missing_url, Err(StreetshotError::Config(_))));

        let missing_key = PipelineConfig::builder()
            .base_url("https://imagery.example.com/v1")
            .build();
        assert!(matches!(missing_key, Err(StreetshotError::Config(_))));

        let blank_key = PipelineConfig::builder()
            .base_url("https://imagery.example.com/v1")
            .api_key("   ")
            .build();
        assert!(matches!(blank_key, Err(StreetshotError::Config(_))));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let config = PipelineConfig::builder()
            .base_url("https://imagery.example.com/v1")
            .api_key("secret")
            .request_timeout(Duration::ZERO)
            .build();
        assert!(matches!(config, Err(StreetshotError::Config(_))));
    }

    #[test]
    fn test_invalid_completion_url_rejected() {
        let config = PipelineConfig::builder()
            .base_url("https://imagery.example.com/v1")
            .api_key("secret")
            .completion_url("ftp://tracker.example.com")
            .build();
        assert!(matches!(config, Err(StreetshotError::Config(_))));
    }
}
