//! Completion callbacks toward downstream processing trackers

use crate::catalog::ImageId;
use crate::error::{Result, StreetshotError};
use crate::provider::http::{validate_base_url, DEFAULT_REQUEST_TIMEOUT};
use log::{debug, warn};
use reqwest::Client;
use std::time::Duration;

/// Client for a completion endpoint that records each processed image.
///
/// Trackers expose a single GET endpoint taking the image identifier as a
/// query parameter; the pinger reports an image once its file has been
/// downloaded and post-processed.
#[derive(Debug, Clone)]
pub struct CompletionPinger {
    client: Client,
    endpoint: String,
}

impl CompletionPinger {
    /// Create a pinger with the default request timeout
    ///
    /// # Errors
    /// Returns `StreetshotError::Config` for an empty or non-HTTP endpoint
    /// URL.
    pub fn new(endpoint: &str) -> Result<Self> {
        Self::with_timeout(endpoint, DEFAULT_REQUEST_TIMEOUT)
    }

    /// Create a pinger with a custom request timeout
    ///
    /// # Errors
    /// Returns `StreetshotError::Config` for an invalid endpoint URL and
    /// `StreetshotError::Provider` when the HTTP client cannot be built.
    pub fn with_timeout(endpoint: &str, timeout: Duration) -> Result<Self> {
        validate_base_url(endpoint)?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StreetshotError::request_error("create completion client", endpoint, &e))?;
        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
        })
    }

    /// The configured endpoint URL
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Report one processed image
    ///
    /// # Errors
    /// Returns `StreetshotError::Provider` for transport failures and
    /// non-success HTTP statuses.
    pub async fn ping(&self, id: &ImageId) -> Result<()> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("image_id", id.as_str())])
            .send()
            .await
            .map_err(|e| {
                StreetshotError::request_error("ping completion endpoint", &self.endpoint, &e)
            })?;

        if !response.status().is_success() {
            return Err(StreetshotError::provider_status(
                response.status().as_u16(),
                format!("completion endpoint rejected image {id}"),
            ));
        }

        debug!("Reported completion of image {}", id);
        Ok(())
    }

    /// Report a batch of processed images, continuing past individual
    /// failures.
    ///
    /// Returns the failures; an empty vector means every image was reported.
    pub async fn ping_all(&self, ids: &[ImageId]) -> Vec<(ImageId, StreetshotError)> {
        let mut failures = Vec::new();
        for id in ids {
            if let Err(error) = self.ping(id).await {
                warn!("Completion ping for image {} failed: {}", id, error);
                failures.push((id.clone(), error));
            }
        }
        failures
    }
}
