//! HTTP implementation of the imagery provider capability
//!
//! Thin wrapper over the provider's REST endpoints: image search, saved-AOI
//! feeds, single-record fetches, streaming image downloads, and AOI
//! management. Every request carries the account's API key and is bounded by
//! a per-request timeout.

use crate::catalog::{AoiId, ImageId};
use crate::error::{Result, StreetshotError};
use crate::geo::AreaOfInterest;
use crate::provider::types::{AoiDescriptor, Feature, FeatureCollection, ImageRecord};
use crate::provider::ImageryProvider;
use crate::query::{FeedOptions, LocationPredicate, SearchQuery, SizeVariant};
use async_trait::async_trait;
use futures_util::stream::TryStreamExt;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Client, Response, StatusCode};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio_util::io::StreamReader;

/// Media type the provider serves for search and feed responses
const GEO_JSON_MEDIA_TYPE: &str = "application/vnd.geo+json";

/// Authorization scheme of the provider's API-key header
const API_KEY_SCHEME: &str = "api-key";

/// File extension for downloaded images
const IMAGE_FILE_EXTENSION: &str = "jpg";

/// Longest provider error body echoed back into an error message
const MAX_ERROR_BODY_CHARS: usize = 200;

/// Default bound on any single HTTP round trip
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Provider client backed by a reqwest HTTP client
#[derive(Debug)]
pub struct HttpImageryProvider {
    client: Client,
    base_url: String,
}

impl HttpImageryProvider {
    /// Create a provider client with the default request timeout
    ///
    /// # Errors
    /// - Empty or non-HTTP base URL
    /// - API key empty or not representable as a header value
    /// - Failed to create HTTP client
    pub fn new<S: Into<String>>(base_url: S, api_key: S) -> Result<Self> {
        Self::with_timeout(base_url.into(), api_key.into(), DEFAULT_REQUEST_TIMEOUT)
    }

    /// Create a provider client with an explicit per-request timeout
    ///
    /// # Errors
    /// - Empty or non-HTTP base URL
    /// - API key empty or not representable as a header value
    /// - Failed to create HTTP client
    pub fn with_timeout<S: Into<String>>(
        base_url: S,
        api_key: S,
        timeout: Duration,
    ) -> Result<Self> {
        let base_url = normalize_base_url(&base_url.into())?;
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(StreetshotError::invalid_config("API key cannot be empty"));
        }

        let mut auth = HeaderValue::from_str(&format!("{API_KEY_SCHEME} {api_key}"))
            .map_err(|_| {
                StreetshotError::invalid_config(
                    "API key contains characters not representable in a header",
                )
            })?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static(GEO_JSON_MEDIA_TYPE));

        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| StreetshotError::provider(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client, base_url })
    }

    /// Base URL requests are issued against, without a trailing slash
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Query parameters shared by both search endpoints, in wire order
    fn common_search_params(query: &SearchQuery) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(radius) = query.radius_meters {
            params.push(("radius", radius.to_string()));
        }
        params.push(("sort", query.resolved_sort().as_str().to_owned()));
        params.push(("order", query.order.as_str().to_owned()));
        if let Some(filter) = &query.filter {
            params.push(("filter", filter.clone()));
        }
        if let Some(tags) = &query.tags {
            params.push(("tags", tags.clone()));
        }
        if let Some(range) = &query.date_range {
            params.push(("range", range.to_query_value()));
        }
        params.push(("offset", query.offset.to_string()));
        params.push(("limit", query.resolved_limit().to_string()));
        params
    }

    fn feed_params(options: &FeedOptions) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("sort", options.resolved_sort().as_str().to_owned()),
            ("order", options.order.as_str().to_owned()),
        ];
        if let Some(filter) = &options.filter {
            params.push(("filter", filter.clone()));
        }
        if let Some(tags) = &options.tags {
            params.push(("tags", tags.clone()));
        }
        if let Some(range) = &options.date_range {
            params.push(("range", range.to_query_value()));
        }
        params.push(("offset", options.offset.to_string()));
        params.push(("limit", options.resolved_limit().to_string()));
        params
    }

    /// Issue a GET expected to return a feature collection
    async fn fetch_collection(
        &self,
        path: &str,
        params: &[(&'static str, String)],
    ) -> Result<FeatureCollection> {
        let url = self.endpoint(path);
        log::debug!("GET {} ({} params)", url, params.len());

        let response = self
            .client
            .get(&url)
            .query(params)
            .send()
            .await
            .map_err(|e| StreetshotError::request_error("search images", &url, &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Self::status_error(status, response).await);
        }

        let body = response
            .text()
            .await
            .map_err(|e| StreetshotError::request_error("read search response", &url, &e))?;
        serde_json::from_str(&body)
            .map_err(|e| StreetshotError::malformed_response(path, status.as_u16(), &e))
    }

    /// Turn a non-success response into a provider error carrying the status
    /// and a bounded echo of the body
    async fn status_error(status: StatusCode, response: Response) -> StreetshotError {
        let body = response.text().await.unwrap_or_default();
        let message = if body.trim().is_empty() {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_owned()
        } else {
            body.chars().take(MAX_ERROR_BODY_CHARS).collect()
        };
        StreetshotError::provider_status(status.as_u16(), message)
    }
}

#[async_trait]
impl ImageryProvider for HttpImageryProvider {
    async fn search_by_area(&self, query: &SearchQuery) -> Result<FeatureCollection> {
        query.validate()?;
        let LocationPredicate::Area(area) = query.location()? else {
            return Err(StreetshotError::invalid_query(
                "area search requires an area polygon, not an address",
            ));
        };

        let mut params = vec![("points", area.to_query_value())];
        params.extend(Self::common_search_params(query));
        self.fetch_collection("images/search", &params).await
    }

    async fn search_by_address(&self, query: &SearchQuery) -> Result<FeatureCollection> {
        query.validate()?;
        let LocationPredicate::Address(address) = query.location()? else {
            return Err(StreetshotError::invalid_query(
                "address search requires an address, not an area polygon",
            ));
        };

        let mut params = vec![("address", address.to_owned())];
        params.extend(Self::common_search_params(query));
        self.fetch_collection("images/search", &params).await
    }

    async fn aoi_feed(&self, aoi_id: &AoiId, options: &FeedOptions) -> Result<FeatureCollection> {
        options.validate()?;
        let path = format!("aois/{aoi_id}");
        let params = Self::feed_params(options);
        self.fetch_collection(&path, &params).await
    }

    async fn get_by_id(&self, id: &ImageId) -> Result<ImageRecord> {
        let path = format!("images/{id}");
        let url = self.endpoint(&path);
        log::debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| StreetshotError::request_error("fetch image record", &url, &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Self::status_error(status, response).await);
        }

        let body = response
            .text()
            .await
            .map_err(|e| StreetshotError::request_error("read image record", &url, &e))?;
        let feature: Feature = serde_json::from_str(&body)
            .map_err(|e| StreetshotError::malformed_response(&path, status.as_u16(), &e))?;

        ImageRecord::from_feature(feature).ok_or_else(|| {
            StreetshotError::provider_status(
                status.as_u16(),
                format!("image record '{id}' carried no identifier"),
            )
        })
    }

    async fn download(&self, id: &ImageId, dest_dir: &Path, size: SizeVariant) -> Result<PathBuf> {
        fs::create_dir_all(dest_dir).map_err(|e| {
            StreetshotError::file_io_error("create destination directory", dest_dir, e)
        })?;

        let url = self.endpoint(&format!("images/{id}/download"));
        let local_path = dest_dir.join(image_file_name(id));
        log::debug!("Downloading {} -> {}", url, local_path.display());

        let response = self
            .client
            .get(&url)
            .query(&[("size", size.as_str())])
            .send()
            .await
            .map_err(|e| StreetshotError::request_error("download image", &url, &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Self::status_error(status, response).await);
        }

        let mut file = tokio::fs::File::create(&local_path)
            .await
            .map_err(|e| StreetshotError::file_io_error("create image file", &local_path, e))?;

        let mut stream = StreamReader::new(
            response
                .bytes_stream()
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e)),
        );

        let mut downloaded = 0u64;
        let mut buffer = vec![0; 8192]; // 8KB buffer
        loop {
            let bytes_read = tokio::io::AsyncReadExt::read(&mut stream, &mut buffer)
                .await
                .map_err(|e| {
                    StreetshotError::provider(format!("Failed to read download stream: {e}"))
                })?;

            if bytes_read == 0 {
                break; // EOF
            }

            file.write_all(buffer.get(..bytes_read).unwrap_or(&[]))
                .await
                .map_err(|e| StreetshotError::file_io_error("write image file", &local_path, e))?;

            downloaded += bytes_read as u64;
        }

        file.flush()
            .await
            .map_err(|e| StreetshotError::file_io_error("flush image file", &local_path, e))?;

        log::debug!("Downloaded {} bytes to {}", downloaded, local_path.display());
        Ok(local_path)
    }

    async fn create_aoi(&self, area: &AreaOfInterest, name: &str) -> Result<AoiDescriptor> {
        let url = self.endpoint("aois");
        log::debug!("POST {} ({})", url, name);

        let body = serde_json::json!({ "aoi": area.to_ring_value(), "name": name });
        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| StreetshotError::request_error("create AOI", &url, &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Self::status_error(status, response).await);
        }

        let text = response
            .text()
            .await
            .map_err(|e| StreetshotError::request_error("read AOI response", &url, &e))?;
        serde_json::from_str(&text)
            .map_err(|e| StreetshotError::malformed_response("aois", status.as_u16(), &e))
    }

    async fn update_aoi(
        &self,
        id: &AoiId,
        area: &AreaOfInterest,
        name: &str,
    ) -> Result<AoiDescriptor> {
        let path = format!("aois/{id}");
        let url = self.endpoint(&path);
        log::debug!("PUT {} ({})", url, name);

        let body = serde_json::json!({ "aoi": area.to_ring_value(), "name": name });
        let response = self
            .client
            .put(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| StreetshotError::request_error("update AOI", &url, &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Self::status_error(status, response).await);
        }

        let text = response
            .text()
            .await
            .map_err(|e| StreetshotError::request_error("read AOI response", &url, &e))?;
        serde_json::from_str(&text)
            .map_err(|e| StreetshotError::malformed_response(&path, status.as_u16(), &e))
    }
}

/// Local file name for a downloaded image, keyed by its identifier
#[must_use]
pub fn image_file_name(id: &ImageId) -> String {
    format!("{id}.{IMAGE_FILE_EXTENSION}")
}

/// Validate that a URL is usable as the provider's API base
///
/// # Errors
/// - Empty URL
/// - URL without an `http` or `https` scheme
pub fn validate_base_url(url: &str) -> Result<()> {
    if url.is_empty() {
        return Err(StreetshotError::invalid_config(
            "API base URL cannot be empty",
        ));
    }
    if !url.starts_with("https://") && !url.starts_with("http://") {
        return Err(StreetshotError::invalid_config(format!(
            "Unsupported API base URL '{url}': expected an http(s) URL"
        )));
    }
    Ok(())
}

fn normalize_base_url(url: &str) -> Result<String> {
    validate_base_url(url)?;
    Ok(url.trim_end_matches('/').to_owned())
}
