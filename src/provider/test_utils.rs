//! Test utilities and scripted providers for exercising the pipeline
//!
//! This module provides mock implementations of the `ImageryProvider` trait
//! to enable comprehensive testing without network access or a live provider
//! account.

use crate::catalog::{AoiId, ImageId};
use crate::error::{Result, StreetshotError};
use crate::geo::AreaOfInterest;
use crate::provider::http::image_file_name;
use crate::provider::types::{
    AoiDescriptor, AoiProperties, Feature, FeatureCollection, ImageProperties, ImageRecord,
};
use crate::provider::ImageryProvider;
use crate::query::{FeedOptions, SearchQuery, SizeVariant};
use async_trait::async_trait;
use std::collections::{HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Scripted provider for pipeline testing
#[derive(Debug, Clone)]
pub struct MockProvider {
    /// Feature collections handed out one per search or feed call
    responses: Arc<Mutex<VecDeque<FeatureCollection>>>,
    /// Call history for verification in tests
    call_history: Arc<Mutex<Vec<String>>>,
    /// Monotonic counter backing scripted AOI identifiers
    aoi_counter: Arc<Mutex<u64>>,
    /// Whether every search and feed call fails
    should_fail_search: bool,
    /// Image identifiers whose download is scripted to fail
    failing_downloads: HashSet<ImageId>,
    /// Bytes written for each successful download
    payload: Vec<u8>,
}

impl MockProvider {
    /// Create a provider that answers every search with an empty collection
    #[must_use]
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            call_history: Arc::new(Mutex::new(Vec::new())),
            aoi_counter: Arc::new(Mutex::new(0)),
            should_fail_search: false,
            failing_downloads: HashSet::new(),
            payload: test_helpers::jpeg_payload(),
        }
    }

    /// Create a provider whose searches all fail with a provider error
    #[must_use]
    pub fn new_failing_search() -> Self {
        let mut provider = Self::new();
        provider.should_fail_search = true;
        provider
    }

    /// Queue a feature collection to be returned by the next search or feed
    /// call
    #[must_use]
    pub fn with_response(self, collection: FeatureCollection) -> Self {
        self.responses.lock().unwrap().push_back(collection);
        self
    }

    /// Script the download of `id` to fail
    #[must_use]
    pub fn with_failing_download(mut self, id: ImageId) -> Self {
        self.failing_downloads.insert(id);
        self
    }

    /// Replace the bytes written for each successful download
    #[must_use]
    pub fn with_payload(mut self, payload: Vec<u8>) -> Self {
        self.payload = payload;
        self
    }

    /// Get the call history for verification in tests
    pub fn get_call_history(&self) -> Vec<String> {
        self.call_history.lock().unwrap().clone()
    }

    /// Clear the call history
    pub fn clear_call_history(&self) {
        self.call_history.lock().unwrap().clear();
    }

    /// Record a method call for testing verification
    fn record_call(&self, method: &str) {
        if let Ok(mut history) = self.call_history.lock() {
            history.push(method.to_string());
        }
    }

    fn next_response(&self) -> FeatureCollection {
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(FeatureCollection {
                id: None,
                features: Vec::new(),
            })
    }

    fn next_aoi_id(&self) -> AoiId {
        let mut counter = self.aoi_counter.lock().unwrap();
        *counter += 1;
        AoiId::new(counter.to_string())
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageryProvider for MockProvider {
    async fn search_by_area(&self, _query: &SearchQuery) -> Result<FeatureCollection> {
        self.record_call("search_by_area");
        if self.should_fail_search {
            return Err(StreetshotError::provider_status(
                503,
                "mock provider scripted to fail searches",
            ));
        }
        Ok(self.next_response())
    }

    async fn search_by_address(&self, _query: &SearchQuery) -> Result<FeatureCollection> {
        self.record_call("search_by_address");
        if self.should_fail_search {
            return Err(StreetshotError::provider_status(
                503,
                "mock provider scripted to fail searches",
            ));
        }
        Ok(self.next_response())
    }

    async fn aoi_feed(&self, aoi_id: &AoiId, _options: &FeedOptions) -> Result<FeatureCollection> {
        self.record_call(&format!("aoi_feed {aoi_id}"));
        if self.should_fail_search {
            return Err(StreetshotError::provider_status(
                503,
                "mock provider scripted to fail searches",
            ));
        }
        Ok(self.next_response())
    }

    async fn get_by_id(&self, id: &ImageId) -> Result<ImageRecord> {
        self.record_call(&format!("get_by_id {id}"));
        if self.failing_downloads.contains(id) {
            return Err(StreetshotError::provider_status(404, "Not found"));
        }
        Ok(ImageRecord {
            id: id.clone(),
            captured_on: None,
            speed: Some(0.0),
            url: Some(format!("https://mock.invalid/images/{id}")),
            position: None,
        })
    }

    async fn download(&self, id: &ImageId, dest_dir: &Path, size: SizeVariant) -> Result<PathBuf> {
        self.record_call(&format!("download {id} {size}"));
        if self.failing_downloads.contains(id) {
            return Err(StreetshotError::provider_status(500, "scripted failure"));
        }

        std::fs::create_dir_all(dest_dir).map_err(|e| {
            StreetshotError::file_io_error("create destination directory", dest_dir, e)
        })?;
        let path = dest_dir.join(image_file_name(id));
        std::fs::write(&path, &self.payload)
            .map_err(|e| StreetshotError::file_io_error("write image file", &path, e))?;
        Ok(path)
    }

    async fn create_aoi(&self, _area: &AreaOfInterest, name: &str) -> Result<AoiDescriptor> {
        self.record_call(&format!("create_aoi {name}"));
        let id = self.next_aoi_id();
        Ok(AoiDescriptor {
            id: Some(id.clone()),
            properties: AoiProperties {
                id: Some(id),
                name: Some(name.to_string()),
            },
            updated_at: None,
        })
    }

    async fn update_aoi(
        &self,
        id: &AoiId,
        _area: &AreaOfInterest,
        name: &str,
    ) -> Result<AoiDescriptor> {
        self.record_call(&format!("update_aoi {id}"));
        let new_id = self.next_aoi_id();
        Ok(AoiDescriptor {
            id: Some(new_id.clone()),
            properties: AoiProperties {
                id: Some(new_id),
                name: Some(name.to_string()),
            },
            updated_at: None,
        })
    }
}

/// Helper functions for building wire payloads in tests
pub mod test_helpers {
    use super::{Feature, FeatureCollection, ImageProperties};
    use crate::catalog::AoiId;

    /// Build a feature collection whose features use the `image_id` key
    pub fn feature_collection(ids: &[&str]) -> FeatureCollection {
        FeatureCollection {
            id: None,
            features: ids
                .iter()
                .map(|id| Feature {
                    geometry: None,
                    properties: ImageProperties {
                        image_id: Some((*id).into()),
                        url: Some(format!("https://mock.invalid/images/{id}")),
                        ..ImageProperties::default()
                    },
                })
                .collect(),
        }
    }

    /// Build a feature collection carrying an AOI identifier
    pub fn feature_collection_with_aoi(aoi_id: &str, ids: &[&str]) -> FeatureCollection {
        FeatureCollection {
            id: Some(AoiId::new(aoi_id)),
            ..feature_collection(ids)
        }
    }

    /// Encode a small gray JPEG usable as a download payload
    pub fn jpeg_payload() -> Vec<u8> {
        let img = image::RgbImage::from_pixel(8, 8, image::Rgb([128, 128, 128]));
        let mut bytes = Vec::new();
        let mut cursor = std::io::Cursor::new(&mut bytes);
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut cursor, image::ImageFormat::Jpeg)
            .expect("encode test payload");
        bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_mock_provider_scripted_responses() {
        let provider = MockProvider::new()
            .with_response(test_helpers::feature_collection(&["1", "2"]))
            .with_response(test_helpers::feature_collection(&["3"]));

        let query = SearchQuery::by_address("850 Broadway");
        let first = provider.search_by_address(&query).await.unwrap();
        assert_eq!(first.len(), 2);
        let second = provider.search_by_address(&query).await.unwrap();
        assert_eq!(second.len(), 1);
        let drained = provider.search_by_address(&query).await.unwrap();
        assert!(drained.is_empty());

        let history = provider.get_call_history();
        assert_eq!(history.len(), 3);
        assert!(history.iter().all(|call| call == "search_by_address"));
    }

    #[tokio::test]
    async fn test_mock_provider_scripted_search_failure() {
        let provider = MockProvider::new_failing_search();
        let query = SearchQuery::by_address("850 Broadway");
        let err = provider.search_by_address(&query).await.unwrap_err();
        assert!(matches!(err, StreetshotError::Provider { code: Some(503), .. }));
    }

    #[tokio::test]
    async fn test_mock_provider_download_writes_payload() {
        let dir = TempDir::new().unwrap();
        let provider = MockProvider::new();

        let path = provider
            .download(&ImageId::new("9"), dir.path(), SizeVariant::Small)
            .await
            .unwrap();
        assert_eq!(path, dir.path().join("9.jpg"));
        let written = std::fs::read(&path).unwrap();
        assert_eq!(written, test_helpers::jpeg_payload());
        assert!(image::load_from_memory(&written).is_ok());
    }

    #[tokio::test]
    async fn test_mock_provider_failing_download() {
        let dir = TempDir::new().unwrap();
        let provider = MockProvider::new().with_failing_download(ImageId::new("13"));

        let err = provider
            .download(&ImageId::new("13"), dir.path(), SizeVariant::Small)
            .await
            .unwrap_err();
        assert!(matches!(err, StreetshotError::Provider { code: Some(500), .. }));
        assert!(provider
            .download(&ImageId::new("14"), dir.path(), SizeVariant::Small)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_mock_provider_aoi_lifecycle_identifiers() {
        let area = AreaOfInterest::from_lon_lat_pairs(&[
            (-73.0, 40.0),
            (-73.1, 40.1),
            (-73.2, 40.2),
            (-73.3, 40.3),
        ])
        .unwrap();
        let provider = MockProvider::new();

        let created = provider.create_aoi(&area, "East Village").await.unwrap();
        let first_id = created.identifier().unwrap().clone();

        let updated = provider
            .update_aoi(&first_id, &area, "East Village v2")
            .await
            .unwrap();
        let second_id = updated.identifier().unwrap().clone();
        assert_ne!(first_id, second_id);
    }
}
