//! Unified image acquisition pipeline
//!
//! This module provides the main `AcquisitionPipeline` that consolidates the
//! search, dedup, and batch-download logic of an acquisition session. The
//! pipeline is used by both the CLI and library callers to ensure consistent
//! behavior.

use crate::{
    catalog::{AoiId, AoiRegistry, ImageCatalog, ImageId},
    config::PipelineConfig,
    error::{Result, StreetshotError},
    geo::AreaOfInterest,
    provider::types::{AoiDescriptor, FeatureCollection, ImageRecord},
    provider::{HttpImageryProvider, ImageryProvider},
    query::{FeedOptions, LocationPredicate, SearchQuery, SizeVariant},
};
use instant::Instant;
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use tracing::{info as trace_info, instrument};

/// Views of one search's effect on the session catalog.
///
/// `matched` is what the provider returned for this call and `discovered` is
/// the part of it that was new; `catalog` is the cumulative membership after
/// the merge, so callers relying on either reading get it without a second
/// query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOutcome {
    /// Identifiers the provider returned for this call, in response order
    pub matched: Vec<ImageId>,
    /// Subset of `matched` that was new to the catalog, in response order
    pub discovered: Vec<ImageId>,
    /// Full catalog membership after the merge, sorted
    pub catalog: Vec<ImageId>,
}

impl SearchOutcome {
    /// Number of identifiers in the catalog after this search
    #[must_use]
    pub fn catalog_size(&self) -> usize {
        self.catalog.len()
    }

    /// Whether the provider returned no identifiers at all.
    ///
    /// An empty outcome is still a successful search; failures surface as
    /// errors, never as an empty result.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.matched.is_empty()
    }
}

/// A file written by a batch download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedAsset {
    /// Image the file belongs to
    pub id: ImageId,
    /// Local path of the written file
    pub path: PathBuf,
    /// Size variant that was fetched
    pub size: SizeVariant,
}

/// Per-item results of one batch download.
///
/// The saved set lists only the items whose file actually landed on disk;
/// callers retry `failed` explicitly if they want the rest.
#[derive(Debug, Default)]
pub struct DownloadReport {
    /// Assets written to disk, in catalog order
    pub saved: Vec<DownloadedAsset>,
    /// Identifiers whose download failed, with the failure
    pub failed: Vec<(ImageId, StreetshotError)>,
}

impl DownloadReport {
    /// Number of identifiers the batch attempted
    #[must_use]
    pub fn attempted(&self) -> usize {
        self.saved.len() + self.failed.len()
    }

    /// Whether every attempted item was saved
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    /// Whether the batch saved some items and failed others
    #[must_use]
    pub fn is_partial(&self) -> bool {
        !self.saved.is_empty() && !self.failed.is_empty()
    }

    /// Identifiers of the saved assets, in catalog order
    #[must_use]
    pub fn saved_ids(&self) -> Vec<ImageId> {
        self.saved.iter().map(|asset| asset.id.clone()).collect()
    }

    /// Identifiers of the failed items, in catalog order
    #[must_use]
    pub fn failed_ids(&self) -> Vec<ImageId> {
        self.failed.iter().map(|(id, _)| id.clone()).collect()
    }
}

/// Result of one batch download request
#[derive(Debug)]
pub enum DownloadOutcome {
    /// The catalog was empty; no request was issued. A normal outcome, not a
    /// failure.
    NothingToDownload,
    /// The batch ran to completion; per-item results inside
    Completed(DownloadReport),
}

impl DownloadOutcome {
    /// The per-item report, `None` when nothing was attempted
    #[must_use]
    pub fn report(&self) -> Option<&DownloadReport> {
        match self {
            Self::NothingToDownload => None,
            Self::Completed(report) => Some(report),
        }
    }

    /// Whether the catalog was empty at download time
    #[must_use]
    pub fn is_nothing_to_download(&self) -> bool {
        matches!(self, Self::NothingToDownload)
    }
}

/// Unified acquisition pipeline that consolidates search, dedup, and download
/// for one session.
///
/// The catalog is explicit per-pipeline state: overlapping searches merge into
/// it without duplicates, and batch downloads walk its current membership.
pub struct AcquisitionPipeline {
    config: PipelineConfig,
    provider: Box<dyn ImageryProvider>,
    catalog: ImageCatalog,
    registry: AoiRegistry,
}

impl AcquisitionPipeline {
    /// Create a pipeline with an HTTP provider built from the configuration
    ///
    /// # Errors
    ///
    /// Returns `StreetshotError` for:
    /// - Invalid configuration values
    /// - HTTP client construction failures
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        let provider = HttpImageryProvider::with_timeout(
            config.base_url.clone(),
            config.api_key.clone(),
            config.request_timeout,
        )?;
        Ok(Self::with_provider(config, Box::new(provider)))
    }

    /// Create a pipeline with an injected provider implementation.
    ///
    /// The configuration is taken as given; only [`AcquisitionPipeline::new`]
    /// validates it, because an injected provider does not use the transport
    /// fields.
    #[must_use]
    pub fn with_provider(config: PipelineConfig, provider: Box<dyn ImageryProvider>) -> Self {
        Self {
            config,
            provider,
            catalog: ImageCatalog::new(),
            registry: AoiRegistry::new(),
        }
    }

    /// Search for images and merge the results into the session catalog.
    ///
    /// The query is validated locally first; an ambiguous or malformed query
    /// fails with `InvalidQuery` before any network call.
    ///
    /// # Errors
    ///
    /// Returns `StreetshotError` for:
    /// - Invalid queries (both or neither location predicate, bad pagination)
    /// - Provider failures (HTTP errors, malformed responses)
    #[instrument(
        skip(self, query),
        fields(offset = query.offset, limit = query.resolved_limit())
    )]
    pub async fn search(&mut self, query: &SearchQuery) -> Result<SearchOutcome> {
        query.validate()?;
        let predicate = query.location()?;

        let label = match predicate {
            LocationPredicate::Area(_) => "area",
            LocationPredicate::Address(_) => "address",
        };
        trace_info!(predicate = %label, "🔍 Dispatching provider search");

        let search_start = Instant::now();
        let collection = match predicate {
            LocationPredicate::Area(_) => self.provider.search_by_area(query).await?,
            LocationPredicate::Address(_) => self.provider.search_by_address(query).await?,
        };

        let outcome = self.absorb(collection);
        info!(
            "Search matched {} images ({} new) in {}ms; catalog now holds {}",
            outcome.matched.len(),
            outcome.discovered.len(),
            search_start.elapsed().as_millis(),
            outcome.catalog_size()
        );
        Ok(outcome)
    }

    /// Read a saved AOI's image feed and merge the results into the session
    /// catalog. The AOI identifier is recorded in the session registry.
    ///
    /// # Errors
    ///
    /// Returns `StreetshotError` for:
    /// - Invalid feed options (bad pagination values)
    /// - Provider failures (unknown AOI, HTTP errors, malformed responses)
    #[instrument(skip(self, options), fields(aoi = %aoi_id))]
    pub async fn aoi_feed(
        &mut self,
        aoi_id: &AoiId,
        options: &FeedOptions,
    ) -> Result<SearchOutcome> {
        options.validate()?;

        let collection = self.provider.aoi_feed(aoi_id, options).await?;
        self.registry
            .add(collection.id.clone().unwrap_or_else(|| aoi_id.clone()));
        Ok(self.absorb(collection))
    }

    /// Fetch one image record by identifier
    ///
    /// # Errors
    ///
    /// Returns `StreetshotError::Provider` for unknown identifiers and
    /// transport failures.
    pub async fn get_by_id(&self, id: &ImageId) -> Result<ImageRecord> {
        self.provider.get_by_id(id).await
    }

    /// Download every catalogued image into `dest_dir` at the configured size
    /// variant.
    ///
    /// An empty catalog short-circuits to [`DownloadOutcome::NothingToDownload`]
    /// without touching the network. Individual failures never abort the
    /// batch; they are collected into the report.
    ///
    /// # Errors
    ///
    /// This method itself only fails on pipeline-level problems; per-item
    /// download failures are reported inside the `Ok` outcome.
    pub async fn download(&self, dest_dir: &Path) -> Result<DownloadOutcome> {
        self.download_as(dest_dir, self.config.size_variant).await
    }

    /// Download every catalogued image into `dest_dir` at an explicit size
    /// variant.
    ///
    /// # Errors
    ///
    /// See [`AcquisitionPipeline::download`].
    #[instrument(skip(self, dest_dir), fields(size = %size, catalog_size = self.catalog.size()))]
    pub async fn download_as(&self, dest_dir: &Path, size: SizeVariant) -> Result<DownloadOutcome> {
        if self.catalog.is_empty() {
            debug!("Catalog is empty, nothing to download");
            return Ok(DownloadOutcome::NothingToDownload);
        }

        let ids = self.catalog.ids();
        trace_info!(count = ids.len(), dest = %dest_dir.display(), "📥 Starting batch download");

        let batch_start = Instant::now();
        let mut report = DownloadReport::default();
        for id in ids {
            match self.provider.download(&id, dest_dir, size).await {
                Ok(path) => {
                    debug!("Saved image {} to {}", id, path.display());
                    report.saved.push(DownloadedAsset { id, path, size });
                },
                Err(error) => {
                    warn!("Download of image {} failed: {}", id, error);
                    report.failed.push((id, error));
                },
            }
        }

        let elapsed_ms = batch_start.elapsed().as_millis();
        if report.is_complete() {
            info!(
                "Downloaded {} images in {}ms",
                report.saved.len(),
                elapsed_ms
            );
        } else {
            warn!(
                "Downloaded {} of {} images in {}ms ({} failed)",
                report.saved.len(),
                report.attempted(),
                elapsed_ms,
                report.failed.len()
            );
        }
        Ok(DownloadOutcome::Completed(report))
    }

    /// Search a polygon and download everything it matched in one call.
    ///
    /// The catalog is reset first so the download covers exactly this
    /// search's results, never leftovers of a previous, unrelated query.
    ///
    /// # Errors
    ///
    /// Returns `StreetshotError` for invalid queries and provider search
    /// failures; per-item download failures are reported inside the outcome.
    pub async fn download_by_area(
        &mut self,
        area: AreaOfInterest,
        radius_meters: Option<u32>,
        dest_dir: &Path,
    ) -> Result<(SearchOutcome, DownloadOutcome)> {
        let mut query = SearchQuery::by_area(area);
        if let Some(meters) = radius_meters {
            query = query.with_radius(meters);
        }
        self.catalog.clear();
        let search = self.search(&query).await?;
        let download = self.download(dest_dir).await?;
        Ok((search, download))
    }

    /// Search around an address and download everything it matched in one
    /// call. Resets the catalog like [`AcquisitionPipeline::download_by_area`].
    ///
    /// # Errors
    ///
    /// Returns `StreetshotError` for invalid queries and provider search
    /// failures; per-item download failures are reported inside the outcome.
    pub async fn download_by_address(
        &mut self,
        address: &str,
        radius_meters: Option<u32>,
        dest_dir: &Path,
    ) -> Result<(SearchOutcome, DownloadOutcome)> {
        let mut query = SearchQuery::by_address(address);
        if let Some(meters) = radius_meters {
            query = query.with_radius(meters);
        }
        self.catalog.clear();
        let search = self.search(&query).await?;
        let download = self.download(dest_dir).await?;
        Ok((search, download))
    }

    /// Create a saved AOI from a polygon and record its identifier in the
    /// session registry
    ///
    /// # Errors
    ///
    /// Returns `StreetshotError::Provider` when the provider rejects the
    /// polygon or the request fails.
    pub async fn create_aoi(&mut self, area: &AreaOfInterest, name: &str) -> Result<AoiDescriptor> {
        let descriptor = self.provider.create_aoi(area, name).await?;
        if let Some(id) = descriptor.identifier() {
            info!("Created AOI {} ({})", id, name);
            self.registry.add(id.clone());
        }
        Ok(descriptor)
    }

    /// Replace a saved AOI's polygon and name. The provider assigns a fresh
    /// identifier on update; the registry swaps the superseded one for it.
    ///
    /// # Errors
    ///
    /// Returns `StreetshotError::Provider` for unknown identifiers, rejected
    /// polygons, and transport failures.
    pub async fn update_aoi(
        &mut self,
        id: &AoiId,
        area: &AreaOfInterest,
        name: &str,
    ) -> Result<AoiDescriptor> {
        let descriptor = self.provider.update_aoi(id, area, name).await?;
        if let Some(new_id) = descriptor.identifier() {
            info!("Updated AOI {} (now {})", id, new_id);
            self.registry.replace(id, new_id.clone());
        }
        Ok(descriptor)
    }

    /// The session catalog
    #[must_use]
    pub fn catalog(&self) -> &ImageCatalog {
        &self.catalog
    }

    /// The session AOI registry
    #[must_use]
    pub fn registry(&self) -> &AoiRegistry {
        &self.registry
    }

    /// The pipeline configuration
    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Empty the catalog for a fresh search session
    pub fn clear(&mut self) {
        self.catalog.clear();
    }

    /// Merge a response's identifiers into the catalog and snapshot both
    /// views
    fn absorb(&mut self, collection: FeatureCollection) -> SearchOutcome {
        let matched = collection.image_ids();
        let discovered = self.catalog.merge(matched.iter().cloned());
        SearchOutcome {
            matched,
            discovered,
            catalog: self.catalog.ids(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::test_utils::{test_helpers, MockProvider};
    use tempfile::TempDir;

    fn test_area() -> AreaOfInterest {
        AreaOfInterest::from_lon_lat_pairs(&[
            (-73.987_084, 40.733_073),
            (-73.980_606, 40.730_386),
            (-73.986_275, 40.722_556),
            (-73.992_222, 40.724_334),
        ])
        .unwrap()
    }

    /// Build a pipeline around a mock, keeping a probe handle that shares the
    /// mock's call history
    fn pipeline_with(provider: MockProvider) -> (AcquisitionPipeline, MockProvider) {
        let probe = provider.clone();
        let pipeline =
            AcquisitionPipeline::with_provider(PipelineConfig::default(), Box::new(provider));
        (pipeline, probe)
    }

    #[tokio::test]
    async fn test_ambiguous_query_fails_without_network() {
        let (mut pipeline, probe) = pipeline_with(MockProvider::new());

        let both = SearchQuery {
            area: Some(test_area()),
            address: Some("850 Broadway".to_string()),
            ..SearchQuery::default()
        };
        assert!(matches!(
            pipeline.search(&both).await,
            Err(StreetshotError::InvalidQuery(_))
        ));

        let neither = SearchQuery::default();
        assert!(matches!(
            pipeline.search(&neither).await,
            Err(StreetshotError::InvalidQuery(_))
        ));

        assert!(probe.get_call_history().is_empty());
    }

    #[tokio::test]
    async fn test_search_by_area_merges_into_catalog() {
        let provider = MockProvider::new().with_response(test_helpers::feature_collection(&[
            "1", "2",
        ]));
        let (mut pipeline, probe) = pipeline_with(provider);

        let outcome = pipeline.search(&SearchQuery::by_area(test_area())).await.unwrap();
        assert_eq!(outcome.matched, vec![ImageId::new("1"), ImageId::new("2")]);
        assert_eq!(outcome.discovered, outcome.matched);
        assert_eq!(outcome.catalog_size(), 2);
        assert_eq!(probe.get_call_history(), vec!["search_by_area"]);
    }

    #[tokio::test]
    async fn test_search_by_address_dispatches_to_address_endpoint() {
        let provider =
            MockProvider::new().with_response(test_helpers::feature_collection(&["7"]));
        let (mut pipeline, probe) = pipeline_with(provider);

        let query = SearchQuery::by_address("850 Broadway, New York, NY 10003").with_radius(1000);
        let outcome = pipeline.search(&query).await.unwrap();
        assert_eq!(outcome.matched, vec![ImageId::new("7")]);
        assert_eq!(probe.get_call_history(), vec!["search_by_address"]);
    }

    #[tokio::test]
    async fn test_overlapping_searches_deduplicate() {
        let provider = MockProvider::new()
            .with_response(test_helpers::feature_collection(&["1", "2"]))
            .with_response(test_helpers::feature_collection(&["2", "3"]));
        let (mut pipeline, _probe) = pipeline_with(provider);

        pipeline.search(&SearchQuery::by_area(test_area())).await.unwrap();
        let second = pipeline.search(&SearchQuery::by_area(test_area())).await.unwrap();

        assert_eq!(second.matched, vec![ImageId::new("2"), ImageId::new("3")]);
        assert_eq!(second.discovered, vec![ImageId::new("3")]);
        assert_eq!(
            second.catalog,
            vec![ImageId::new("1"), ImageId::new("2"), ImageId::new("3")]
        );
        assert_eq!(pipeline.catalog().size(), 3);
    }

    #[tokio::test]
    async fn test_empty_result_is_success_not_failure() {
        let provider = MockProvider::new().with_response(test_helpers::feature_collection(&[]));
        let (mut pipeline, _probe) = pipeline_with(provider);

        let outcome = pipeline.search(&SearchQuery::by_area(test_area())).await.unwrap();
        assert!(outcome.is_empty());
        assert_eq!(outcome.catalog_size(), 0);
    }

    #[tokio::test]
    async fn test_search_failure_propagates() {
        let (mut pipeline, _probe) = pipeline_with(MockProvider::new_failing_search());

        let result = pipeline.search(&SearchQuery::by_area(test_area())).await;
        assert!(matches!(
            result,
            Err(StreetshotError::Provider { code: Some(503), .. })
        ));
        assert!(pipeline.catalog().is_empty());
    }

    #[tokio::test]
    async fn test_download_on_empty_catalog_is_nothing_to_download() {
        let dir = TempDir::new().unwrap();
        let (pipeline, probe) = pipeline_with(MockProvider::new());

        let outcome = pipeline.download(dir.path()).await.unwrap();
        assert!(outcome.is_nothing_to_download());
        assert!(outcome.report().is_none());
        assert!(probe.get_call_history().is_empty());
    }

    #[tokio::test]
    async fn test_download_saves_every_catalogued_image() {
        let dir = TempDir::new().unwrap();
        let provider = MockProvider::new().with_response(test_helpers::feature_collection(&[
            "1", "2",
        ]));
        let (mut pipeline, _probe) = pipeline_with(provider);

        pipeline.search(&SearchQuery::by_area(test_area())).await.unwrap();
        let outcome = pipeline.download(dir.path()).await.unwrap();

        let report = outcome.report().unwrap();
        assert!(report.is_complete());
        assert_eq!(report.saved_ids(), vec![ImageId::new("1"), ImageId::new("2")]);
        for asset in &report.saved {
            assert!(asset.path.exists());
            assert_eq!(asset.size, SizeVariant::Small);
        }
    }

    #[tokio::test]
    async fn test_partial_download_failure_reports_both_sides() {
        let dir = TempDir::new().unwrap();
        let provider = MockProvider::new()
            .with_response(test_helpers::feature_collection(&["1", "2", "3"]))
            .with_failing_download(ImageId::new("2"));
        let (mut pipeline, _probe) = pipeline_with(provider);

        pipeline.search(&SearchQuery::by_area(test_area())).await.unwrap();
        let outcome = pipeline.download(dir.path()).await.unwrap();

        let report = outcome.report().unwrap();
        assert!(report.is_partial());
        assert_eq!(report.attempted(), 3);
        assert_eq!(report.saved_ids(), vec![ImageId::new("1"), ImageId::new("3")]);
        assert_eq!(report.failed_ids(), vec![ImageId::new("2")]);
        assert!(matches!(
            report.failed.first(),
            Some((_, StreetshotError::Provider { .. }))
        ));
        assert!(dir.path().join("1.jpg").exists());
        assert!(!dir.path().join("2.jpg").exists());
        assert!(dir.path().join("3.jpg").exists());
    }

    #[tokio::test]
    async fn test_download_uses_configured_size_variant() {
        let dir = TempDir::new().unwrap();
        let provider =
            MockProvider::new().with_response(test_helpers::feature_collection(&["1"]));
        let probe = provider.clone();
        let config = PipelineConfig {
            size_variant: SizeVariant::Large,
            ..PipelineConfig::default()
        };
        let mut pipeline = AcquisitionPipeline::with_provider(config, Box::new(provider));

        pipeline.search(&SearchQuery::by_area(test_area())).await.unwrap();
        pipeline.download(dir.path()).await.unwrap();
        assert!(probe
            .get_call_history()
            .contains(&"download 1 large".to_string()));
    }

    #[tokio::test]
    async fn test_download_as_overrides_size_variant() {
        let dir = TempDir::new().unwrap();
        let provider =
            MockProvider::new().with_response(test_helpers::feature_collection(&["1"]));
        let (mut pipeline, probe) = pipeline_with(provider);

        pipeline.search(&SearchQuery::by_area(test_area())).await.unwrap();
        let outcome = pipeline
            .download_as(dir.path(), SizeVariant::Medium)
            .await
            .unwrap();
        assert_eq!(
            outcome.report().unwrap().saved.first().map(|a| a.size),
            Some(SizeVariant::Medium)
        );
        assert!(probe
            .get_call_history()
            .contains(&"download 1 medium".to_string()));
    }

    #[tokio::test]
    async fn test_download_by_area_resets_stale_catalog() {
        let dir = TempDir::new().unwrap();
        let provider = MockProvider::new()
            .with_response(test_helpers::feature_collection(&["1", "2"]))
            .with_response(test_helpers::feature_collection(&["9"]));
        let (mut pipeline, _probe) = pipeline_with(provider);

        pipeline.search(&SearchQuery::by_area(test_area())).await.unwrap();
        assert_eq!(pipeline.catalog().size(), 2);

        let (search, download) = pipeline
            .download_by_area(test_area(), Some(1000), dir.path())
            .await
            .unwrap();
        assert_eq!(search.catalog, vec![ImageId::new("9")]);
        assert_eq!(download.report().unwrap().saved_ids(), vec![ImageId::new("9")]);
        assert!(!dir.path().join("1.jpg").exists());
    }

    #[tokio::test]
    async fn test_aoi_feed_merges_and_registers() {
        let provider = MockProvider::new()
            .with_response(test_helpers::feature_collection_with_aoi("77", &["5", "6"]))
            .with_response(test_helpers::feature_collection(&["8"]));
        let (mut pipeline, probe) = pipeline_with(provider);

        let outcome = pipeline
            .aoi_feed(&AoiId::new("77"), &FeedOptions::default())
            .await
            .unwrap();
        assert_eq!(outcome.catalog_size(), 2);
        assert!(pipeline.registry().contains(&AoiId::new("77")));
        assert_eq!(probe.get_call_history(), vec!["aoi_feed 77"]);

        // A response without a collection id falls back to the requested one
        pipeline
            .aoi_feed(&AoiId::new("78"), &FeedOptions::default())
            .await
            .unwrap();
        assert!(pipeline.registry().contains(&AoiId::new("78")));
        assert_eq!(pipeline.catalog().size(), 3);
    }

    #[tokio::test]
    async fn test_aoi_feed_rejects_bad_options_without_network() {
        let (mut pipeline, probe) = pipeline_with(MockProvider::new());

        let options = FeedOptions::default().with_limit(0);
        assert!(matches!(
            pipeline.aoi_feed(&AoiId::new("77"), &options).await,
            Err(StreetshotError::InvalidQuery(_))
        ));
        assert!(probe.get_call_history().is_empty());
    }

    #[tokio::test]
    async fn test_create_and_update_aoi_swap_registry_entry() {
        let (mut pipeline, _probe) = pipeline_with(MockProvider::new());

        let created = pipeline.create_aoi(&test_area(), "East Village").await.unwrap();
        let first_id = created.identifier().unwrap().clone();
        assert!(pipeline.registry().contains(&first_id));

        let updated = pipeline
            .update_aoi(&first_id, &test_area(), "East Village v2")
            .await
            .unwrap();
        let second_id = updated.identifier().unwrap().clone();
        assert!(!pipeline.registry().contains(&first_id));
        assert!(pipeline.registry().contains(&second_id));
        assert_eq!(pipeline.registry().size(), 1);
    }

    #[tokio::test]
    async fn test_get_by_id_delegates_to_provider() {
        let (pipeline, probe) = pipeline_with(MockProvider::new());

        let record = pipeline.get_by_id(&ImageId::new("44")).await.unwrap();
        assert_eq!(record.id, ImageId::new("44"));
        assert_eq!(probe.get_call_history(), vec!["get_by_id 44"]);
    }

    #[tokio::test]
    async fn test_clear_resets_session() {
        let dir = TempDir::new().unwrap();
        let provider =
            MockProvider::new().with_response(test_helpers::feature_collection(&["1"]));
        let (mut pipeline, _probe) = pipeline_with(provider);

        pipeline.search(&SearchQuery::by_area(test_area())).await.unwrap();
        assert_eq!(pipeline.catalog().size(), 1);

        pipeline.clear();
        let outcome = pipeline.download(dir.path()).await.unwrap();
        assert!(outcome.is_nothing_to_download());
    }
}
