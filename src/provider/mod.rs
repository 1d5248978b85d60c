//! Imagery provider capability seam and implementations

pub mod http;
pub mod types;

#[cfg(test)]
pub mod test_utils;

pub use http::HttpImageryProvider;

use crate::catalog::{AoiId, ImageId};
use crate::error::Result;
use crate::geo::AreaOfInterest;
use crate::query::{FeedOptions, SearchQuery, SizeVariant};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use types::{AoiDescriptor, FeatureCollection, ImageRecord};

/// Capability trait for the remote imagery provider.
///
/// The acquisition pipeline only ever talks to the provider through this
/// seam, so any transport (or a scripted stand-in under test) can be swapped
/// in. Implementations receive queries that have already passed validation.
#[async_trait]
pub trait ImageryProvider: Send + Sync {
    /// Search for images captured within the query's polygon
    ///
    /// # Errors
    /// - Provider rejection (HTTP 4xx/5xx)
    /// - Transport failures and timeouts
    /// - Malformed response bodies
    async fn search_by_area(&self, query: &SearchQuery) -> Result<FeatureCollection>;

    /// Search for images captured near the query's address
    ///
    /// # Errors
    /// - Provider rejection (HTTP 4xx/5xx)
    /// - Transport failures and timeouts
    /// - Malformed response bodies
    async fn search_by_address(&self, query: &SearchQuery) -> Result<FeatureCollection>;

    /// Read the image feed of a saved AOI
    ///
    /// # Errors
    /// - Unknown AOI identifier
    /// - Provider rejection or transport failures
    async fn aoi_feed(&self, aoi_id: &AoiId, options: &FeedOptions) -> Result<FeatureCollection>;

    /// Fetch a single image record by identifier
    ///
    /// # Errors
    /// - Unknown image identifier (404)
    /// - Provider rejection or transport failures
    async fn get_by_id(&self, id: &ImageId) -> Result<ImageRecord>;

    /// Download one image at the requested size variant into `dest_dir`,
    /// returning the path of the written file
    ///
    /// # Errors
    /// - Unknown image identifier (404)
    /// - Provider rejection or transport failures
    /// - Local filesystem write failures
    async fn download(&self, id: &ImageId, dest_dir: &Path, size: SizeVariant) -> Result<PathBuf>;

    /// Save a named AOI with the provider for repeated access
    ///
    /// # Errors
    /// - Provider rejection or transport failures
    /// - Malformed response bodies
    async fn create_aoi(&self, area: &AreaOfInterest, name: &str) -> Result<AoiDescriptor>;

    /// Replace a saved AOI's polygon and name; the returned descriptor may
    /// carry a new identifier superseding the old one
    ///
    /// # Errors
    /// - Unknown AOI identifier
    /// - Provider rejection or transport failures
    async fn update_aoi(
        &self,
        id: &AoiId,
        area: &AreaOfInterest,
        name: &str,
    ) -> Result<AoiDescriptor>;
}
