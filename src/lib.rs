#![allow(clippy::too_many_lines)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::unused_async)]

//! # Streetshot
//!
//! A Rust client library for acquiring street-level imagery from a geospatial
//! imagery provider. Streetshot searches a provider by polygon or street
//! address, de-duplicates the results into a session catalog, batch-downloads
//! the catalogued images, and post-processes the rasters with pure-Rust
//! filters.
//!
//! Failures stay observable throughout: an empty search is a success, an
//! empty catalog at download time short-circuits without touching the
//! network, and partial batch failures report the saved and failed sides
//! separately instead of aborting.
//!
//! ## Features
//!
//! - **Two Search Predicates**: a 4-6 vertex polygon or an address with an
//!   optional radius, with sorting, filtering, date-range, and pagination
//!   options
//! - **Deduplicated Catalogs**: overlapping searches merge into one session
//!   catalog without duplicates
//! - **Batch Downloads**: per-item failures are collected, never aborting the
//!   remainder of the batch
//! - **Saved AOIs**: create and update provider-side areas of interest and
//!   read their image feeds
//! - **Raster Post-processing**: aspect-preserving resize, crop, rotation,
//!   sharpness and brightness scoring, region annotation, and histogram
//!   rendering
//! - **Completion Pings**: optional per-image notification of an external
//!   endpoint after processing
//! - **CLI Integration**: optional command-line interface (enable with the
//!   `cli` feature)
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use streetshot::{AcquisitionPipeline, PipelineConfig, SearchQuery};
//!
//! # async fn example() -> anyhow::Result<()> {
//! // Configure a session
//! let config = PipelineConfig::builder()
//!     .base_url("https://imagery.example.com/v1")
//!     .api_key("secret")
//!     .build()?;
//! let mut pipeline = AcquisitionPipeline::new(config)?;
//!
//! // Search around an address; overlapping searches deduplicate
//! let query = SearchQuery::by_address("850 Broadway, New York, NY 10003").with_radius(1000);
//! let outcome = pipeline.search(&query).await?;
//! println!("catalog holds {} image(s)", outcome.catalog_size());
//!
//! // Batch-download the catalog
//! let download = pipeline.download(std::path::Path::new("downloads")).await?;
//! if let Some(report) = download.report() {
//!     println!("saved {} of {} image(s)", report.saved.len(), report.attempted());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Post-processing
//!
//! The filter module works on plain `DynamicImage` values, so it composes
//! with any image source:
//!
//! ```rust,no_run
//! use streetshot::{filter, services::ImageStore};
//!
//! # fn example() -> anyhow::Result<()> {
//! let image = ImageStore::load_image("downloads/1527.jpg")?;
//! let thumbnail = filter::resize_to_width(&image, 640)?;
//! println!("sharpness: {:.1}", filter::sharpness_score(&thumbnail));
//! ImageStore::save_image(&thumbnail, "downloads/thumbnails/1527.jpg")?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Library vs CLI Usage
//!
//! This crate is designed to work both as a library and as a CLI application:
//!
//! - **Library Usage**: search, download, and post-processing are available
//!   by default
//! - **CLI Usage**: enable the `cli` feature for the command-line interface
//!   and console tracing
//!
//! ### Feature Flags
//!
//! - `cli` (default): command-line interface, progress reporting, and tracing
//!   subscribers
//! - `webp-support` (default): WebP image format support
//! - `tracing-json`: JSON-formatted tracing output
//! - `tracing-files`: daily-rotated tracing log files
//!
//! ### Library-Only Usage
//!
//! To use only as a library without CLI dependencies:
//!
//! ```toml
//! [dependencies]
//! streetshot = { version = "0.1", default-features = false }
//! ```

pub mod catalog;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod filter;
pub mod geo;
pub mod notify;
pub mod pipeline;
pub mod provider;
pub mod query;
pub mod services;
#[cfg(feature = "cli")]
pub mod tracing_config;

use std::path::Path;

// Public API exports
pub use catalog::{AoiId, AoiRegistry, ImageCatalog, ImageId};
pub use config::{PipelineConfig, PipelineConfigBuilder};
pub use error::{Result, StreetshotError};
pub use filter::{
    brightness_score, crop, detect_and_annotate, detect_regions, draw_regions, render_curve,
    render_lines, resize_exact, resize_to_width, rotate, sharpness_score, Histogram,
    RegionDetector, DEFAULT_BRIGHTNESS_THRESHOLD, DEFAULT_SHARPNESS_THRESHOLD,
};
pub use geo::{AreaOfInterest, Region};
pub use notify::CompletionPinger;
pub use pipeline::{
    AcquisitionPipeline, DownloadOutcome, DownloadReport, DownloadedAsset, SearchOutcome,
};
pub use provider::{
    types::{AoiDescriptor, FeatureCollection, ImageRecord},
    HttpImageryProvider, ImageryProvider,
};
pub use query::{DateRange, FeedOptions, SearchQuery, SizeVariant, SortField, SortOrder};
pub use services::ImageStore;

#[cfg(feature = "cli")]
pub use tracing_config::{
    events, init_cli_tracing, init_library_tracing, spans, TracingConfig, TracingFormat,
    TracingOutput,
};

/// Search around an address and download everything it matched in one call
///
/// This is the one-shot acquisition API: it builds a pipeline from the
/// configuration, runs the search, and downloads the matching images into
/// `dest_dir`. Callers that issue several overlapping searches should hold an
/// [`AcquisitionPipeline`] instead so the catalog persists between calls.
///
/// # Arguments
///
/// * `address` - Street address to search around
/// * `radius_meters` - Optional search radius in meters
/// * `dest_dir` - Directory the downloaded images are written into
/// * `config` - Session configuration (endpoint, key, size variant)
///
/// # Returns
///
/// The search and download outcomes as a pair; per-item download failures are
/// reported inside the download outcome, not as an `Err`.
///
/// # Examples
///
/// ```rust,no_run
/// use streetshot::{acquire_by_address, PipelineConfig};
/// use std::path::Path;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = PipelineConfig::builder()
///     .base_url("https://imagery.example.com/v1")
///     .api_key("secret")
///     .build()?;
/// let (search, download) = acquire_by_address(
///     "850 Broadway, New York, NY 10003",
///     Some(1000),
///     Path::new("downloads"),
///     config,
/// )
/// .await?;
/// println!("matched {} image(s)", search.matched.len());
/// # Ok(())
/// # }
/// ```
pub async fn acquire_by_address(
    address: &str,
    radius_meters: Option<u32>,
    dest_dir: &Path,
    config: PipelineConfig,
) -> Result<(SearchOutcome, DownloadOutcome)> {
    let mut pipeline = AcquisitionPipeline::new(config)?;
    pipeline
        .download_by_address(address, radius_meters, dest_dir)
        .await
}

/// Search a polygon and download everything it matched in one call
///
/// The polygon counterpart of [`acquire_by_address`]; see there for the
/// catalog semantics.
///
/// # Examples
///
/// ```rust,no_run
/// use streetshot::{acquire_by_area, AreaOfInterest, PipelineConfig};
/// use std::path::Path;
///
/// # async fn example() -> anyhow::Result<()> {
/// let area = AreaOfInterest::from_lon_lat_pairs(&[
///     (-73.987_084, 40.733_073),
///     (-73.980_606, 40.730_386),
///     (-73.986_275, 40.722_556),
///     (-73.992_222, 40.724_334),
/// ])?;
/// let config = PipelineConfig::builder()
///     .base_url("https://imagery.example.com/v1")
///     .api_key("secret")
///     .build()?;
/// let (search, download) = acquire_by_area(area, None, Path::new("downloads"), config).await?;
/// println!("matched {} image(s)", search.matched.len());
/// # Ok(())
/// # }
/// ```
pub async fn acquire_by_area(
    area: AreaOfInterest,
    radius_meters: Option<u32>,
    dest_dir: &Path,
    config: PipelineConfig,
) -> Result<(SearchOutcome, DownloadOutcome)> {
    let mut pipeline = AcquisitionPipeline::new(config)?;
    pipeline
        .download_by_area(area, radius_meters, dest_dir)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_api_compiles() {
        // Basic compilation test to ensure API is well-formed
        let _config = PipelineConfig::default();
        let _query = SearchQuery::by_address("850 Broadway");
        // API compiles successfully if we reach this point
    }
}
