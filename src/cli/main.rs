//! Street Imagery Acquisition CLI Tool
//!
//! Command-line interface for searching, downloading, and post-processing
//! street-level imagery through the acquisition pipeline.

use super::config::CliConfigBuilder;
use crate::{
    filter,
    geo::AreaOfInterest,
    notify::CompletionPinger,
    pipeline::{AcquisitionPipeline, DownloadOutcome},
    query::{DateRange, SearchQuery},
    services::ImageStore,
};
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use image::DynamicImage;
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Street imagery acquisition CLI tool
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(name = "streetshot")]
pub struct Cli {
    /// Provider API base URL [env: STREETSHOT_API_URL]
    #[arg(long, value_name = "URL")]
    pub api_url: Option<String>,

    /// Provider API key [env: STREETSHOT_API_KEY]
    #[arg(long, value_name = "KEY")]
    pub api_key: Option<String>,

    /// Size variant to download
    #[arg(long, value_enum, default_value_t = CliSizeVariant::Small)]
    pub size: CliSizeVariant,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,

    /// Enable verbose logging (-v: DEBUG, -vv: TRACE)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Acquisition and processing subcommands
#[derive(Subcommand)]
pub enum Command {
    /// Search the provider and report the resulting catalog
    Search {
        #[command(flatten)]
        location: LocationArgs,

        /// Print catalog image identifiers one per line instead of a summary
        #[arg(long)]
        ids: bool,
    },

    /// Search, then download every cataloged image to a directory
    Download {
        #[command(flatten)]
        location: LocationArgs,

        /// Destination directory for downloaded images
        #[arg(short, long, value_name = "DIR", default_value = "downloads")]
        output: PathBuf,
    },

    /// Post-process a directory of downloaded images
    Process {
        /// Directory of images to process
        #[arg(value_name = "DIR")]
        input: PathBuf,

        /// Output directory [default: <DIR>/processed]
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        /// Process the input directory recursively
        #[arg(short, long)]
        recursive: bool,

        /// Resize every image to this width, preserving aspect ratio
        #[arg(long, value_name = "PIXELS", default_value_t = 640)]
        thumbnail_width: u32,

        /// Rotate every image by this many degrees counter-clockwise
        #[arg(long, value_name = "DEGREES")]
        rotate: Option<f64>,

        /// Write a channel-histogram rendering next to each processed image
        #[arg(long)]
        histogram: bool,

        /// Print a sharpness and brightness report instead of writing files
        #[arg(long)]
        report: bool,
    },

    /// Search, download, and thumbnail in one pass, pinging a completion
    /// endpoint once per saved image
    Run {
        #[command(flatten)]
        location: LocationArgs,

        /// Destination directory for downloaded images
        #[arg(short, long, value_name = "DIR", default_value = "downloads")]
        output: PathBuf,

        /// Thumbnail width in pixels
        #[arg(long, value_name = "PIXELS", default_value_t = 640)]
        thumbnail_width: u32,

        /// Completion endpoint pinged once per downloaded image
        #[arg(long, value_name = "URL")]
        ping_url: Option<String>,
    },
}

/// Where to search: a polygon or an address
#[derive(Args)]
pub struct LocationArgs {
    /// Polygon vertex as "lon,lat"; repeat 4 to 6 times
    #[arg(
        long = "vertex",
        value_name = "LON,LAT",
        value_parser = parse_lon_lat,
        conflicts_with = "address"
    )]
    pub vertices: Vec<(f64, f64)>,

    /// Street address to search around
    #[arg(long, value_name = "ADDRESS")]
    pub address: Option<String>,

    /// Search radius in meters (address searches)
    #[arg(long, value_name = "METERS")]
    pub radius: Option<u32>,

    /// Only images captured within the last N days
    #[arg(long, value_name = "DAYS")]
    pub days: Option<u32>,

    /// Maximum images per search (1-5000)
    #[arg(long, value_name = "COUNT")]
    pub limit: Option<u32>,
}

/// Size variants the provider serves
#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
pub enum CliSizeVariant {
    Tiny,
    Small,
    Medium,
    Large,
    Native,
}

pub async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose).context("Failed to initialize tracing")?;

    match &cli.command {
        Command::Search { location, ids } => run_search(&cli, location, *ids).await,
        Command::Download { location, output } => run_download(&cli, location, output).await,
        Command::Process {
            input,
            output,
            recursive,
            thumbnail_width,
            rotate,
            histogram,
            report,
        } => run_process(
            input,
            output.as_deref(),
            *recursive,
            *thumbnail_width,
            *rotate,
            *histogram,
            *report,
        ),
        Command::Run {
            location,
            output,
            thumbnail_width,
            ping_url,
        } => run_acquisition(&cli, location, output, *thumbnail_width, ping_url.as_deref()).await,
    }
}

/// Initialize tracing based on verbosity level
fn init_tracing(verbose_count: u8) -> Result<()> {
    use crate::tracing_config::{TracingConfig, TracingFormat};

    TracingConfig::new()
        .with_verbosity(verbose_count)
        .with_format(TracingFormat::Console)
        .init()
        .context("Failed to initialize tracing subscriber")?;

    Ok(())
}

/// Parse a "lon,lat" pair from the command line
fn parse_lon_lat(value: &str) -> std::result::Result<(f64, f64), String> {
    let mut parts = value.splitn(2, ',');
    let lon = parts
        .next()
        .ok_or_else(|| format!("'{value}' is missing a longitude"))?;
    let lat = parts
        .next()
        .ok_or_else(|| format!("'{value}' is missing a latitude; expected \"lon,lat\""))?;

    let lon: f64 = lon
        .trim()
        .parse()
        .map_err(|e| format!("invalid longitude in '{value}': {e}"))?;
    let lat: f64 = lat
        .trim()
        .parse()
        .map_err(|e| format!("invalid latitude in '{value}': {e}"))?;
    Ok((lon, lat))
}

/// Assemble a search query from the shared location arguments
fn build_query(location: &LocationArgs) -> Result<SearchQuery> {
    let mut query = if let Some(address) = &location.address {
        SearchQuery::by_address(address.clone())
    } else if location.vertices.is_empty() {
        anyhow::bail!("Provide either --address or 4 to 6 --vertex arguments");
    } else {
        let area = AreaOfInterest::from_lon_lat_pairs(&location.vertices)
            .context("Invalid search polygon")?;
        SearchQuery::by_area(area)
    };

    if let Some(radius) = location.radius {
        query = query.with_radius(radius);
    }
    if let Some(days) = location.days {
        query = query.with_date_range(DateRange::last_days(days));
    }
    if let Some(limit) = location.limit {
        query = query.with_limit(limit);
    }
    Ok(query)
}

/// Build the pipeline shared by the networked subcommands
fn build_pipeline(cli: &Cli) -> Result<AcquisitionPipeline> {
    let config = CliConfigBuilder::from_cli(cli).context("Failed to build configuration")?;
    AcquisitionPipeline::new(config).context("Failed to create acquisition pipeline")
}

async fn run_search(cli: &Cli, location: &LocationArgs, ids_only: bool) -> Result<()> {
    let mut pipeline = build_pipeline(cli)?;
    let query = build_query(location)?;

    let start_time = Instant::now();
    let outcome = pipeline.search(&query).await?;

    if ids_only {
        for id in &outcome.catalog {
            println!("{id}");
        }
        return Ok(());
    }

    info!("🔍 Search summary:");
    info!("  ├─ Matched this search: {}", outcome.matched.len());
    info!("  ├─ New to the catalog: {}", outcome.discovered.len());
    info!("  └─ Catalog size: {}", outcome.catalog.len());
    info!(
        "Search completed in {:.2}s",
        start_time.elapsed().as_secs_f64()
    );
    Ok(())
}

async fn run_download(cli: &Cli, location: &LocationArgs, output: &Path) -> Result<()> {
    let mut pipeline = build_pipeline(cli)?;
    let query = build_query(location)?;

    let start_time = Instant::now();
    let search = pipeline.search(&query).await?;
    info!("Catalog holds {} image(s) after search", search.catalog.len());

    let outcome = pipeline.download(output).await?;
    report_download(&outcome, output, start_time);
    Ok(())
}

fn report_download(outcome: &DownloadOutcome, dest: &Path, start_time: Instant) {
    match outcome {
        DownloadOutcome::NothingToDownload => {
            info!("💤 Catalog is empty; nothing to download");
        },
        DownloadOutcome::Completed(report) => {
            for (id, error) in &report.failed {
                error!("❌ Failed to download {id}: {error}");
            }
            info!("📊 Download summary:");
            info!("  ├─ Saved: {}", report.saved.len());
            info!("  ├─ Failed: {}", report.failed.len());
            info!("  ├─ Destination: {}", dest.display());
            info!(
                "  └─ Total time: {:.2}s",
                start_time.elapsed().as_secs_f64()
            );
        },
    }
}

#[allow(clippy::fn_params_excessive_bools)] // Mirrors the subcommand's flag set
fn run_process(
    input: &Path,
    output: Option<&Path>,
    recursive: bool,
    thumbnail_width: u32,
    rotate: Option<f64>,
    histogram: bool,
    report: bool,
) -> Result<()> {
    let files = collect_images(input, recursive).context("Failed to list input images")?;
    if files.is_empty() {
        warn!("No supported image files found in {}", input.display());
        return Ok(());
    }
    info!("Found {} image file(s) to process", files.len());

    if report {
        return print_quality_report(&files);
    }

    let output_dir = output.map_or_else(|| input.join("processed"), Path::to_path_buf);

    let progress = if files.len() > 1 {
        let pb = ProgressBar::new(files.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
                )
                .unwrap()
                .progress_chars("#>-"),
        );
        Some(pb)
    } else {
        None
    };

    let mut processed_count = 0;
    let mut failed_count = 0;
    let batch_start_time = Instant::now();

    for file in &files {
        if let Some(ref pb) = progress {
            pb.set_message(format!("Processing {}", file.display()));
        }

        match process_single_image(file, &output_dir, thumbnail_width, rotate, histogram) {
            Ok(()) => processed_count += 1,
            Err(e) => {
                error!("❌ Failed to process {}: {}", file.display(), e);
                failed_count += 1;
            },
        }

        if let Some(ref pb) = progress {
            pb.inc(1);
        }
    }

    if let Some(pb) = progress {
        pb.finish_with_message(format!(
            "Completed! Processed: {processed_count}, Failed: {failed_count}"
        ));
    }

    info!("📊 Processing summary:");
    info!("  ├─ Files processed: {processed_count}");
    info!("  ├─ Files failed: {failed_count}");
    info!(
        "  └─ Total time: {:.2}s",
        batch_start_time.elapsed().as_secs_f64()
    );
    Ok(())
}

fn process_single_image(
    file: &Path,
    output_dir: &Path,
    thumbnail_width: u32,
    rotate: Option<f64>,
    histogram: bool,
) -> Result<()> {
    let image = ImageStore::load_image(file)?;
    let mut processed = filter::resize_to_width(&image, thumbnail_width)?;
    if let Some(degrees) = rotate {
        processed = filter::rotate(&processed, degrees);
    }

    let file_name = file
        .file_name()
        .with_context(|| format!("Input file has no name: {}", file.display()))?;
    let dest = output_dir.join(file_name);
    ImageStore::save_image(&processed, &dest)?;

    if histogram {
        let canvas = filter::render_curve(&processed, false);
        ImageStore::save_image(&DynamicImage::ImageRgb8(canvas), histogram_path(&dest))?;
    }
    Ok(())
}

/// Find processable image files in a directory
fn collect_images(dir: &Path, recursive: bool) -> Result<Vec<PathBuf>> {
    if !recursive {
        return Ok(ImageStore::list_images(dir)?);
    }

    let mut files = Vec::new();
    for entry in walkdir::WalkDir::new(dir) {
        let entry = entry?;
        if entry.file_type().is_file() && ImageStore::is_supported_format(entry.path()) {
            files.push(entry.path().to_path_buf());
        }
    }
    files.sort();
    Ok(files)
}

/// Sibling path for a histogram rendering: `1527.jpg` becomes `1527_hist.png`
fn histogram_path(dest: &Path) -> PathBuf {
    let stem = dest
        .file_stem()
        .map_or_else(String::new, |s| s.to_string_lossy().into_owned());
    dest.with_file_name(format!("{stem}_hist.png"))
}

fn print_quality_report(files: &[PathBuf]) -> Result<()> {
    use crate::filter::{DEFAULT_BRIGHTNESS_THRESHOLD, DEFAULT_SHARPNESS_THRESHOLD};

    println!("📋 Image quality report");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let mut flagged = 0;
    for file in files {
        let image = match ImageStore::load_image(file) {
            Ok(image) => image,
            Err(e) => {
                error!("❌ Failed to load {}: {}", file.display(), e);
                continue;
            },
        };

        let sharpness = filter::sharpness_score(&image);
        let brightness = filter::brightness_score(&image);

        let mut verdicts = Vec::new();
        if sharpness < DEFAULT_SHARPNESS_THRESHOLD {
            verdicts.push("blurry");
        }
        if brightness < DEFAULT_BRIGHTNESS_THRESHOLD {
            verdicts.push("dark");
        }
        if !verdicts.is_empty() {
            flagged += 1;
        }
        let verdict = if verdicts.is_empty() {
            String::from("ok")
        } else {
            verdicts.join(", ")
        };

        println!(
            "{}: sharpness {:.1}, brightness {:.1} [{}]",
            file.display(),
            sharpness,
            brightness,
            verdict
        );
    }

    println!();
    println!("💡 Flagged {flagged} of {} image(s)", files.len());
    Ok(())
}

async fn run_acquisition(
    cli: &Cli,
    location: &LocationArgs,
    output: &Path,
    thumbnail_width: u32,
    ping_url: Option<&str>,
) -> Result<()> {
    let mut pipeline = build_pipeline(cli)?;
    let query = build_query(location)?;

    let start_time = Instant::now();
    let search = pipeline.search(&query).await?;
    info!("Catalog holds {} image(s) after search", search.catalog.len());

    let outcome = pipeline.download(output).await?;
    report_download(&outcome, output, start_time);

    let Some(report) = outcome.report() else {
        return Ok(());
    };

    let thumb_dir = output.join("thumbnails");
    let mut thumbnailed = 0;
    for asset in &report.saved {
        match thumbnail_asset(&asset.path, &thumb_dir, thumbnail_width) {
            Ok(()) => thumbnailed += 1,
            Err(e) => error!("❌ Failed to thumbnail {}: {}", asset.path.display(), e),
        }
    }
    info!(
        "🖼️  Wrote {thumbnailed} thumbnail(s) to {}",
        thumb_dir.display()
    );

    if let Some(endpoint) = ping_url {
        let pinger = CompletionPinger::new(endpoint).context("Invalid completion endpoint")?;
        let ids = report.saved_ids();
        let failures = pinger.ping_all(&ids).await;
        for (id, error) in &failures {
            warn!("⚠️  Completion ping failed for {id}: {error}");
        }
        info!(
            "📨 Pinged completion endpoint for {} of {} image(s)",
            ids.len() - failures.len(),
            ids.len()
        );
    }

    Ok(())
}

fn thumbnail_asset(path: &Path, thumb_dir: &Path, width: u32) -> Result<()> {
    let image = ImageStore::load_image(path)?;
    let thumbnail = filter::resize_to_width(&image, width)?;
    let file_name = path
        .file_name()
        .with_context(|| format!("Downloaded asset has no file name: {}", path.display()))?;
    ImageStore::save_image(&thumbnail, thumb_dir.join(file_name))?;
    Ok(())
}
