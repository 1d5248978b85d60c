//! Pure post-processing operations on downloaded rasters
//!
//! Stateless transforms and quality scores applied between download and
//! downstream consumption. Every operation takes an in-memory image and
//! returns a new one; nothing here touches disk or the network.

pub mod detect;
pub mod histogram;

pub use detect::{detect_and_annotate, detect_regions, draw_regions, RegionDetector};
pub use histogram::{render_curve, render_lines, Histogram};

use crate::error::{Result, StreetshotError};
use crate::geo::Region;
use image::{imageops::FilterType, DynamicImage, GenericImageView, GrayImage, Rgb, RgbImage};

/// Sharpness score below which an image is considered blurry.
///
/// Deliberately high so that dark or low-quality captures do not pass the
/// quality gate.
pub const DEFAULT_SHARPNESS_THRESHOLD: f64 = 600.0;

/// Mean luminance below which an image is considered too dark to review
pub const DEFAULT_BRIGHTNESS_THRESHOLD: f64 = 40.0;

/// Scale an image to `target_width` preserving its aspect ratio.
///
/// The new height is `round(height * target_width / width)`, so the result
/// never looks skewed or distorted.
///
/// # Errors
/// Returns `StreetshotError::InvalidRegion` for a zero target width.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
// Casting is acceptable for image processing math - precision loss is expected
pub fn resize_to_width(image: &DynamicImage, target_width: u32) -> Result<DynamicImage> {
    if target_width == 0 {
        return Err(StreetshotError::invalid_region(
            "resize target width must be positive",
        ));
    }

    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(StreetshotError::invalid_region(
            "cannot resize an empty image",
        ));
    }
    let scale = f64::from(target_width) / f64::from(width);
    // Degenerate aspect ratios still get a one-pixel row
    let target_height = ((f64::from(height) * scale).round() as u32).max(1);
    Ok(image.resize_exact(target_width, target_height, FilterType::Triangle))
}

/// Scale an image to exact dimensions, ignoring its aspect ratio
///
/// # Errors
/// Returns `StreetshotError::InvalidRegion` when either dimension is zero.
pub fn resize_exact(image: &DynamicImage, width: u32, height: u32) -> Result<DynamicImage> {
    if width == 0 || height == 0 {
        return Err(StreetshotError::invalid_region(
            "resize dimensions must be positive",
        ));
    }
    Ok(image.resize_exact(width, height, FilterType::Triangle))
}

/// Extract a rectangular region from an image
///
/// # Errors
/// Returns `StreetshotError::InvalidRegion` when the region is empty or
/// extends past the image bounds.
pub fn crop(image: &DynamicImage, region: Region) -> Result<DynamicImage> {
    validate_region(image, region)?;
    Ok(image.crop_imm(region.x, region.y, region.width, region.height))
}

fn validate_region(image: &DynamicImage, region: Region) -> Result<()> {
    let (width, height) = image.dimensions();
    if region.is_empty() {
        return Err(StreetshotError::invalid_region(format!(
            "region at ({}, {}) has no area",
            region.x, region.y
        )));
    }

    let right = region.x.checked_add(region.width);
    let bottom = region.y.checked_add(region.height);
    match (right, bottom) {
        (Some(r), Some(b)) if r <= width && b <= height => Ok(()),
        _ => Err(StreetshotError::invalid_region(format!(
            "region {}x{} at ({}, {}) exceeds image bounds {}x{}",
            region.width, region.height, region.x, region.y, width, height
        ))),
    }
}

/// Rotate an image about its center onto a canvas of the original size.
///
/// Positive degrees rotate counter-clockwise. Content leaving the canvas is
/// clipped and uncovered pixels are black, so rotated frames keep the fixed
/// dimensions the rest of the pipeline expects.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
// Casting is acceptable for image processing math - precision loss is expected
#[must_use]
pub fn rotate(image: &DynamicImage, degrees: f64) -> DynamicImage {
    let rgb = image.to_rgb8();
    let (width, height) = rgb.dimensions();
    let center_x = f64::from(width) / 2.0;
    let center_y = f64::from(height) / 2.0;
    let (sin, cos) = degrees.to_radians().sin_cos();

    let mut canvas = RgbImage::from_pixel(width, height, Rgb([0, 0, 0]));
    for (x, y, pixel) in canvas.enumerate_pixels_mut() {
        let dx = f64::from(x) - center_x;
        let dy = f64::from(y) - center_y;
        // Inverse mapping: walk destination pixels, sample the source
        let src_x = cos * dx - sin * dy + center_x;
        let src_y = sin * dx + cos * dy + center_y;
        *pixel = sample_bilinear(&rgb, src_x, src_y);
    }
    DynamicImage::ImageRgb8(canvas)
}

/// Bilinear sample with taps outside the image reading black
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::indexing_slicing)]
// Channel arrays are fixed-size three-element arrays indexed 0..3
fn sample_bilinear(image: &RgbImage, x: f64, y: f64) -> Rgb<u8> {
    let (width, height) = image.dimensions();
    let x0 = x.floor() as i64;
    let y0 = y.floor() as i64;
    let fx = x - x.floor();
    let fy = y - y.floor();

    let tap = |tx: i64, ty: i64| -> [f64; 3] {
        if tx < 0 || ty < 0 || tx >= i64::from(width) || ty >= i64::from(height) {
            return [0.0; 3];
        }
        let p = image.get_pixel(tx as u32, ty as u32);
        [f64::from(p[0]), f64::from(p[1]), f64::from(p[2])]
    };

    let p00 = tap(x0, y0);
    let p10 = tap(x0 + 1, y0);
    let p01 = tap(x0, y0 + 1);
    let p11 = tap(x0 + 1, y0 + 1);

    Rgb(std::array::from_fn(|c| {
        let top = p00[c] * (1.0 - fx) + p10[c] * fx;
        let bottom = p01[c] * (1.0 - fx) + p11[c] * fx;
        (top * (1.0 - fy) + bottom * fy).round() as u8
    }))
}

/// Variance of the Laplacian response over the grayscale image, a focus
/// measure.
///
/// A flat image has no edges and scores exactly 0; sharp, busy frames score
/// in the thousands. Scores below [`DEFAULT_SHARPNESS_THRESHOLD`] usually
/// mean motion blur or heavy defocus.
#[allow(clippy::cast_precision_loss)]
// Pixel counts fit f64 exactly for any realistic image
#[must_use]
pub fn sharpness_score(image: &DynamicImage) -> f64 {
    let gray = image.to_luma8();
    let (width, height) = gray.dimensions();
    let count = u64::from(width) * u64::from(height);
    if count == 0 {
        return 0.0;
    }

    let mut responses = Vec::with_capacity(count as usize);
    for y in 0..height {
        for x in 0..width {
            let center = luma_reflected(&gray, i64::from(x), i64::from(y));
            let neighbors = luma_reflected(&gray, i64::from(x) - 1, i64::from(y))
                + luma_reflected(&gray, i64::from(x) + 1, i64::from(y))
                + luma_reflected(&gray, i64::from(x), i64::from(y) - 1)
                + luma_reflected(&gray, i64::from(x), i64::from(y) + 1);
            responses.push(neighbors - 4.0 * center);
        }
    }

    let mean = responses.iter().sum::<f64>() / responses.len() as f64;
    responses.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / responses.len() as f64
}

/// Sample the grayscale image with edge coordinates reflected inward
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
// Reflection keeps both coordinates within image bounds
fn luma_reflected(image: &GrayImage, x: i64, y: i64) -> f64 {
    let reflect = |v: i64, len: i64| -> i64 {
        if len == 1 {
            return 0;
        }
        let v = v.abs();
        if v >= len {
            2 * (len - 1) - v
        } else {
            v
        }
    };
    let cx = reflect(x, i64::from(image.width()));
    let cy = reflect(y, i64::from(image.height()));
    f64::from(image.get_pixel(cx as u32, cy as u32).0[0])
}

/// Mean 8-bit luminance of the image, 0 (black) to 255 (white).
///
/// Scores below [`DEFAULT_BRIGHTNESS_THRESHOLD`] usually mean the frame was
/// captured at night or inside a tunnel.
#[allow(clippy::cast_precision_loss)]
// Pixel counts fit f64 exactly for any realistic image
#[must_use]
pub fn brightness_score(image: &DynamicImage) -> f64 {
    let gray = image.to_luma8();
    let count = u64::from(gray.width()) * u64::from(gray.height());
    if count == 0 {
        return 0.0;
    }
    let total: u64 = gray.pixels().map(|p| u64::from(p.0[0])).sum();
    total as f64 / count as f64
}
