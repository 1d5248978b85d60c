//! Pluggable region detection over grayscale frames
//!
//! Detection backends vary wildly (cascade classifiers, remote services,
//! fixed grids in tests), so the pipeline only depends on the
//! [`RegionDetector`] capability and handles the annotation drawing itself.

use crate::geo::Region;
use image::{DynamicImage, GrayImage, Rgb, RgbImage};

/// Color of the annotation outlines
const OUTLINE_COLOR: Rgb<u8> = Rgb([0, 255, 0]);

/// Outline thickness in pixels
const OUTLINE_THICKNESS: u32 = 2;

/// Capability interface for finding regions of interest in a frame.
///
/// Implementations receive the grayscale rendition of the image and return
/// zero or more pixel rectangles. Returning an empty vector is the normal
/// "nothing found" outcome, not an error.
pub trait RegionDetector: Send + Sync {
    /// Find regions of interest in a grayscale frame
    fn detect(&self, frame: &GrayImage) -> Vec<Region>;
}

/// Any `Fn(&GrayImage) -> Vec<Region>` closure is a detector
impl<F> RegionDetector for F
where
    F: Fn(&GrayImage) -> Vec<Region> + Send + Sync,
{
    fn detect(&self, frame: &GrayImage) -> Vec<Region> {
        self(frame)
    }
}

/// Run a detector over the grayscale rendition of an image
pub fn detect_regions(image: &DynamicImage, detector: &dyn RegionDetector) -> Vec<Region> {
    let gray = image.to_luma8();
    detector.detect(&gray)
}

/// Draw outlines around `regions` on a copy of the image.
///
/// Regions reaching past the canvas are clipped, never rejected: detectors
/// sometimes report boxes nudged over the frame edge and those annotations
/// are still worth seeing.
#[must_use]
pub fn draw_regions(image: &DynamicImage, regions: &[Region]) -> RgbImage {
    let mut canvas = image.to_rgb8();
    for region in regions {
        draw_outline(&mut canvas, *region);
    }
    canvas
}

/// Detect regions and annotate them in one pass.
///
/// Returns the detected regions together with the annotated copy, which is
/// what review tooling wants to display.
pub fn detect_and_annotate(
    image: &DynamicImage,
    detector: &dyn RegionDetector,
) -> (Vec<Region>, RgbImage) {
    let regions = detect_regions(image, detector);
    let annotated = draw_regions(image, &regions);
    (regions, annotated)
}

fn draw_outline(canvas: &mut RgbImage, region: Region) {
    let (width, height) = canvas.dimensions();
    let x0 = region.x.min(width);
    let y0 = region.y.min(height);
    let x1 = region.x.saturating_add(region.width).min(width);
    let y1 = region.y.saturating_add(region.height).min(height);
    if x0 >= x1 || y0 >= y1 {
        return;
    }

    let t = OUTLINE_THICKNESS;
    for y in y0..y0.saturating_add(t).min(y1) {
        for x in x0..x1 {
            canvas.put_pixel(x, y, OUTLINE_COLOR);
        }
    }
    for y in y1.saturating_sub(t).max(y0)..y1 {
        for x in x0..x1 {
            canvas.put_pixel(x, y, OUTLINE_COLOR);
        }
    }
    for x in x0..x0.saturating_add(t).min(x1) {
        for y in y0..y1 {
            canvas.put_pixel(x, y, OUTLINE_COLOR);
        }
    }
    for x in x1.saturating_sub(t).max(x0)..x1 {
        for y in y0..y1 {
            canvas.put_pixel(x, y, OUTLINE_COLOR);
        }
    }
}
