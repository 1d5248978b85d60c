//! Intensity histograms and their rendered forms
//!
//! Rendered histograms mirror classic review tooling: a 256x300 black
//! canvas with one column per bin, counts min-max scaled to 0..=255 and the
//! origin at the bottom-left corner.

use image::{DynamicImage, GrayImage, Rgb, RgbImage};

/// Width in pixels of a rendered histogram canvas, one column per bin
pub const RENDER_WIDTH: u32 = 256;

/// Height in pixels of a rendered histogram canvas
pub const RENDER_HEIGHT: u32 = 300;

/// Line colors for the red, green and blue channel curves
const CURVE_COLORS: [Rgb<u8>; 3] = [Rgb([255, 0, 0]), Rgb([0, 255, 0]), Rgb([0, 0, 255])];

/// Line color for single-channel renderings
const MONO_COLOR: Rgb<u8> = Rgb([255, 255, 255]);

/// 256-bin intensity histogram of one 8-bit channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Histogram {
    bins: [u64; 256],
}

impl Histogram {
    /// Histogram of a grayscale frame
    #[must_use]
    pub fn of_gray(image: &GrayImage) -> Self {
        let mut bins = [0u64; 256];
        for pixel in image.pixels() {
            if let Some(bin) = bins.get_mut(usize::from(pixel.0[0])) {
                *bin += 1;
            }
        }
        Self { bins }
    }

    /// Raw bin counts
    #[must_use]
    pub fn bins(&self) -> &[u64; 256] {
        &self.bins
    }

    /// Total number of counted pixels
    #[must_use]
    pub fn total(&self) -> u64 {
        self.bins.iter().sum()
    }

    /// Count in the fullest bin
    #[must_use]
    pub fn peak(&self) -> u64 {
        self.bins.iter().copied().max().unwrap_or(0)
    }

    /// Bin counts min-max scaled to 0..=255, ready for rendering.
    ///
    /// A histogram where every bin holds the same count scales to all zeros.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    // Scaled values are in 0..=255 by construction
    #[must_use]
    pub fn scaled(&self) -> [u8; 256] {
        let min = self.bins.iter().copied().min().unwrap_or(0);
        let max = self.bins.iter().copied().max().unwrap_or(0);
        let mut scaled = [0u8; 256];
        if max == min {
            return scaled;
        }
        let range = (max - min) as f64;
        for (slot, &count) in scaled.iter_mut().zip(self.bins.iter()) {
            *slot = (((count - min) as f64) * 255.0 / range).round() as u8;
        }
        scaled
    }
}

/// Histogram of one channel of an RGB frame
fn of_channel(image: &RgbImage, channel: usize) -> Histogram {
    let mut bins = [0u64; 256];
    for pixel in image.pixels() {
        let value = pixel.0.get(channel).copied().unwrap_or(0);
        if let Some(bin) = bins.get_mut(usize::from(value)) {
            *bin += 1;
        }
    }
    Histogram { bins }
}

/// Render per-channel histogram curves onto a 256x300 canvas.
///
/// Color images get one polyline per channel in that channel's color; with
/// `grayscale` set the image is flattened first and drawn as a single white
/// polyline.
#[must_use]
pub fn render_curve(image: &DynamicImage, grayscale: bool) -> RgbImage {
    let mut canvas = RgbImage::from_pixel(RENDER_WIDTH, RENDER_HEIGHT, Rgb([0, 0, 0]));
    if grayscale {
        let hist = Histogram::of_gray(&image.to_luma8());
        draw_polyline(&mut canvas, &hist.scaled(), MONO_COLOR);
    } else {
        let rgb = image.to_rgb8();
        for (channel, color) in CURVE_COLORS.iter().enumerate() {
            let hist = of_channel(&rgb, channel);
            draw_polyline(&mut canvas, &hist.scaled(), *color);
        }
    }
    canvas
}

/// Render a grayscale histogram as vertical bars, optionally stretching or
/// equalizing the intensities first.
///
/// Returns the rendered canvas together with the processed grayscale frame
/// the histogram was computed from, so callers can save both.
#[must_use]
pub fn render_lines(image: &DynamicImage, normalize: bool, equalize: bool) -> (RgbImage, GrayImage) {
    let mut gray = image.to_luma8();
    if normalize {
        gray = stretch_contrast(&gray);
    }
    if equalize {
        gray = equalize_intensity(&gray);
    }

    let hist = Histogram::of_gray(&gray);
    let mut canvas = RgbImage::from_pixel(RENDER_WIDTH, RENDER_HEIGHT, Rgb([0, 0, 0]));
    #[allow(clippy::cast_possible_truncation)]
    // Bin index is at most 255
    for (x, height) in hist.scaled().iter().enumerate() {
        line_segment(&mut canvas, x as u32, 0, x as u32, u32::from(*height), MONO_COLOR);
    }
    (canvas, gray)
}

/// Linearly stretch intensities so the darkest pixel maps to 0 and the
/// brightest to 255. A constant image is returned unchanged.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
// Stretched values are in 0..=255 by construction
#[must_use]
pub fn stretch_contrast(image: &GrayImage) -> GrayImage {
    let min = image.pixels().map(|p| p.0[0]).min().unwrap_or(0);
    let max = image.pixels().map(|p| p.0[0]).max().unwrap_or(0);
    if max == min {
        return image.clone();
    }

    let range = f64::from(max - min);
    let mut out = image.clone();
    for pixel in out.pixels_mut() {
        let value = f64::from(pixel.0[0] - min);
        pixel.0[0] = (value * 255.0 / range).round() as u8;
    }
    out
}

/// Spread the intensity distribution with the cumulative-histogram mapping.
///
/// Washed-out frames come back using the full 0..=255 range, which makes
/// their histograms reviewable. A single-intensity image is returned
/// unchanged.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
// Mapped values are in 0..=255 by construction
#[must_use]
pub fn equalize_intensity(image: &GrayImage) -> GrayImage {
    let hist = Histogram::of_gray(image);
    let total = hist.total();
    if total == 0 {
        return image.clone();
    }

    let mut cdf = [0u64; 256];
    let mut cumulative = 0u64;
    for (slot, &count) in cdf.iter_mut().zip(hist.bins().iter()) {
        cumulative += count;
        *slot = cumulative;
    }

    let cdf_min = cdf.iter().copied().find(|&v| v > 0).unwrap_or(0);
    let denominator = total - cdf_min;
    if denominator == 0 {
        return image.clone();
    }

    let mut lut = [0u8; 256];
    for (slot, &c) in lut.iter_mut().zip(cdf.iter()) {
        if c > cdf_min {
            *slot = (((c - cdf_min) as f64) * 255.0 / (denominator as f64)).round() as u8;
        }
    }

    let mut out = image.clone();
    for pixel in out.pixels_mut() {
        pixel.0[0] = lut.get(usize::from(pixel.0[0])).copied().unwrap_or(0);
    }
    out
}

/// Connect the scaled bin heights into one polyline
#[allow(clippy::cast_possible_truncation)]
// Bin index is at most 255
fn draw_polyline(canvas: &mut RgbImage, heights: &[u8; 256], color: Rgb<u8>) {
    for (x, pair) in heights.windows(2).enumerate() {
        if let [y0, y1] = pair {
            line_segment(
                canvas,
                x as u32,
                u32::from(*y0),
                x as u32 + 1,
                u32::from(*y1),
                color,
            );
        }
    }
}

/// Integer line walk between two points in bottom-origin coordinates
fn line_segment(canvas: &mut RgbImage, x0: u32, y0: u32, x1: u32, y1: u32, color: Rgb<u8>) {
    let (mut x, mut y) = (i64::from(x0), i64::from(y0));
    let (tx, ty) = (i64::from(x1), i64::from(y1));
    let dx = (tx - x).abs();
    let dy = -(ty - y).abs();
    let sx = if x < tx { 1 } else { -1 };
    let sy = if y < ty { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        put_flipped(canvas, x, y, color);
        if x == tx && y == ty {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

/// Plot a point with the y axis growing upward from the bottom edge
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
// Coordinates are bounds-checked before the cast
fn put_flipped(canvas: &mut RgbImage, x: i64, y: i64, color: Rgb<u8>) {
    let width = i64::from(canvas.width());
    let height = i64::from(canvas.height());
    if x >= 0 && x < width && y >= 0 && y < height {
        canvas.put_pixel(x as u32, (height - 1 - y) as u32, color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Luma};

    fn flat_gray(value: u8) -> GrayImage {
        ImageBuffer::from_pixel(16, 16, Luma([value]))
    }

    #[test]
    fn test_gray_histogram_counts_pixels() {
        let mut img = flat_gray(64);
        img.put_pixel(0, 0, Luma([200]));
        img.put_pixel(1, 0, Luma([200]));

        let hist = Histogram::of_gray(&img);
        assert_eq!(hist.bins()[64], 254);
        assert_eq!(hist.bins()[200], 2);
        assert_eq!(hist.total(), 256);
        assert_eq!(hist.peak(), 254);
    }

    #[test]
    fn test_scaled_puts_peak_at_full_height() {
        let hist = Histogram::of_gray(&flat_gray(64));
        let scaled = hist.scaled();
        assert_eq!(scaled[64], 255);
        assert_eq!(scaled[0], 0);
        assert_eq!(scaled[255], 0);
    }

    #[test]
    fn test_scaled_of_uniform_histogram_is_flat() {
        // One pixel of every intensity: all bins equal, nothing to scale
        let img: GrayImage = ImageBuffer::from_fn(16, 16, |x, y| Luma([(y * 16 + x) as u8]));
        let hist = Histogram::of_gray(&img);
        assert!(hist.scaled().iter().all(|&v| v == 0));
    }

    #[test]
    fn test_render_curve_dimensions_and_peak() {
        let image = DynamicImage::ImageLuma8(flat_gray(64));
        let canvas = render_curve(&image, true);
        assert_eq!(canvas.dimensions(), (RENDER_WIDTH, RENDER_HEIGHT));

        // The peak bin renders at full height near the top of the canvas
        assert_eq!(canvas.get_pixel(64, RENDER_HEIGHT - 1 - 255), &MONO_COLOR);
    }

    #[test]
    fn test_render_curve_color_uses_channel_colors() {
        let img: RgbImage = ImageBuffer::from_pixel(16, 16, Rgb([10, 128, 240]));
        let canvas = render_curve(&DynamicImage::ImageRgb8(img), false);

        assert_eq!(canvas.get_pixel(10, RENDER_HEIGHT - 1 - 255), &Rgb([255, 0, 0]));
        assert_eq!(canvas.get_pixel(128, RENDER_HEIGHT - 1 - 255), &Rgb([0, 255, 0]));
        assert_eq!(canvas.get_pixel(240, RENDER_HEIGHT - 1 - 255), &Rgb([0, 0, 255]));
    }

    #[test]
    fn test_render_lines_draws_vertical_bar() {
        let image = DynamicImage::ImageLuma8(flat_gray(100));
        let (canvas, gray) = render_lines(&image, false, false);

        assert_eq!(canvas.dimensions(), (RENDER_WIDTH, RENDER_HEIGHT));
        assert_eq!(gray.dimensions(), (16, 16));
        // Full-height bar in the peak column, nothing partway up elsewhere
        assert_eq!(canvas.get_pixel(100, RENDER_HEIGHT - 1 - 255), &MONO_COLOR);
        assert_eq!(canvas.get_pixel(100, RENDER_HEIGHT - 1), &MONO_COLOR);
        assert_eq!(canvas.get_pixel(50, RENDER_HEIGHT - 1 - 100), &Rgb([0, 0, 0]));
    }

    #[test]
    fn test_stretch_contrast_uses_full_range() {
        let mut img = flat_gray(100);
        img.put_pixel(0, 0, Luma([50]));
        img.put_pixel(1, 0, Luma([150]));

        let stretched = stretch_contrast(&img);
        let values: Vec<u8> = stretched.pixels().map(|p| p.0[0]).collect();
        assert_eq!(*values.iter().min().unwrap(), 0);
        assert_eq!(*values.iter().max().unwrap(), 255);
        // Midpoint maps to the middle of the range
        assert_eq!(stretched.get_pixel(2, 0), &Luma([128]));
    }

    #[test]
    fn test_stretch_contrast_of_constant_image_is_identity() {
        let img = flat_gray(77);
        assert_eq!(stretch_contrast(&img).as_raw(), img.as_raw());
    }

    #[test]
    fn test_equalize_spreads_two_level_image() {
        let img: GrayImage =
            ImageBuffer::from_fn(16, 16, |x, _| if x < 8 { Luma([100]) } else { Luma([200]) });
        let equalized = equalize_intensity(&img);

        assert_eq!(equalized.get_pixel(0, 0), &Luma([0]));
        assert_eq!(equalized.get_pixel(15, 0), &Luma([255]));
    }

    #[test]
    fn test_equalize_of_constant_image_is_identity() {
        let img = flat_gray(42);
        assert_eq!(equalize_intensity(&img).as_raw(), img.as_raw());
    }

    #[test]
    fn test_render_lines_applies_processing_before_counting() {
        let mut img = flat_gray(100);
        img.put_pixel(0, 0, Luma([50]));
        img.put_pixel(1, 0, Luma([150]));

        let (_, gray) = render_lines(&DynamicImage::ImageLuma8(img), true, false);
        let values: Vec<u8> = gray.pixels().map(|p| p.0[0]).collect();
        assert_eq!(*values.iter().min().unwrap(), 0);
        assert_eq!(*values.iter().max().unwrap(), 255);
    }
}
