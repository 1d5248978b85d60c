//! Image file I/O service
//!
//! This module separates file I/O operations from acquisition and
//! post-processing logic, making the system more testable and maintainable.

use crate::error::{Result, StreetshotError};
use image::DynamicImage;
use std::path::{Path, PathBuf};

/// Service for handling image file input/output operations
pub struct ImageStore;

impl ImageStore {
    /// Load an image from a file path.
    ///
    /// Decoding first trusts the file extension; when that fails the bytes
    /// are sniffed for a known format, so mislabeled downloads still load.
    ///
    /// # Errors
    /// Returns an error when the file is missing or cannot be decoded by
    /// either method.
    ///
    /// # Examples
    /// ```rust,no_run
    /// use streetshot::services::ImageStore;
    ///
    /// let image = ImageStore::load_image("downloads/1527.jpg")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load_image<P: AsRef<Path>>(path: P) -> Result<DynamicImage> {
        let path_ref = path.as_ref();

        if !path_ref.exists() {
            return Err(StreetshotError::file_io_error(
                "read image file",
                path_ref,
                std::io::Error::new(std::io::ErrorKind::NotFound, "file does not exist"),
            ));
        }

        match image::open(path_ref) {
            Ok(img) => Ok(img),
            Err(e) => {
                log::debug!(
                    "Extension-based loading failed for {}: {}. Attempting content-based detection.",
                    path_ref.display(),
                    e
                );

                let data = std::fs::read(path_ref).map_err(|io_err| {
                    StreetshotError::file_io_error("read image data", path_ref, io_err)
                })?;

                image::load_from_memory(&data)
                    .map_err(|content_err| StreetshotError::image_load_error(path_ref, content_err))
            },
        }
    }

    /// Save an image to a file, creating parent directories as needed.
    ///
    /// The output format is taken from the file extension. JPEG output is
    /// flattened to RGB first since the encoder rejects alpha channels.
    ///
    /// # Errors
    /// Returns an error when the extension names no supported format or
    /// encoding fails.
    ///
    /// # Examples
    /// ```rust,no_run
    /// use streetshot::services::ImageStore;
    /// use image::DynamicImage;
    ///
    /// # let image = DynamicImage::new_rgb8(100, 100);
    /// ImageStore::save_image(&image, "thumbnails/1527.jpg")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn save_image<P: AsRef<Path>>(image: &DynamicImage, path: P) -> Result<()> {
        let path_ref = path.as_ref();

        if let Some(parent) = path_ref.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    StreetshotError::file_io_error("create output directory", parent, e)
                })?;
            }
        }

        let format = image::ImageFormat::from_path(path_ref)
            .map_err(|e| StreetshotError::image_save_error(path_ref, e))?;

        let result = if format == image::ImageFormat::Jpeg {
            DynamicImage::ImageRgb8(image.to_rgb8()).save_with_format(path_ref, format)
        } else {
            image.save_with_format(path_ref, format)
        };
        result.map_err(|e| StreetshotError::image_save_error(path_ref, e))
    }

    /// Decode an image from raw bytes, sniffing the format from content
    ///
    /// # Errors
    /// Returns an error when the bytes match no supported format.
    pub fn load_from_bytes(bytes: &[u8]) -> Result<DynamicImage> {
        image::load_from_memory(bytes).map_err(StreetshotError::Image)
    }

    /// Check if a file path has a supported image extension
    pub fn is_supported_format<P: AsRef<Path>>(path: P) -> bool {
        let path_ref = path.as_ref();

        if let Some(extension) = path_ref.extension() {
            if let Some(ext_str) = extension.to_str() {
                let ext_lower = ext_str.to_lowercase();
                matches!(
                    ext_lower.as_str(),
                    "jpg" | "jpeg" | "png" | "webp" | "tiff" | "tif" | "bmp"
                )
            } else {
                false
            }
        } else {
            false
        }
    }

    /// List the image files directly inside a directory, sorted by name.
    ///
    /// Non-image entries and subdirectories are skipped. An empty directory
    /// yields an empty list, not an error.
    ///
    /// # Errors
    /// Returns an error when the directory cannot be read.
    pub fn list_images<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
        let dir_ref = dir.as_ref();
        let entries = std::fs::read_dir(dir_ref)
            .map_err(|e| StreetshotError::file_io_error("read image directory", dir_ref, e))?;

        let mut images = Vec::new();
        for entry in entries {
            let entry = entry
                .map_err(|e| StreetshotError::file_io_error("read directory entry", dir_ref, e))?;
            let path = entry.path();
            if path.is_file() && Self::is_supported_format(&path) {
                images.push(path);
            }
        }
        images.sort();
        Ok(images)
    }
}
