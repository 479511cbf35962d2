//! Image utilities for testing.
//!
//! This module provides helper functions for verifying rendered figures.

use image::{DynamicImage, GenericImageView, ImageError, ImageFormat};
use std::path::Path;

/// Load an image from a file
pub fn load_image(path: &Path) -> Result<DynamicImage, ImageError> {
    image::open(path)
}

/// Detect image format from bytes
pub fn detect_image_format(bytes: &[u8]) -> Option<ImageFormat> {
    image::guess_format(bytes).ok()
}

/// Check that a file on disk is a PNG of the expected size.
pub fn assert_png_file(path: &Path, expected_width: u32, expected_height: u32) -> Result<(), String> {
    let bytes = std::fs::read(path).map_err(|e| format!("Cannot read {}: {}", path.display(), e))?;
    match detect_image_format(&bytes) {
        Some(ImageFormat::Png) => {}
        other => return Err(format!("{} is not a PNG: {:?}", path.display(), other)),
    }

    let image = load_image(path).map_err(|e| e.to_string())?;
    let (width, height) = image.dimensions();
    if width != expected_width || height != expected_height {
        return Err(format!(
            "Image dimensions differ: actual = {}x{}, expected = {}x{}",
            width, height, expected_width, expected_height
        ));
    }
    Ok(())
}

/// Number of pixels that differ from `background`.
pub fn count_non_background(image: &DynamicImage, background: [u8; 4]) -> usize {
    image
        .pixels()
        .filter(|(_, _, pixel)| pixel.0 != background)
        .count()
}

/// Number of pixels exactly equal to `color`.
pub fn count_color(image: &DynamicImage, color: [u8; 4]) -> usize {
    image.pixels().filter(|(_, _, pixel)| pixel.0 == color).count()
}
