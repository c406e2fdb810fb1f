// SPDX-License-Identifier: GPL-3.0-only

//! Photo encoding
//!
//! - JPEG (with quality preset)
//! - PNG (lossless)
//!
//! Encoding is CPU-bound; callers run it on a blocking thread.

use crate::constants::QualityPreset;
use crate::errors::StorageError;
use image::{ImageFormat, RgbaImage};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Supported encoding formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EncodingFormat {
    /// JPEG format (lossy compression)
    #[default]
    Jpeg,
    /// PNG format (lossless compression)
    Png,
}

impl EncodingFormat {
    /// Get file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            EncodingFormat::Jpeg => "jpg",
            EncodingFormat::Png => "png",
        }
    }

    /// Pick a format from a file's extension
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_string_lossy();
        if ext.eq_ignore_ascii_case("jpg") || ext.eq_ignore_ascii_case("jpeg") {
            Some(EncodingFormat::Jpeg)
        } else if ext.eq_ignore_ascii_case("png") {
            Some(EncodingFormat::Png)
        } else {
            None
        }
    }

    fn image_format(&self) -> ImageFormat {
        match self {
            EncodingFormat::Jpeg => ImageFormat::Jpeg,
            EncodingFormat::Png => ImageFormat::Png,
        }
    }
}

/// Photo encoder
#[derive(Debug, Clone, Copy, Default)]
pub struct PhotoEncoder {
    format: EncodingFormat,
    quality: QualityPreset,
}

impl PhotoEncoder {
    pub fn new(format: EncodingFormat, quality: QualityPreset) -> Self {
        Self { format, quality }
    }

    pub fn format(&self) -> EncodingFormat {
        self.format
    }

    /// Encode an RGBA image into the configured format
    pub fn encode(&self, image: &RgbaImage) -> Result<Vec<u8>, StorageError> {
        let data = match self.format {
            EncodingFormat::Jpeg => Self::encode_jpeg(image, self.quality)?,
            EncodingFormat::Png => Self::encode_png(image)?,
        };
        debug!(
            size = data.len(),
            format = ?self.format,
            width = image.width(),
            height = image.height(),
            "Encoding complete"
        );
        Ok(data)
    }

    /// Encode image as JPEG
    ///
    /// JPEG has no alpha channel, so alpha is dropped first.
    fn encode_jpeg(image: &RgbaImage, quality: QualityPreset) -> Result<Vec<u8>, StorageError> {
        let rgb: Vec<u8> = image
            .as_raw()
            .chunks_exact(4)
            .flat_map(|rgba| [rgba[0], rgba[1], rgba[2]])
            .collect();

        let mut buffer = Vec::new();
        let mut encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(
            &mut buffer,
            quality.jpeg_quality(),
        );
        encoder
            .encode(
                &rgb,
                image.width(),
                image.height(),
                image::ExtendedColorType::Rgb8,
            )
            .map_err(|e| StorageError::EncodingFailed(format!("JPEG encoding failed: {e}")))?;
        Ok(buffer)
    }

    /// Encode image as PNG
    fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, StorageError> {
        let mut buffer = Vec::new();
        image
            .write_to(
                &mut std::io::Cursor::new(&mut buffer),
                EncodingFormat::Png.image_format(),
            )
            .map_err(|e| StorageError::EncodingFailed(format!("PNG encoding failed: {e}")))?;
        Ok(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            EncodingFormat::from_path(Path::new("a/b.JPEG")),
            Some(EncodingFormat::Jpeg)
        );
        assert_eq!(
            EncodingFormat::from_path(Path::new("x.png")),
            Some(EncodingFormat::Png)
        );
        assert_eq!(EncodingFormat::from_path(Path::new("x.tiff")), None);
        assert_eq!(EncodingFormat::from_path(Path::new("noext")), None);
    }

    #[test]
    fn test_encoded_output_decodes() {
        let image = RgbaImage::from_pixel(8, 6, image::Rgba([200, 100, 50, 255]));
        for format in [EncodingFormat::Jpeg, EncodingFormat::Png] {
            let data = PhotoEncoder::new(format, QualityPreset::High)
                .encode(&image)
                .unwrap();
            let decoded = image::load_from_memory(&data).unwrap();
            assert_eq!((decoded.width(), decoded.height()), (8, 6));
        }
    }

    #[test]
    fn test_png_is_lossless() {
        let image = RgbaImage::from_fn(4, 4, |x, y| image::Rgba([x as u8 * 60, y as u8 * 60, 7, 255]));
        let data = PhotoEncoder::new(EncodingFormat::Png, QualityPreset::Low)
            .encode(&image)
            .unwrap();
        assert_eq!(image::load_from_memory(&data).unwrap().to_rgba8(), image);
    }
}
