//! Decoded bitmaps and the JPEG codec used by the disk tier.

use crate::errors::CacheError;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat};

/// A decoded bitmap held by the cache.
///
/// The memory tier accounts for images by their decoded footprint, not by the size
/// of the file they were read from.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedImage {
    inner: DynamicImage,
}

impl DecodedImage {
    pub fn new(inner: DynamicImage) -> Self {
        Self { inner }
    }

    /// Decodes an image from encoded bytes, guessing the format from its header.
    pub fn decode(bytes: &[u8]) -> Result<Self, CacheError> {
        Ok(Self::new(image::load_from_memory(bytes)?))
    }

    /// Decodes a JPEG disk entry.
    pub fn decode_jpeg(bytes: &[u8]) -> Result<Self, CacheError> {
        Ok(Self::new(image::load_from_memory_with_format(
            bytes,
            ImageFormat::Jpeg,
        )?))
    }

    /// Encodes as baseline JPEG at `quality` (1-100). Alpha is dropped.
    pub fn encode_jpeg(&self, quality: u8) -> Result<Vec<u8>, CacheError> {
        let rgb = DynamicImage::ImageRgb8(self.inner.to_rgb8());
        let mut encoded = Vec::new();
        rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut encoded, quality))?;
        Ok(encoded)
    }

    pub fn width(&self) -> u32 {
        self.inner.width()
    }

    pub fn height(&self) -> u32 {
        self.inner.height()
    }

    /// Size of the decoded pixel buffer in bytes.
    pub fn byte_size(&self) -> usize {
        self.inner.as_bytes().len()
    }

    pub fn as_dynamic(&self) -> &DynamicImage {
        &self.inner
    }
}

impl From<DynamicImage> for DecodedImage {
    fn from(inner: DynamicImage) -> Self {
        Self::new(inner)
    }
}
