//! Generated panorama artifacts

use image::{ImageFormat, RgbaImage};
use std::sync::Arc;
use thiserror::Error;

use crate::spatial::CacheKey;

/// Error type for artifact construction
#[derive(Error, Debug)]
pub enum ArtifactError {
    #[error("Image decoding error: {0}")]
    DecodeError(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Pixel buffer of {found} bytes does not match {width}x{height} RGBA")]
    SizeMismatch {
        width: u32,
        height: u32,
        found: usize,
    },
}

/// One completed production: an RGBA8 image tied to the key it was made for
///
/// Artifacts are immutable once built; clones share the pixel buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentArtifact {
    pub key: CacheKey,
    pub width: u32,
    pub height: u32,
    data: Arc<[u8]>,
}

impl ContentArtifact {
    /// Wrap a decoded RGBA image
    pub fn from_image(key: CacheKey, image: RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            key,
            width,
            height,
            data: image.into_raw().into(),
        }
    }

    /// Wrap raw RGBA8 pixels
    pub fn from_rgba(
        key: CacheKey,
        width: u32,
        height: u32,
        data: Vec<u8>,
    ) -> Result<Self, ArtifactError> {
        if data.len() != width as usize * height as usize * 4 {
            return Err(ArtifactError::SizeMismatch {
                width,
                height,
                found: data.len(),
            });
        }
        Ok(Self {
            key,
            width,
            height,
            data: data.into(),
        })
    }

    /// Decode PNG or JPEG bytes returned by a remote producer
    pub fn decode(key: CacheKey, bytes: &[u8]) -> Result<Self, ArtifactError> {
        let format =
            image::guess_format(bytes).map_err(|e| ArtifactError::DecodeError(e.to_string()))?;

        match format {
            ImageFormat::Jpeg | ImageFormat::Png => {}
            _ => {
                return Err(ArtifactError::UnsupportedFormat(format!(
                    "Only JPG/JPEG and PNG formats are supported, got {:?}",
                    format.extensions_str()
                )))
            }
        }

        let img = image::load_from_memory_with_format(bytes, format)
            .map_err(|e| ArtifactError::DecodeError(e.to_string()))?;

        Ok(Self::from_image(key, img.into_rgba8()))
    }

    /// RGBA8 pixels, row-major, top row first
    pub fn pixels(&self) -> &[u8] {
        &self.data
    }

    /// Size of the pixel buffer in bytes
    pub fn byte_len(&self) -> usize {
        self.data.len()
    }

    /// Pixel rows in bottom-to-top order, as OpenGL-style texture uploads expect
    pub fn flipped_vertically(&self) -> Vec<u8> {
        let row = self.width as usize * 4;
        if row == 0 {
            return Vec::new();
        }
        self.data
            .chunks_exact(row)
            .rev()
            .flatten()
            .copied()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_row_image() -> RgbaImage {
        let mut img = RgbaImage::new(1, 2);
        img.put_pixel(0, 0, image::Rgba([255, 0, 0, 255]));
        img.put_pixel(0, 1, image::Rgba([0, 0, 255, 255]));
        img
    }

    #[test]
    fn test_from_image() {
        let artifact = ContentArtifact::from_image(CacheKey::new(1, 2), two_row_image());
        assert_eq!(artifact.key, CacheKey::new(1, 2));
        assert_eq!((artifact.width, artifact.height), (1, 2));
        assert_eq!(artifact.byte_len(), 8);
    }

    #[test]
    fn test_flip_vertically() {
        let artifact = ContentArtifact::from_image(CacheKey::new(0, 0), two_row_image());
        assert_eq!(artifact.flipped_vertically(), vec![0, 0, 255, 255, 255, 0, 0, 255]);
    }

    #[test]
    fn test_from_rgba_size_mismatch() {
        let result = ContentArtifact::from_rgba(CacheKey::new(0, 0), 2, 2, vec![0; 4]);
        assert!(matches!(
            result,
            Err(ArtifactError::SizeMismatch { found: 4, .. })
        ));
    }

    #[test]
    fn test_decode_png() {
        let mut png_data = Vec::new();
        two_row_image()
            .write_to(
                &mut std::io::Cursor::new(&mut png_data),
                image::ImageFormat::Png,
            )
            .expect("Failed to encode test image");

        let artifact = ContentArtifact::decode(CacheKey::new(3, 4), &png_data).unwrap();
        assert_eq!((artifact.width, artifact.height), (1, 2));
        assert_eq!(&artifact.pixels()[..4], &[255, 0, 0, 255]);
    }

    #[test]
    fn test_decode_garbage_fails() {
        let result = ContentArtifact::decode(CacheKey::new(0, 0), &[0, 1, 2, 3]);
        assert!(result.is_err());
    }
}
