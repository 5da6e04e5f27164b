//! Image loading utilities for texture data
//!
//! Decodes PNG and JPEG files into RGBA8 pixel buffers ready for GPU upload.
//! Decode failures are reported as [`TextureError`]; callers in the shader
//! layer degrade them to a null texture handle instead of aborting.

use std::path::Path;
use thiserror::Error;

/// Texture image decode errors
#[derive(Error, Debug)]
pub enum TextureError {
    /// Image file missing or unreadable
    #[error("failed to read image {path}: {source}")]
    Io {
        /// Path that failed to open
        path: String,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Image bytes could not be decoded
    #[error("failed to decode image {path}: {source}")]
    Decode {
        /// Path that failed to decode
        path: String,
        /// Underlying decoder error
        #[source]
        source: image::ImageError,
    },
}

/// Loaded image data ready for GPU upload
#[derive(Debug, Clone)]
pub struct ImageData {
    /// Raw RGBA pixel data
    pub data: Vec<u8>,
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Number of color channels (always 4 after RGBA conversion)
    pub channels: u8,
}

impl ImageData {
    /// Load an image from a file path, converting to RGBA8
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, TextureError> {
        let path_ref = path.as_ref();

        log::debug!("Loading image from: {}", path_ref.display());

        let img = image::open(path_ref).map_err(|e| match e {
            image::ImageError::IoError(source) => TextureError::Io {
                path: path_ref.display().to_string(),
                source,
            },
            source => TextureError::Decode {
                path: path_ref.display().to_string(),
                source,
            },
        })?;

        let rgba_img = img.to_rgba8();
        let (width, height) = rgba_img.dimensions();

        log::info!("Loaded image {}x{} from {}", width, height, path_ref.display());

        Ok(Self {
            data: rgba_img.into_raw(),
            width,
            height,
            channels: 4,
        })
    }

    /// Create a solid color image (useful for testing and defaults)
    pub fn solid_color(width: u32, height: u32, color: [u8; 4]) -> Self {
        let pixel_count = (width * height) as usize;
        let mut data = Vec::with_capacity(pixel_count * 4);
        for _ in 0..pixel_count {
            data.extend_from_slice(&color);
        }

        Self {
            data,
            width,
            height,
            channels: 4,
        }
    }

    /// Get the size of the image data in bytes
    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solid_color_image_has_expected_layout() {
        let img = ImageData::solid_color(4, 4, [255, 0, 0, 255]);
        assert_eq!(img.width, 4);
        assert_eq!(img.height, 4);
        assert_eq!(img.channels, 4);
        assert_eq!(img.size_bytes(), 4 * 4 * 4);
        assert_eq!(&img.data[0..4], &[255, 0, 0, 255]);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = ImageData::from_file("no/such/texture.png").unwrap_err();
        assert!(matches!(err, TextureError::Io { .. }));
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        let mut file = tempfile::Builder::new().suffix(".png").tempfile().unwrap();
        use std::io::Write;
        file.write_all(b"definitely not a png").unwrap();
        let err = ImageData::from_file(file.path()).unwrap_err();
        assert!(matches!(err, TextureError::Decode { .. }));
    }
}
