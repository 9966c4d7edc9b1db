//! Image decoding with format detection, RGBA normalization, and a timeout.

use image::{ImageFormat, RgbaImage};
use std::path::Path;
use std::time::Duration;
use tokio::time::timeout;

use crate::config::LimitsConfig;
use crate::error::PipelineError;

/// Image decoder with a configurable decode timeout.
pub struct ImageDecoder {
    limits: LimitsConfig,
}

/// Result of decoding an image.
///
/// The pixel data is normalized to a single-plane interleaved RGBA8 buffer
/// regardless of source format, so the row fan-out never sees palette or
/// grayscale layouts. Owned exclusively by the worker processing this image.
#[derive(Debug)]
pub struct DecodedImage {
    /// RGBA8 pixel data
    pub image: RgbaImage,
    /// Detected image format
    pub format: ImageFormat,
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Original file size in bytes
    pub file_size: u64,
}

impl ImageDecoder {
    /// Create a new decoder with the given limits.
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    /// Read and decode an image file.
    pub async fn decode(&self, path: &Path) -> Result<DecodedImage, PipelineError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| PipelineError::Decode {
                path: path.to_path_buf(),
                message: format!("Cannot read file: {}", e),
            })?;
        self.decode_from_bytes(bytes, path).await
    }

    /// Decode an image from an in-memory byte buffer with a timeout.
    ///
    /// Decoding runs on the blocking pool so a pathological file cannot
    /// stall the async workers.
    pub async fn decode_from_bytes(
        &self,
        bytes: Vec<u8>,
        path: &Path,
    ) -> Result<DecodedImage, PipelineError> {
        let path_owned = path.to_path_buf();
        let timeout_duration = Duration::from_millis(self.limits.decode_timeout_ms);

        let decode_result = timeout(timeout_duration, async {
            tokio::task::spawn_blocking(move || Self::decode_bytes_sync(bytes, &path_owned)).await
        })
        .await;

        match decode_result {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => Err(PipelineError::Decode {
                path: path.to_path_buf(),
                message: format!("Task join error: {}", e),
            }),
            Err(_) => Err(PipelineError::Timeout {
                path: path.to_path_buf(),
                stage: "decode".to_string(),
                timeout_ms: self.limits.decode_timeout_ms,
            }),
        }
    }

    /// Synchronous decode from bytes (runs in spawn_blocking).
    fn decode_bytes_sync(bytes: Vec<u8>, path: &Path) -> Result<DecodedImage, PipelineError> {
        use std::io::Cursor;

        let file_size = bytes.len() as u64;
        let cursor = Cursor::new(bytes);
        let reader = image::ImageReader::new(cursor)
            .with_guessed_format()
            .map_err(|e| PipelineError::Decode {
                path: path.to_path_buf(),
                message: format!("Cannot detect image format: {}", e),
            })?;
        let format = match reader.format() {
            Some(f) => f,
            None => ImageFormat::from_path(path).map_err(|_| PipelineError::Decode {
                path: path.to_path_buf(),
                message: format!(
                    "Unsupported format: {}",
                    path.extension()
                        .and_then(|e| e.to_str())
                        .unwrap_or("unknown")
                ),
            })?,
        };
        let decoded = reader.decode().map_err(|e| PipelineError::Decode {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let image = decoded.to_rgba8();
        let (width, height) = image.dimensions();
        Ok(DecodedImage {
            image,
            format,
            width,
            height,
            file_size,
        })
    }
}

/// Convert an ImageFormat to a string representation.
pub fn format_to_string(format: ImageFormat) -> String {
    match format {
        ImageFormat::Jpeg => "jpeg".to_string(),
        ImageFormat::Png => "png".to_string(),
        ImageFormat::Gif => "gif".to_string(),
        ImageFormat::Bmp => "bmp".to_string(),
        ImageFormat::Tiff => "tiff".to_string(),
        ImageFormat::WebP => "webp".to_string(),
        _ => "unknown".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_to_string() {
        assert_eq!(format_to_string(ImageFormat::Jpeg), "jpeg");
        assert_eq!(format_to_string(ImageFormat::Png), "png");
        assert_eq!(format_to_string(ImageFormat::Bmp), "bmp");
        assert_eq!(format_to_string(ImageFormat::Ico), "unknown");
    }

    #[tokio::test]
    async fn test_decode_normalizes_to_rgba() {
        // Grayscale PNG decodes to a 4-channel buffer
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gray.png");
        let gray = image::GrayImage::from_pixel(3, 2, image::Luma([140u8]));
        gray.save(&path).unwrap();

        let decoder = ImageDecoder::new(LimitsConfig::default());
        let decoded = decoder.decode(&path).await.unwrap();
        assert_eq!(decoded.format, ImageFormat::Png);
        assert_eq!((decoded.width, decoded.height), (3, 2));
        assert_eq!(decoded.image.as_raw().len(), 3 * 2 * 4);
        assert_eq!(decoded.image.get_pixel(0, 0).0, [140, 140, 140, 255]);
    }

    #[tokio::test]
    async fn test_decode_detects_format_by_content() {
        // A PNG saved with a .jpg extension is still detected as PNG
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("misnamed.jpg");
        let img = RgbaImage::from_pixel(2, 2, image::Rgba([1, 2, 3, 255]));
        img.save_with_format(&path, ImageFormat::Png).unwrap();

        let decoder = ImageDecoder::new(LimitsConfig::default());
        let decoded = decoder.decode(&path).await.unwrap();
        assert_eq!(decoded.format, ImageFormat::Png);
    }

    #[tokio::test]
    async fn test_decode_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.png");
        std::fs::write(&path, b"definitely not an image").unwrap();

        let decoder = ImageDecoder::new(LimitsConfig::default());
        let err = decoder.decode(&path).await.unwrap_err();
        assert!(matches!(err, PipelineError::Decode { .. }));
    }
}
