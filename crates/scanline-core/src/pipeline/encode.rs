//! Image encoding and persistence.
//!
//! JPEG output honors the configured quality; PNG always uses maximum
//! compression; any other target format falls back to PNG encoding. Quality
//! is validated at configuration time (0-100), so no re-clamp happens here.

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::{ExtendedColorType, ImageFormat, RgbaImage};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::PipelineError;

/// Encode `image` and write it to `path`.
///
/// The target format is taken from the output extension when it names
/// JPEG/PNG, otherwise from the detected source format. Returns the encoded
/// size in bytes.
pub fn save_image(
    image: &RgbaImage,
    path: &Path,
    detected: ImageFormat,
    quality: u8,
) -> Result<u64, PipelineError> {
    let encode_err = |e: &dyn std::fmt::Display| PipelineError::Encode {
        path: path.to_path_buf(),
        message: e.to_string(),
    };

    let file = File::create(path).map_err(|e| encode_err(&e))?;
    let mut writer = BufWriter::new(file);

    match target_format(path, detected) {
        ImageFormat::Jpeg => {
            // JPEG has no alpha channel; flatten before encoding
            let rgb = image::DynamicImage::ImageRgba8(image.clone()).into_rgb8();
            JpegEncoder::new_with_quality(&mut writer, quality)
                .encode(rgb.as_raw(), rgb.width(), rgb.height(), ExtendedColorType::Rgb8)
                .map_err(|e| encode_err(&e))?;
        }
        _ => {
            use image::ImageEncoder;
            PngEncoder::new_with_quality(&mut writer, CompressionType::Best, PngFilter::Adaptive)
                .write_image(
                    image.as_raw(),
                    image.width(),
                    image.height(),
                    ExtendedColorType::Rgba8,
                )
                .map_err(|e| encode_err(&e))?;
        }
    }

    writer.flush().map_err(|e| encode_err(&e))?;
    let written = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);
    Ok(written)
}

/// Resolve the encoding format: output extension wins for JPEG/PNG, then
/// the detected source format; everything unrecognized ends up as PNG in
/// `save_image`.
fn target_format(path: &Path, detected: ImageFormat) -> ImageFormat {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .as_deref()
    {
        Some("jpg") | Some("jpeg") => ImageFormat::Jpeg,
        Some("png") => ImageFormat::Png,
        _ => detected,
    }
}
