//! Pixel transform implementations.
//!
//! All functions operate on interleaved RGBA bytes (4 per pixel) and return
//! a buffer of the same length. A buffer whose length is not a multiple of 4
//! is returned unchanged — a defensive no-op, not an error. Inputs are never
//! retained or mutated.
//!
//! Arithmetic is f64 with truncation to u8, so outputs are bit-reproducible
//! across platforms.

use crate::types::FilterParams;

/// ITU-R BT.601 luma: `gray = trunc(0.299R + 0.587G + 0.114B)`, alpha kept.
pub fn grayscale(src: &[u8], _width: usize, _params: &FilterParams) -> Vec<u8> {
    if src.len() % 4 != 0 {
        return src.to_vec();
    }

    let mut dst = Vec::with_capacity(src.len());
    for px in src.chunks_exact(4) {
        let gray =
            (0.299 * f64::from(px[0]) + 0.587 * f64::from(px[1]) + 0.114 * f64::from(px[2])) as u8;
        dst.extend_from_slice(&[gray, gray, gray, px[3]]);
    }
    dst
}

/// Multiply each RGB channel by the brightness factor, clamped to 0..=255.
/// Alpha is untouched.
pub fn brightness(src: &[u8], _width: usize, params: &FilterParams) -> Vec<u8> {
    if src.len() % 4 != 0 {
        return src.to_vec();
    }

    let factor = params.brightness;
    let mut dst = Vec::with_capacity(src.len());
    for px in src.chunks_exact(4) {
        dst.extend_from_slice(&[
            clamp(f64::from(px[0]) * factor) as u8,
            clamp(f64::from(px[1]) * factor) as u8,
            clamp(f64::from(px[2]) * factor) as u8,
            px[3],
        ]);
    }
    dst
}

/// Scale each RGB channel's distance from the 128 midpoint by the contrast
/// factor, clamped to 0..=255. Alpha is untouched.
pub fn contrast(src: &[u8], _width: usize, params: &FilterParams) -> Vec<u8> {
    if src.len() % 4 != 0 {
        return src.to_vec();
    }

    let factor = params.contrast;
    let mut dst = Vec::with_capacity(src.len());
    for px in src.chunks_exact(4) {
        dst.extend_from_slice(&[
            clamp((f64::from(px[0]) - 128.0) * factor + 128.0) as u8,
            clamp((f64::from(px[1]) - 128.0) * factor + 128.0) as u8,
            clamp((f64::from(px[2]) - 128.0) * factor + 128.0) as u8,
            px[3],
        ]);
    }
    dst
}

/// Box blur over the whole image.
///
/// `src` must be the full image buffer; height is recovered from the buffer
/// length. Radius is the integer part of `params.blur_radius`; `r <= 0` is
/// the identity. Each output pixel (alpha included) is the truncated mean of
/// the `(2r+1) x (2r+1)` window clipped to image bounds — out-of-bounds
/// samples are excluded, not wrapped or replicated.
pub fn box_blur(src: &[u8], width: usize, params: &FilterParams) -> Vec<u8> {
    if src.len() % 4 != 0 || width == 0 || src.len() % (width * 4) != 0 {
        return src.to_vec();
    }

    let height = src.len() / (width * 4);
    if height == 0 {
        return src.to_vec();
    }

    let radius = params.blur_radius as i64;
    if radius <= 0 {
        return src.to_vec();
    }

    let mut dst = vec![0u8; src.len()];
    for row in 0..height {
        let out = blur_row(src, width, height, row, radius);
        dst[row * width * 4..(row + 1) * width * 4].copy_from_slice(&out);
    }
    dst
}

/// Compute one blurred output row from the full source buffer.
///
/// This is the per-row entry point used by the fan-out engine: row tasks get
/// a read-only view of the whole image and produce only their own row.
pub fn blur_row(src: &[u8], width: usize, height: usize, row: usize, radius: i64) -> Vec<u8> {
    let row_bytes = width * 4;
    if radius <= 0 {
        return src[row * row_bytes..(row + 1) * row_bytes].to_vec();
    }

    let mut out = vec![0u8; row_bytes];
    for x in 0..width {
        let mut sum = [0.0f64; 4];
        let mut count = 0u32;

        for dy in -radius..=radius {
            let ny = row as i64 + dy;
            if ny < 0 || ny >= height as i64 {
                continue;
            }
            for dx in -radius..=radius {
                let nx = x as i64 + dx;
                if nx < 0 || nx >= width as i64 {
                    continue;
                }
                let idx = (ny as usize * width + nx as usize) * 4;
                for c in 0..4 {
                    sum[c] += f64::from(src[idx + c]);
                }
                count += 1;
            }
        }

        // count >= 1: the center pixel is always in bounds
        let idx = x * 4;
        for c in 0..4 {
            out[idx + c] = (sum[c] / f64::from(count)) as u8;
        }
    }
    out
}

fn clamp(value: f64) -> f64 {
    value.max(0.0).min(255.0)
}
