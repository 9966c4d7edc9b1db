//! Row splitting and write-back over packed interleaved RGBA buffers.
//!
//! Row index is the only ordering key: write-back always indexes, never
//! appends, so row results may arrive in any order.

/// Copy one row of interleaved RGBA bytes out of the buffer.
///
/// Returns `None` when the row is out of range for the buffer.
pub fn extract_row(pixels: &[u8], width: usize, row: usize) -> Option<Vec<u8>> {
    let row_bytes = width * 4;
    let start = row.checked_mul(row_bytes)?;
    let end = start.checked_add(row_bytes)?;
    pixels.get(start..end).map(<[u8]>::to_vec)
}

/// Write a transformed row back into `dst` at its original index.
///
/// Returns `false` when the index is out of range or the row length does not
/// match the image width — a missing or misshapen row is a join defect the
/// caller must surface, not silently absorb.
#[must_use]
pub fn write_row(dst: &mut [u8], width: usize, row: usize, pixels: &[u8]) -> bool {
    let row_bytes = width * 4;
    if pixels.len() != row_bytes {
        return false;
    }
    let start = row * row_bytes;
    let Some(slot) = dst.get_mut(start..start + row_bytes) else {
        return false;
    };
    slot.copy_from_slice(pixels);
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_row() {
        // 2x2 image, rows 0..16 and 16..32
        let pixels: Vec<u8> = (0..32).collect();
        assert_eq!(extract_row(&pixels, 2, 0).unwrap(), (0..16).collect::<Vec<u8>>());
        assert_eq!(extract_row(&pixels, 2, 1).unwrap(), (16..32).collect::<Vec<u8>>());
        assert!(extract_row(&pixels, 2, 2).is_none());
    }

    #[test]
    fn test_write_row_indexes_not_appends() {
        let mut dst = vec![0u8; 32];
        let row1: Vec<u8> = (100..116).collect();
        let row0: Vec<u8> = (0..16).collect();

        // Out-of-order arrival: row 1 first, then row 0
        assert!(write_row(&mut dst, 2, 1, &row1));
        assert!(write_row(&mut dst, 2, 0, &row0));

        assert_eq!(&dst[..16], &row0[..]);
        assert_eq!(&dst[16..], &row1[..]);
    }

    #[test]
    fn test_write_row_rejects_bad_shape() {
        let mut dst = vec![0u8; 32];
        assert!(!write_row(&mut dst, 2, 4, &[0u8; 8])); // index past the end
        assert!(!write_row(&mut dst, 2, 0, &[0u8; 7])); // length mismatch
        assert_eq!(dst, vec![0u8; 32]); // untouched on failure
    }

    #[test]
    fn test_extract_then_write_round_trip() {
        let pixels: Vec<u8> = (0..48).map(|i| (i * 3) as u8).collect();
        let mut dst = vec![0u8; 48];
        for row in 0..4 {
            let r = extract_row(&pixels, 3, row).unwrap();
            assert!(write_row(&mut dst, 3, row, &r));
        }
        assert_eq!(dst, pixels);
    }
}
