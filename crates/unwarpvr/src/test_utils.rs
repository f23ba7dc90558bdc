//! Shared synthetic frames for unit tests.

use image::{Rgb, RgbImage};

/// RGB frame where every pixel encodes its position: red from `x`, green
/// from `y`, blue from both, so most neighboring samples differ.
pub(crate) fn gradient_frame(w: u32, h: u32) -> RgbImage {
    RgbImage::from_fn(w, h, |x, y| {
        Rgb([
            (x % 256) as u8,
            (y % 256) as u8,
            ((x * 7 + y * 13) % 256) as u8,
        ])
    })
}

/// Copy packed rows into a buffer with `stride` bytes per row, padding
/// filled with 0xEE.
pub(crate) fn pad_rows(packed: &[u8], row_bytes: usize, stride: usize, rows: usize) -> Vec<u8> {
    let mut out = vec![0xEEu8; stride * rows];
    for (dst, src) in out.chunks_mut(stride).zip(packed.chunks(row_bytes)) {
        dst[..row_bytes].copy_from_slice(src);
    }
    out
}

/// Frame split into two solid halves, `left` and `right`.
pub(crate) fn split_frame(w: u32, h: u32, left: [u8; 3], right: [u8; 3]) -> RgbImage {
    RgbImage::from_fn(w, h, |x, _| if x < w / 2 { Rgb(left) } else { Rgb(right) })
}
