//! Apply a [`WarpCache`] to a source frame.

use rayon::prelude::*;

use crate::cache::{WarpCache, NO_SOURCE};
use crate::error::WarpError;
use crate::frame::{FrameMut, FrameRef, CHANNELS};

/// Nearest-pixel lookup through a prebuilt cache.
#[derive(Debug, Clone, Copy)]
pub struct Resampler<'a> {
    cache: &'a WarpCache,
}

impl<'a> Resampler<'a> {
    pub fn new(cache: &'a WarpCache) -> Self {
        Self { cache }
    }

    /// Fill `dst` from `src`. Samples without a source become 0.
    ///
    /// Destination bytes past `width · 3` in each row are left as they are.
    pub fn apply(&self, src: &FrameRef<'_>, dst: &mut FrameMut<'_>) -> Result<(), WarpError> {
        let expected_src = self.cache.source_size();
        if src.size() != expected_src {
            return Err(WarpError::FrameMismatch {
                what: "source",
                expected: expected_src,
                got: src.size(),
            });
        }
        let expected_dst = self.cache.output_size();
        if dst.size() != expected_dst {
            return Err(WarpError::FrameMismatch {
                what: "destination",
                expected: expected_dst,
                got: dst.size(),
            });
        }

        let row_len = expected_dst[0] as usize * CHANNELS;
        let out_h = expected_dst[1] as usize;
        let dst_stride = dst.stride();
        let packed_row = expected_src[0] as usize * CHANNELS;
        let src_stride = src.stride();
        let src_data = src.data();
        let entries = self.cache.entries();

        dst.data_mut()
            .par_chunks_mut(dst_stride)
            .take(out_h)
            .enumerate()
            .for_each(|(y, row)| {
                let lut = &entries[y * row_len..(y + 1) * row_len];
                let out = &mut row[..row_len];
                if src.is_packed() {
                    for (o, &e) in out.iter_mut().zip(lut) {
                        *o = if e == NO_SOURCE { 0 } else { src_data[e as usize] };
                    }
                } else {
                    // Offsets are stored packed so one table serves any
                    // source stride; padded sources pay a rebase per sample.
                    for (o, &e) in out.iter_mut().zip(lut) {
                        *o = if e == NO_SOURCE {
                            0
                        } else {
                            let e = e as usize;
                            src_data[(e / packed_row) * src_stride + e % packed_row]
                        };
                    }
                }
            });
        Ok(())
    }
}
