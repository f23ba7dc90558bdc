//! Per-sample source lookup table.
//!
//! A [`WarpCache`] maps every `(row, column, channel)` of the output frame to
//! a byte offset into the *packed* layout of the source frame
//! (`row · src_w · 3 + col · 3 + channel`), or [`NO_SOURCE`] when the sample
//! falls outside the lens's usable domain or the source region. Offsets do
//! not depend on the source row stride; the resampler rebases them.

mod builder;

pub use builder::CacheBuilder;

use crate::config::{Channel, EyeConfig};
use crate::device::DeviceProfile;
use crate::frame::CHANNELS;

/// Entry marking an output sample with no source pixel (rendered black).
pub const NO_SOURCE: i32 = -1;

/// Everything a cache depends on. Equal keys produce identical tables.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheKey {
    pub profile: DeviceProfile,
    pub eye: EyeConfig,
    /// Output `[width, height]`.
    pub output: [u32; 2],
    /// Source `[width, height]`.
    pub source: [u32; 2],
}

/// Immutable lookup table, shared between frames.
#[derive(Debug, Clone)]
pub struct WarpCache {
    key: CacheKey,
    entries: Vec<i32>,
}

impl WarpCache {
    pub(crate) fn from_parts(key: CacheKey, entries: Vec<i32>) -> Self {
        Self { key, entries }
    }

    pub fn key(&self) -> &CacheKey {
        &self.key
    }

    pub fn output_size(&self) -> [u32; 2] {
        self.key.output
    }

    pub fn source_size(&self) -> [u32; 2] {
        self.key.source
    }

    /// Raw table in output row-major order, three entries per pixel.
    pub fn entries(&self) -> &[i32] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Packed source offset for one output sample, `None` for no source.
    pub fn entry(&self, row: u32, col: u32, channel: Channel) -> Option<usize> {
        let [w, h] = self.key.output;
        if row >= h || col >= w {
            return None;
        }
        let idx = (row as usize * w as usize + col as usize) * CHANNELS + channel.index();
        let e = self.entries[idx];
        (e != NO_SOURCE).then_some(e as usize)
    }

    /// Source pixel `[x, y]` read by one output sample.
    pub fn source_pixel(&self, row: u32, col: u32, channel: Channel) -> Option<[u32; 2]> {
        let offset = self.entry(row, col, channel)?;
        let row_bytes = self.key.source[0] as usize * CHANNELS;
        let y = offset / row_bytes;
        let x = (offset % row_bytes) / CHANNELS;
        Some([x as u32, y as u32])
    }

    /// Number of samples without a source.
    pub fn sentinel_count(&self) -> usize {
        self.entries.iter().filter(|&&e| e == NO_SOURCE).count()
    }
}

#[cfg(test)]
mod tests;
