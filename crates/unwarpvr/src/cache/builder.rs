use std::time::Instant;

use nalgebra::Vector2;
use rayon::prelude::*;

use super::{CacheKey, WarpCache, NO_SOURCE};
use crate::config::{Channel, Eye, EyeConfig, WarpDirection};
use crate::device::DeviceProfile;
use crate::distortion::DistortionModel;
use crate::error::{ConfigError, ResourceError, WarpError};
use crate::frame::CHANNELS;
use crate::inverse::{InverseSearch, Inverter};

/// Builds a [`WarpCache`] for one profile and eye configuration.
#[derive(Debug, Clone, Copy)]
pub struct CacheBuilder<'a> {
    profile: &'a DeviceProfile,
    eye: &'a EyeConfig,
}

impl<'a> CacheBuilder<'a> {
    pub fn new(profile: &'a DeviceProfile, eye: &'a EyeConfig) -> Self {
        Self { profile, eye }
    }

    /// Compute the full table for `output` and `source` sizes.
    ///
    /// The table is allocated up front; an allocation failure is reported
    /// as [`ResourceError`] without touching any existing cache.
    pub fn build(&self, output: [u32; 2], source: [u32; 2]) -> Result<WarpCache, WarpError> {
        self.eye.validate()?;
        let layout = Layout::new(self.profile, self.eye, output, source)?;

        let n = (output[0] as usize)
            .checked_mul(output[1] as usize)
            .and_then(|px| px.checked_mul(CHANNELS))
            .ok_or(ResourceError { entries: usize::MAX })?;
        let mut entries: Vec<i32> = Vec::new();
        entries
            .try_reserve_exact(n)
            .map_err(|_| ResourceError { entries: n })?;
        entries.resize(n, NO_SOURCE);

        let start = Instant::now();
        let row_len = output[0] as usize * CHANNELS;
        entries
            .par_chunks_mut(row_len)
            .enumerate()
            .for_each(|(row, out)| layout.fill_row(row, out));

        let cache = WarpCache::from_parts(
            CacheKey {
                profile: *self.profile,
                eye: self.eye.clone(),
                output,
                source,
            },
            entries,
        );
        tracing::debug!(
            device = %self.profile.device,
            direction = ?self.eye.direction,
            out_w = output[0],
            out_h = output[1],
            src_w = source[0],
            src_h = source[1],
            no_source = cache.sentinel_count(),
            elapsed_ms = start.elapsed().as_secs_f64() * 1e3,
            "warp cache built"
        );
        Ok(cache)
    }
}

/// Per-channel model with its inversion bounds.
#[derive(Debug, Clone, Copy)]
struct ChannelMap {
    model: DistortionModel,
    inverter: Inverter,
    /// Reverse: largest tan-space rsq the inverter can represent.
    limit: f32,
    /// Radial factor used at the optical center.
    center_radial: f32,
}

/// Precomputed geometry shared by all rows.
#[derive(Debug, Clone)]
struct Layout {
    direction: WarpDirection,
    eyes: usize,
    eye_w: usize,
    out_h: usize,
    gain: Vector2<f32>,
    tan_scale: Vector2<f32>,
    input_scale: Vector2<f32>,
    offsets: [f32; 2],
    regions: [usize; 2],
    src_w: usize,
    src_h: usize,
    src_eye_w: usize,
    forward_limit: f32,
    channels: [ChannelMap; 3],
}

impl Layout {
    fn new(
        profile: &DeviceProfile,
        eye: &EyeConfig,
        output: [u32; 2],
        source: [u32; 2],
    ) -> Result<Self, ConfigError> {
        let [out_w, out_h] = output;
        let [src_w, src_h] = source;
        if out_w == 0 || out_h == 0 {
            return Err(ConfigError::InvalidDimensions {
                width: out_w,
                height: out_h,
            });
        }
        if src_w == 0 || src_h == 0 {
            return Err(ConfigError::InvalidDimensions {
                width: src_w,
                height: src_h,
            });
        }
        if src_w as u64 * src_h as u64 * CHANNELS as u64 > i32::MAX as u64 {
            return Err(ConfigError::SourceTooLarge {
                width: src_w,
                height: src_h,
            });
        }

        let eyes = eye.output_eyes();
        let eye_w = out_w as usize / eyes;
        let src_eye_w = if eye.mono {
            src_w as usize
        } else {
            src_w as usize / 2
        };
        if eye_w == 0 || src_eye_w == 0 {
            return Err(ConfigError::InvalidDimensions {
                width: if eye_w == 0 { out_w } else { src_w },
                height: if eye_w == 0 { out_h } else { src_h },
            });
        }

        let native_eye_w = profile.resolution[0] as f32 / 2.0;
        let native_h = profile.resolution[1] as f32;
        let gain = Vector2::new(
            eye_w as f32 / native_eye_w / eye.scale.out_w,
            out_h as f32 / native_h / eye.scale.out_h,
        );
        let tan_scale = profile.tan_angle_scale();

        let mut input_scale = Vector2::new(eye.scale.in_w, eye.scale.in_h);
        if let (WarpDirection::Forward, Some(ppd)) = (eye.direction, eye.target_ppd) {
            let deg = 180.0 / std::f32::consts::PI;
            input_scale.x *= 2.0 * tan_scale.x * deg * ppd / src_eye_w as f32;
            input_scale.y *= 2.0 * tan_scale.y * deg * ppd / src_h as f32;
        }

        let regions = Eye::ALL.map(|e| {
            if eye.mono {
                0
            } else {
                e.index() ^ usize::from(eye.swap_eyes)
            }
        });

        let search = InverseSearch::for_direction(eye.direction);
        let channels = Channel::ALL.map(|c| {
            let model = profile.channel_model(c);
            let inverter = Inverter::new(model, search);
            ChannelMap {
                model,
                inverter,
                limit: inverter.usable_limit(),
                center_radial: 1.0 / model.scale_at(0.0),
            }
        });
        let forward_limit = InverseSearch::for_direction(WarpDirection::Forward)
            .high_bound
            .min(profile.curve.max_valid_rsq());

        Ok(Self {
            direction: eye.direction,
            eyes,
            eye_w,
            out_h: out_h as usize,
            gain,
            tan_scale,
            input_scale,
            offsets: Eye::ALL.map(|e| profile.lens_center_offset(e)),
            regions,
            src_w: src_w as usize,
            src_h: src_h as usize,
            src_eye_w,
            forward_limit,
            channels,
        })
    }

    fn fill_row(&self, row: usize, out: &mut [i32]) {
        let ndc_y = -1.0 + 2.0 * row as f32 / self.out_h as f32;
        for eye in Eye::ALL.iter().take(self.eyes) {
            let offset = Vector2::new(self.offsets[eye.index()], 0.0);
            let region = self.regions[eye.index()];
            for j in 0..self.eye_w {
                let ndc_x = -1.0 + 2.0 * j as f32 / self.eye_w as f32;
                let ndc = Vector2::new(ndc_x, ndc_y).component_mul(&self.gain);
                let base = (eye.index() * self.eye_w + j) * CHANNELS;
                match self.direction {
                    WarpDirection::Reverse => {
                        let rsq = ndc.component_mul(&self.tan_scale).norm_squared();
                        for (c, ch) in self.channels.iter().enumerate() {
                            out[base + c] = self
                                .reverse_source(ch, ndc, rsq, offset)
                                .and_then(|src| self.source_offset(src, region, c))
                                .unwrap_or(NO_SOURCE);
                        }
                    }
                    WarpDirection::Forward => {
                        let lens = ndc - offset;
                        let rsq = lens.component_mul(&self.tan_scale).norm_squared();
                        for (c, ch) in self.channels.iter().enumerate() {
                            out[base + c] = self
                                .forward_source(ch, lens, rsq)
                                .and_then(|src| self.source_offset(src, region, c))
                                .unwrap_or(NO_SOURCE);
                        }
                    }
                }
            }
        }
    }

    /// Source NDC for an undistorted output sample.
    fn reverse_source(
        &self,
        ch: &ChannelMap,
        ndc: Vector2<f32>,
        rsq: f32,
        offset: Vector2<f32>,
    ) -> Option<Vector2<f32>> {
        if rsq.is_nan() || rsq > ch.limit {
            return None;
        }
        let screen_rsq = ch.inverter.invert(rsq);
        let radial = if rsq == 0.0 || screen_rsq == 0.0 {
            ch.center_radial
        } else {
            (screen_rsq / rsq).sqrt()
        };
        Some((ndc * radial + offset).component_mul(&self.input_scale))
    }

    /// Source NDC for a pre-distorted output sample.
    fn forward_source(&self, ch: &ChannelMap, lens: Vector2<f32>, rsq: f32) -> Option<Vector2<f32>> {
        if rsq.is_nan() || rsq > self.forward_limit {
            return None;
        }
        Some((lens * ch.model.scale_at(rsq)).component_mul(&self.input_scale))
    }

    /// Packed offset of the source pixel under `src`, if inside the region.
    fn source_offset(&self, src: Vector2<f32>, region: usize, channel: usize) -> Option<i32> {
        let x = ((src.x + 1.0) * 0.5 * self.src_eye_w as f32).floor();
        let y = ((src.y + 1.0) * 0.5 * self.src_h as f32).floor();
        // NaN fails every comparison.
        if !(x >= 0.0 && y >= 0.0 && x < self.src_eye_w as f32 && y < self.src_h as f32) {
            return None;
        }
        let (col, row) = (x as usize, y as usize);
        let offset =
            row * self.src_w * CHANNELS + (region * self.src_eye_w + col) * CHANNELS + channel;
        Some(offset as i32)
    }
}
