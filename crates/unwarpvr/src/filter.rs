//! High-level warp API.
//!
//! [`UnwarpFilter`] is the primary entry point. It owns a [`WarpConfig`],
//! the resolved [`DeviceProfile`] and the cache built from them, and
//! rebuilds the cache whenever the configuration or the source geometry
//! changes.

use std::sync::Arc;

use image::RgbImage;

use crate::cache::{CacheBuilder, CacheKey, WarpCache};
use crate::config::WarpConfig;
use crate::device::DeviceProfile;
use crate::error::{ConfigError, WarpError};
use crate::frame::{FrameMut, FrameRef};
use crate::profile::{resolve_eye_relief, NoProfile, ProfileSource};
use crate::resample::Resampler;

/// Validate `config` and look up its optics.
fn resolve_profile(
    config: &WarpConfig,
    source: &dyn ProfileSource,
) -> Result<DeviceProfile, ConfigError> {
    config.validate()?;
    let eye_relief = resolve_eye_relief(config.device, config.eye_relief, source);
    DeviceProfile::lookup(config.device, config.sdk, eye_relief)
}

/// Lens warp filter instance.
///
/// Create once, process many frames. The cache is built on the first frame
/// and shared through an [`Arc`], so a frame in flight keeps the cache it
/// started with across a [`UnwarpFilter::reconfigure`].
///
/// # Examples
///
/// ```no_run
/// use unwarpvr::{UnwarpFilter, WarpConfig};
/// use image::RgbImage;
///
/// let mut filter = UnwarpFilter::new(WarpConfig::default()).unwrap();
/// let frame = RgbImage::new(1920, 1080);
/// let flat = filter.process_image(&frame).unwrap();
/// assert_eq!(flat.dimensions(), (1920, 1080));
/// ```
#[derive(Debug)]
pub struct UnwarpFilter {
    config: WarpConfig,
    profile: DeviceProfile,
    cache: Option<Arc<WarpCache>>,
}

impl UnwarpFilter {
    /// Create a filter without a device profile source.
    pub fn new(config: WarpConfig) -> Result<Self, ConfigError> {
        Self::with_profile_source(config, &NoProfile)
    }

    /// Create a filter, taking the eye relief from `source` unless the
    /// configuration overrides it.
    pub fn with_profile_source(
        config: WarpConfig,
        source: &dyn ProfileSource,
    ) -> Result<Self, ConfigError> {
        let profile = resolve_profile(&config, source)?;
        tracing::info!(
            device = %profile.device,
            sdk = %profile.sdk,
            eye_relief = profile.eye_relief,
            direction = ?config.eye.direction,
            "unwarp filter configured"
        );
        Ok(Self {
            config,
            profile,
            cache: None,
        })
    }

    pub fn config(&self) -> &WarpConfig {
        &self.config
    }

    pub fn profile(&self) -> &DeviceProfile {
        &self.profile
    }

    /// The active cache, if a frame has been prepared.
    pub fn cache(&self) -> Option<&Arc<WarpCache>> {
        self.cache.as_ref()
    }

    /// Output `[width, height]` for a source of the given size.
    pub fn output_size(&self, source: [u32; 2]) -> Result<[u32; 2], ConfigError> {
        self.config.output.resolve(source)
    }

    /// Replace the configuration. See [`UnwarpFilter::reconfigure_with_profile_source`].
    pub fn reconfigure(&mut self, config: WarpConfig) -> Result<(), WarpError> {
        self.reconfigure_with_profile_source(config, &NoProfile)
    }

    /// Replace the configuration, rebuilding the cache for the current
    /// source geometry.
    ///
    /// On error the filter keeps its previous configuration and cache.
    pub fn reconfigure_with_profile_source(
        &mut self,
        config: WarpConfig,
        source: &dyn ProfileSource,
    ) -> Result<(), WarpError> {
        let profile = resolve_profile(&config, source)?;
        let cache = match &self.cache {
            Some(old) => {
                let src = old.source_size();
                let output = config.output.resolve(src)?;
                Some(Arc::new(
                    CacheBuilder::new(&profile, &config.eye).build(output, src)?,
                ))
            }
            None => None,
        };
        tracing::info!(
            device = %profile.device,
            sdk = %profile.sdk,
            eye_relief = profile.eye_relief,
            direction = ?config.eye.direction,
            rebuilt = cache.is_some(),
            "unwarp filter reconfigured"
        );
        self.config = config;
        self.profile = profile;
        self.cache = cache;
        Ok(())
    }

    /// Cache for frames of `source` size, building it if needed.
    pub fn prepare(&mut self, source: [u32; 2]) -> Result<Arc<WarpCache>, WarpError> {
        let output = self.output_size(source)?;
        let key = CacheKey {
            profile: self.profile,
            eye: self.config.eye.clone(),
            output,
            source,
        };
        if let Some(cache) = &self.cache {
            if *cache.key() == key {
                return Ok(Arc::clone(cache));
            }
            tracing::info!(
                old_w = cache.source_size()[0],
                old_h = cache.source_size()[1],
                new_w = source[0],
                new_h = source[1],
                "source geometry changed, rebuilding warp cache"
            );
        }
        let cache = Arc::new(CacheBuilder::new(&key.profile, &key.eye).build(output, source)?);
        self.cache = Some(Arc::clone(&cache));
        Ok(cache)
    }

    /// Warp one frame into a caller-allocated destination.
    pub fn process(&mut self, src: &FrameRef<'_>, dst: &mut FrameMut<'_>) -> Result<(), WarpError> {
        let cache = self.prepare(src.size())?;
        Resampler::new(&cache).apply(src, dst)
    }

    /// Warp an `RgbImage` into a newly allocated one.
    pub fn process_image(&mut self, src: &RgbImage) -> Result<RgbImage, WarpError> {
        let src_frame = FrameRef::from_image(src);
        let cache = self.prepare(src_frame.size())?;
        let [w, h] = cache.output_size();
        let mut out = RgbImage::new(w, h);
        Resampler::new(&cache).apply(&src_frame, &mut FrameMut::from_image(&mut out))?;
        Ok(out)
    }
}
