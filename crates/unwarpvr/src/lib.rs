//! unwarpvr: lens distortion and chromatic aberration warping for stereo
//! head-mounted-display frames.
//!
//! Undoes (reverse) or applies (forward) the barrel distortion and
//! per-channel color fringing of an HMD lens. The pipeline stages are:
//!
//! 1. **Distortion** – radial curve per device and SDK generation, scaled
//!    per color channel.
//! 2. **Inverse** – bounded bisection on the monotonic radius map.
//! 3. **Cache** – one source offset per output sample, built in parallel
//!    from the device profile and eye layout.
//! 4. **Resample** – nearest-pixel copy through the cache, black where the
//!    lens has no source.
//!
//! # Public API
//! - [`UnwarpFilter`] as the primary entry point
//! - [`WarpConfig`] and its parts for configuration
//! - [`DeviceProfile`], [`CacheBuilder`] and [`Resampler`] for hosts that
//!   manage caches and frame buffers themselves

mod cache;
mod config;
mod device;
mod distortion;
mod error;
mod filter;
mod frame;
mod inverse;
mod profile;
mod resample;

#[cfg(test)]
pub(crate) mod test_utils;

pub use cache::{CacheBuilder, CacheKey, WarpCache, NO_SOURCE};
pub use config::{
    Channel, Eye, EyeConfig, OutputSize, ScaleFactors, WarpConfig, WarpDirection,
};
pub use device::{
    chromatic_from_eye_relief, Device, DeviceProfile, SdkVersion, DEFAULT_EYE_RELIEF,
    MAX_EYE_RELIEF,
};
pub use distortion::{scale_at, ChromaticTerms, DistortionModel, RadialCurve, CATMULL_ROM_KNOTS};
pub use error::{ConfigError, FrameError, ProfileLookupError, ResourceError, WarpError};
pub use filter::UnwarpFilter;
pub use frame::{FrameMut, FrameRef, CHANNELS};
pub use inverse::{InverseSearch, Inverter, FORWARD_HIGH_BOUND, REVERSE_HIGH_BOUND};
pub use profile::{resolve_eye_relief, FixedProfile, NoProfile, ProfileSource};
pub use resample::Resampler;
