//! Error types.

use crate::device::{Device, SdkVersion};

// ── Configuration ──────────────────────────────────────────────────────────

/// Invalid configuration, rejected before any cache work.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Device name that does not match any known HMD.
    UnknownDevice(String),
    /// SDK version name that does not match any known version.
    UnknownSdkVersion(String),
    /// Known device, but no optics for the requested SDK version.
    UnsupportedProfile { device: Device, sdk: SdkVersion },
    /// Eye-relief dial outside `0..=10`.
    EyeReliefOutOfRange(u8),
    /// An option that only applies to forward warping was set in reverse.
    ForwardOnlyOption(&'static str),
    /// Both a `size` and an explicit width/height were given.
    ConflictingSize,
    /// Zero-sized output or source geometry.
    InvalidDimensions { width: u32, height: u32 },
    /// Scale multiplier that is not finite and positive.
    InvalidScale { name: &'static str, value: f32 },
    /// Pixels-per-degree override that is not finite and positive.
    InvalidPixelsPerDegree(f32),
    /// Source frame too large for 32-bit cache offsets.
    SourceTooLarge { width: u32, height: u32 },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownDevice(name) => write!(f, "unknown device '{}'", name),
            Self::UnknownSdkVersion(name) => write!(f, "unknown SDK version '{}'", name),
            Self::UnsupportedProfile { device, sdk } => {
                write!(f, "no lens profile for {} with SDK {}", device, sdk)
            }
            Self::EyeReliefOutOfRange(dial) => {
                write!(f, "eye relief {} out of range 0..=10", dial)
            }
            Self::ForwardOnlyOption(name) => {
                write!(f, "option '{}' is only valid for forward warping", name)
            }
            Self::ConflictingSize => write!(
                f,
                "size and width/height cannot be set at the same time"
            ),
            Self::InvalidDimensions { width, height } => {
                write!(f, "invalid dimensions {}x{}", width, height)
            }
            Self::InvalidScale { name, value } => {
                write!(f, "scale '{}' must be finite and positive, got {}", name, value)
            }
            Self::InvalidPixelsPerDegree(ppd) => {
                write!(f, "pixels per degree must be finite and positive, got {}", ppd)
            }
            Self::SourceTooLarge { width, height } => {
                write!(f, "source frame {}x{} is too large", width, height)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

// ── Resources ──────────────────────────────────────────────────────────────

/// The cache table could not be allocated.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceError {
    /// Number of cache entries requested.
    pub entries: usize,
}

impl std::fmt::Display for ResourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "failed to allocate warp cache of {} entries", self.entries)
    }
}

impl std::error::Error for ResourceError {}

// ── Frames ─────────────────────────────────────────────────────────────────

/// Malformed frame descriptor.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameError {
    /// Row stride shorter than one row of packed pixels.
    StrideTooSmall { stride: usize, row_bytes: usize },
    /// Buffer shorter than `stride · (height - 1) + row_bytes`.
    BufferTooShort { len: usize, needed: usize },
}

impl std::fmt::Display for FrameError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StrideTooSmall { stride, row_bytes } => {
                write!(f, "stride {} is smaller than row size {}", stride, row_bytes)
            }
            Self::BufferTooShort { len, needed } => {
                write!(f, "frame buffer has {} bytes, needs {}", len, needed)
            }
        }
    }
}

impl std::error::Error for FrameError {}

// ── Profile lookup ─────────────────────────────────────────────────────────

/// Device-profile source unavailable or incomplete.
///
/// Never fatal: callers fall back to the default eye relief.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileLookupError {
    pub reason: String,
}

impl ProfileLookupError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl std::fmt::Display for ProfileLookupError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "profile lookup failed: {}", self.reason)
    }
}

impl std::error::Error for ProfileLookupError {}

// ── Umbrella ───────────────────────────────────────────────────────────────

/// Any failure of the warp pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum WarpError {
    Config(ConfigError),
    Resource(ResourceError),
    Frame(FrameError),
    /// Frame geometry does not match the cache it is resampled with.
    FrameMismatch {
        what: &'static str,
        expected: [u32; 2],
        got: [u32; 2],
    },
}

impl std::fmt::Display for WarpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(e) => write!(f, "configuration error: {}", e),
            Self::Resource(e) => write!(f, "resource error: {}", e),
            Self::Frame(e) => write!(f, "frame error: {}", e),
            Self::FrameMismatch {
                what,
                expected,
                got,
            } => write!(
                f,
                "{} frame is {}x{}, cache expects {}x{}",
                what, got[0], got[1], expected[0], expected[1]
            ),
        }
    }
}

impl std::error::Error for WarpError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Resource(e) => Some(e),
            Self::Frame(e) => Some(e),
            Self::FrameMismatch { .. } => None,
        }
    }
}

impl From<ConfigError> for WarpError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<ResourceError> for WarpError {
    fn from(e: ResourceError) -> Self {
        Self::Resource(e)
    }
}

impl From<FrameError> for WarpError {
    fn from(e: FrameError) -> Self {
        Self::Frame(e)
    }
}
