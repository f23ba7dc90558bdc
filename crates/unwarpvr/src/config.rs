//! Warp configuration: direction, eye layout, scaling and output size.

use crate::device::{Device, SdkVersion, DEFAULT_EYE_RELIEF, MAX_EYE_RELIEF};
use crate::error::ConfigError;

/// Whether lens distortion is removed or introduced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarpDirection {
    /// Undo the lens pre-distortion of a captured HMD frame.
    #[default]
    Reverse,
    /// Pre-distort flat content for viewing through the lens.
    Forward,
}

impl WarpDirection {
    pub fn is_forward(self) -> bool {
        matches!(self, Self::Forward)
    }
}

/// Physical eye. The lens-center offset is defined for [`Eye::Left`] and
/// mirrored for [`Eye::Right`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Eye {
    Left,
    Right,
}

impl Eye {
    pub const ALL: [Eye; 2] = [Eye::Left, Eye::Right];

    /// 0 for the left eye, 1 for the right.
    pub fn index(self) -> usize {
        match self {
            Self::Left => 0,
            Self::Right => 1,
        }
    }

    /// +1 for the left eye, -1 for the right.
    pub fn offset_sign(self) -> f32 {
        match self {
            Self::Left => 1.0,
            Self::Right => -1.0,
        }
    }
}

/// Interleaved color channel, in buffer order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Red,
    Green,
    Blue,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Channel::Red, Channel::Green, Channel::Blue];

    /// Byte position within a pixel.
    pub fn index(self) -> usize {
        match self {
            Self::Red => 0,
            Self::Green => 1,
            Self::Blue => 2,
        }
    }
}

/// Independent output and input scale multipliers.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ScaleFactors {
    /// Horizontal output scale. Values above 1 zoom in.
    pub out_w: f32,
    /// Vertical output scale.
    pub out_h: f32,
    /// Horizontal input scale applied to source coordinates.
    pub in_w: f32,
    /// Vertical input scale applied to source coordinates.
    pub in_h: f32,
}

impl Default for ScaleFactors {
    fn default() -> Self {
        Self {
            out_w: 1.0,
            out_h: 1.0,
            in_w: 1.0,
            in_h: 1.0,
        }
    }
}

impl ScaleFactors {
    fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("out_w", self.out_w),
            ("out_h", self.out_h),
            ("in_w", self.in_w),
            ("in_h", self.in_h),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::InvalidScale { name, value });
            }
        }
        Ok(())
    }
}

/// Per-run eye layout and mapping flags.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EyeConfig {
    pub direction: WarpDirection,
    /// Read the right eye from the first source half and vice versa.
    pub swap_eyes: bool,
    /// The whole source frame is one eye image shared by both outputs.
    pub mono: bool,
    /// Render only the left eye, spanning the full output width.
    pub left_eye_only: bool,
    pub scale: ScaleFactors,
    /// Pixel density of the flat source in pixels per degree.
    ///
    /// Forward only. Rescales the input so the result matches the density
    /// of a device other than the one the model was measured on.
    pub target_ppd: Option<f32>,
}

impl Default for EyeConfig {
    fn default() -> Self {
        Self {
            direction: WarpDirection::Reverse,
            swap_eyes: false,
            mono: false,
            left_eye_only: false,
            scale: ScaleFactors::default(),
            target_ppd: None,
        }
    }
}

impl EyeConfig {
    /// Number of eye regions in the output (1 when left-eye-only).
    pub fn output_eyes(&self) -> usize {
        if self.left_eye_only {
            1
        } else {
            2
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.scale.validate()?;
        if let Some(ppd) = self.target_ppd {
            if !self.direction.is_forward() {
                return Err(ConfigError::ForwardOnlyOption("target_ppd"));
            }
            if !(ppd.is_finite() && ppd > 0.0) {
                return Err(ConfigError::InvalidPixelsPerDegree(ppd));
            }
        }
        Ok(())
    }
}

/// Output frame size.
///
/// Either `size` or the `width`/`height` pair may be set, not both. Missing
/// dimensions default to the matching source dimension.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct OutputSize {
    pub size: Option<[u32; 2]>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl OutputSize {
    /// Explicit `[width, height]`.
    pub fn fixed(width: u32, height: u32) -> Self {
        Self {
            size: Some([width, height]),
            ..Self::default()
        }
    }

    /// Checks that do not depend on the source frame.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.size.is_some() && (self.width.is_some() || self.height.is_some()) {
            return Err(ConfigError::ConflictingSize);
        }
        let [w, h] = self
            .size
            .unwrap_or([self.width.unwrap_or(1), self.height.unwrap_or(1)]);
        if w == 0 || h == 0 {
            return Err(ConfigError::InvalidDimensions {
                width: w,
                height: h,
            });
        }
        Ok(())
    }

    /// Output `[width, height]` for a source of `source` pixels.
    pub fn resolve(&self, source: [u32; 2]) -> Result<[u32; 2], ConfigError> {
        self.validate()?;
        let out = self.size.unwrap_or([
            self.width.unwrap_or(source[0]),
            self.height.unwrap_or(source[1]),
        ]);
        if out[0] == 0 || out[1] == 0 {
            return Err(ConfigError::InvalidDimensions {
                width: out[0],
                height: out[1],
            });
        }
        Ok(out)
    }
}

/// Top-level warp configuration.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct WarpConfig {
    pub device: Device,
    pub sdk: SdkVersion,
    /// Eye-relief dial override (0..=10). Takes precedence over any
    /// profile-provided value.
    pub eye_relief: Option<u8>,
    pub eye: EyeConfig,
    pub output: OutputSize,
}

impl Default for WarpConfig {
    fn default() -> Self {
        Self {
            device: Device::RiftDk2,
            sdk: SdkVersion::default(),
            eye_relief: None,
            eye: EyeConfig::default(),
            output: OutputSize::default(),
        }
    }
}

impl WarpConfig {
    /// Reject invalid option combinations before any cache work.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(dial) = self.eye_relief {
            if dial > MAX_EYE_RELIEF {
                return Err(ConfigError::EyeReliefOutOfRange(dial));
            }
        }
        self.eye.validate()?;
        self.output.validate()
    }

    /// Eye relief used when no profile source is consulted.
    pub fn eye_relief_or_default(&self) -> u8 {
        self.eye_relief.unwrap_or(DEFAULT_EYE_RELIEF)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let cfg = WarpConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.eye.direction, WarpDirection::Reverse);
        assert_eq!(cfg.eye_relief_or_default(), DEFAULT_EYE_RELIEF);
    }

    #[test]
    fn target_ppd_requires_forward() {
        let mut cfg = WarpConfig::default();
        cfg.eye.target_ppd = Some(12.0);
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::ForwardOnlyOption("target_ppd"))
        );
        cfg.eye.direction = WarpDirection::Forward;
        assert!(cfg.validate().is_ok());
        cfg.eye.target_ppd = Some(-1.0);
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::InvalidPixelsPerDegree(-1.0))
        );
    }

    #[test]
    fn rejects_bad_scale() {
        let mut cfg = WarpConfig::default();
        cfg.eye.scale.in_h = 0.0;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidScale { name: "in_h", .. })
        ));
        cfg.eye.scale.in_h = f32::NAN;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_eye_relief_above_dial() {
        let cfg = WarpConfig {
            eye_relief: Some(11),
            ..WarpConfig::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::EyeReliefOutOfRange(11)));
    }

    #[test]
    fn output_size_defaults_to_source() {
        let size = OutputSize::default();
        assert_eq!(size.resolve([1920, 1080]).unwrap(), [1920, 1080]);

        let size = OutputSize {
            width: Some(2560),
            ..OutputSize::default()
        };
        assert_eq!(size.resolve([1920, 1080]).unwrap(), [2560, 1080]);

        assert_eq!(
            OutputSize::fixed(640, 480).resolve([1920, 1080]).unwrap(),
            [640, 480]
        );
    }

    #[test]
    fn output_size_conflicts_and_zero_are_errors() {
        let size = OutputSize {
            size: Some([640, 480]),
            height: Some(200),
            ..OutputSize::default()
        };
        assert_eq!(size.resolve([10, 10]), Err(ConfigError::ConflictingSize));

        let size = OutputSize {
            width: Some(0),
            ..OutputSize::default()
        };
        assert!(matches!(
            size.validate(),
            Err(ConfigError::InvalidDimensions { width: 0, .. })
        ));
    }

    #[test]
    fn config_json_roundtrip_with_partial_fields() {
        let json = r#"{"device":"rift_dk1","eye":{"direction":"forward","target_ppd":10.5}}"#;
        let cfg: WarpConfig = serde_json::from_str(json).expect("parse");
        assert_eq!(cfg.device, Device::RiftDk1);
        assert_eq!(cfg.sdk, SdkVersion::default());
        assert!(cfg.eye.direction.is_forward());
        assert_eq!(cfg.eye.target_ppd, Some(10.5));
        assert_eq!(cfg.eye.scale, ScaleFactors::default());

        let back: WarpConfig =
            serde_json::from_str(&serde_json::to_string(&cfg).expect("serialize")).expect("parse");
        assert_eq!(back, cfg);
    }

    #[test]
    fn eye_helpers() {
        assert_eq!(Eye::Left.index(), 0);
        assert_eq!(Eye::Right.offset_sign(), -1.0);
        assert_eq!(Channel::Blue.index(), 2);
        let cfg = EyeConfig {
            left_eye_only: true,
            ..EyeConfig::default()
        };
        assert_eq!(cfg.output_eyes(), 1);
    }
}
