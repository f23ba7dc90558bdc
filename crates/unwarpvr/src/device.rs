//! HMD optics table.
//!
//! Every supported headset and SDK generation has one entry with the panel
//! geometry, the radial curve and the chromatic-aberration terms. DK2 derives
//! its chromatic terms from the eye-relief dial instead of storing them.

use std::f32::consts::PI;

use nalgebra::Vector2;

use crate::config::{Channel, Eye};
use crate::distortion::{ChromaticTerms, DistortionModel, RadialCurve, CATMULL_ROM_KNOTS};
use crate::error::ConfigError;

/// Eye-relief dial value used when neither the configuration nor a device
/// profile provides one.
pub const DEFAULT_EYE_RELIEF: u8 = 3;
/// Largest eye-relief dial position.
pub const MAX_EYE_RELIEF: u8 = 10;

/// Supported head-mounted displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Device {
    #[serde(alias = "RiftDK1", alias = "dk1")]
    RiftDk1,
    #[serde(alias = "RiftDK2", alias = "dk2")]
    RiftDk2,
}

impl Device {
    pub const ALL: [Device; 2] = [Device::RiftDk1, Device::RiftDk2];
}

impl std::fmt::Display for Device {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RiftDk1 => f.write_str("RiftDK1"),
            Self::RiftDk2 => f.write_str("RiftDK2"),
        }
    }
}

impl std::str::FromStr for Device {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "riftdk1" | "rift_dk1" | "dk1" => Ok(Self::RiftDk1),
            "riftdk2" | "rift_dk2" | "dk2" => Ok(Self::RiftDk2),
            _ => Err(ConfigError::UnknownDevice(s.to_string())),
        }
    }
}

/// SDK generation whose lens model is used.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize,
)]
pub enum SdkVersion {
    #[serde(rename = "0.2")]
    V0_2,
    #[default]
    #[serde(rename = "0.4")]
    V0_4,
}

impl std::fmt::Display for SdkVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::V0_2 => f.write_str("0.2"),
            Self::V0_4 => f.write_str("0.4"),
        }
    }
}

impl std::str::FromStr for SdkVersion {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let t = s.trim();
        let t = t.strip_prefix(['v', 'V']).unwrap_or(t);
        match t {
            "0.2" | "0_2" => Ok(Self::V0_2),
            "0.4" | "0_4" => Ok(Self::V0_4),
            _ => Err(ConfigError::UnknownSdkVersion(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum ChromaSource {
    Fixed([f32; 4]),
    EyeRelief,
}

#[derive(Debug, Clone, Copy)]
struct PanelGeometry {
    resolution: [u32; 2],
    screen_size_m: [f32; 2],
    lens_separation_m: f32,
    meters_per_tan_angle: f32,
}

#[derive(Debug, Clone, Copy)]
struct ProfileEntry {
    device: Device,
    sdk: SdkVersion,
    panel: PanelGeometry,
    curve: RadialCurve,
    chroma: ChromaSource,
}

const DK1_PANEL: PanelGeometry = PanelGeometry {
    resolution: [1280, 800],
    screen_size_m: [0.14976, 0.0936],
    lens_separation_m: 0.0635,
    meters_per_tan_angle: 0.0425,
};

const DK2_PANEL: PanelGeometry = PanelGeometry {
    resolution: [1920, 1080],
    screen_size_m: [0.12576, 0.07074],
    lens_separation_m: 0.0635,
    meters_per_tan_angle: 0.036,
};

const DK1_CHROMA: [f32; 4] = [-0.006, 0.0, 0.014, 0.0];

const DK2_K: [f32; CATMULL_ROM_KNOTS] = [
    1.003, 1.02, 1.042, 1.066, 1.094, 1.126, 1.162, 1.203, 1.25, 1.31, 1.38,
];

/// Chromatic terms at eye relief 0; the far end of the dial is 14/9 of these.
const DK2_CHROMA_CLOSE: [f32; 4] = [-0.0112, -0.015, 0.0187, 0.015];

static PROFILES: [ProfileEntry; 3] = [
    ProfileEntry {
        device: Device::RiftDk1,
        sdk: SdkVersion::V0_2,
        panel: DK1_PANEL,
        curve: RadialCurve::Poly4 {
            k: [1.0, 0.22, 0.24, 0.0],
        },
        chroma: ChromaSource::Fixed(DK1_CHROMA),
    },
    ProfileEntry {
        device: Device::RiftDk1,
        sdk: SdkVersion::V0_4,
        panel: DK1_PANEL,
        curve: RadialCurve::RecipPoly4 {
            k: [1.0, -0.3999, 0.2408, -0.4589],
            max_r: 1.0,
        },
        chroma: ChromaSource::Fixed(DK1_CHROMA),
    },
    ProfileEntry {
        device: Device::RiftDk2,
        sdk: SdkVersion::V0_4,
        panel: DK2_PANEL,
        curve: RadialCurve::CatmullRom10 {
            k: DK2_K,
            max_r: 1.0,
        },
        chroma: ChromaSource::EyeRelief,
    },
];

/// DK2 chromatic terms `[red a, red b, blue a, blue b]` for a dial position.
///
/// Linear in the dial, from the close-eye values at 0 to 14/9 of them at 10.
pub fn chromatic_from_eye_relief(dial: u8) -> Result<[f32; 4], ConfigError> {
    if dial > MAX_EYE_RELIEF {
        return Err(ConfigError::EyeReliefOutOfRange(dial));
    }
    let factor = 1.0 + dial as f32 / 18.0;
    Ok(DK2_CHROMA_CLOSE.map(|c| c * factor))
}

fn table_entry(device: Device, sdk: SdkVersion) -> Option<&'static ProfileEntry> {
    PROFILES.iter().find(|e| e.device == device && e.sdk == sdk)
}

/// Resolved optics of one headset at one eye-relief setting.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct DeviceProfile {
    pub device: Device,
    pub sdk: SdkVersion,
    /// Native panel resolution, both eyes.
    pub resolution: [u32; 2],
    /// Physical panel size in meters.
    pub screen_size_m: [f32; 2],
    /// Distance between lens centers in meters.
    pub lens_separation_m: f32,
    /// Meters of panel per unit tan-angle at the lens center.
    pub meters_per_tan_angle: f32,
    pub curve: RadialCurve,
    /// `[red a, red b, blue a, blue b]`.
    pub chromatic: [f32; 4],
    pub eye_relief: u8,
}

impl DeviceProfile {
    /// All `(device, sdk)` pairs in the table.
    pub fn known_profiles() -> Vec<(Device, SdkVersion)> {
        PROFILES.iter().map(|e| (e.device, e.sdk)).collect()
    }

    /// Resolve a table entry for the given eye-relief dial.
    pub fn lookup(device: Device, sdk: SdkVersion, eye_relief: u8) -> Result<Self, ConfigError> {
        if eye_relief > MAX_EYE_RELIEF {
            return Err(ConfigError::EyeReliefOutOfRange(eye_relief));
        }
        let entry =
            table_entry(device, sdk).ok_or(ConfigError::UnsupportedProfile { device, sdk })?;
        let chromatic = match entry.chroma {
            ChromaSource::Fixed(c) => c,
            ChromaSource::EyeRelief => chromatic_from_eye_relief(eye_relief)?,
        };
        Ok(Self {
            device,
            sdk,
            resolution: entry.panel.resolution,
            screen_size_m: entry.panel.screen_size_m,
            lens_separation_m: entry.panel.lens_separation_m,
            meters_per_tan_angle: entry.panel.meters_per_tan_angle,
            curve: entry.curve,
            chromatic,
            eye_relief,
        })
    }

    /// Whether the chromatic terms depend on the eye-relief dial.
    pub fn uses_eye_relief(&self) -> bool {
        table_entry(self.device, self.sdk)
            .is_some_and(|e| matches!(e.chroma, ChromaSource::EyeRelief))
    }

    pub fn chromatic_terms(&self, channel: Channel) -> ChromaticTerms {
        let c = &self.chromatic;
        match channel {
            Channel::Red => ChromaticTerms::new(c[0], c[1]),
            Channel::Green => ChromaticTerms::NONE,
            Channel::Blue => ChromaticTerms::new(c[2], c[3]),
        }
    }

    /// Distortion model for one color channel.
    pub fn channel_model(&self, channel: Channel) -> DistortionModel {
        DistortionModel::new(self.curve, self.chromatic_terms(channel))
    }

    /// Factor from eye NDC to tangent of the view angle.
    pub fn tan_angle_scale(&self) -> Vector2<f32> {
        Vector2::new(
            0.25 * self.screen_size_m[0] / self.meters_per_tan_angle,
            0.5 * self.screen_size_m[1] / self.meters_per_tan_angle,
        )
    }

    /// Horizontal lens-center offset in eye NDC.
    pub fn lens_center_offset(&self, eye: Eye) -> f32 {
        let quarter = 0.25 * self.screen_size_m[0];
        let left = (quarter - 0.5 * self.lens_separation_m) / quarter;
        left * eye.offset_sign()
    }

    /// Native pixel density at the lens center.
    pub fn pixels_per_degree(&self) -> f32 {
        let eye_w = self.resolution[0] as f32 / 2.0;
        eye_w / (2.0 * self.tan_angle_scale().x) * PI / 180.0
    }
}
