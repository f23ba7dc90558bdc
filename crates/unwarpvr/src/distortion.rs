//! Radial lens distortion curves.
//!
//! A curve maps a squared, tan-angle-normalized radius `rsq` to a radial
//! scale factor. Multiplying a screen-space point by the scale at its own
//! `rsq` yields the tan-angle (undistorted) point:
//!
//!   tan = screen · scale(|screen|²) · (1 + a + b·|screen|²)
//!
//! where `(a, b)` are the per-channel chromatic-aberration terms.

use serde::{Deserialize, Serialize};

/// Number of Catmull-Rom control values.
pub const CATMULL_ROM_KNOTS: usize = 11;

const LAST_KNOT: usize = CATMULL_ROM_KNOTS - 1;

/// Radial curve family together with its coefficients.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum RadialCurve {
    /// `K0 + rsq·(K1 + rsq·(K2 + rsq·K3))`.
    Poly4 { k: [f32; 4] },
    /// Reciprocal of the [`RadialCurve::Poly4`] polynomial, valid up to
    /// `max_r` (the polynomial reaches zero not far beyond it).
    RecipPoly4 { k: [f32; 4], max_r: f32 },
    /// Catmull-Rom spline through 11 values spread evenly over `[0, max_r²]`.
    CatmullRom10 {
        k: [f32; CATMULL_ROM_KNOTS],
        max_r: f32,
    },
}

impl RadialCurve {
    /// Evaluate the curve at squared radius `rsq`.
    pub fn eval(&self, rsq: f32) -> f32 {
        match self {
            Self::Poly4 { k } => poly4(k, rsq),
            Self::RecipPoly4 { k, .. } => 1.0 / poly4(k, rsq),
            Self::CatmullRom10 { k, max_r } => {
                let scaled = LAST_KNOT as f32 * rsq / (max_r * max_r);
                catmull_rom10(k, scaled)
            }
        }
    }

    /// Largest squared radius at which the curve stays meaningful.
    ///
    /// The polynomial and spline families extrapolate monotonically and are
    /// unbounded here.
    pub fn max_valid_rsq(&self) -> f32 {
        match self {
            Self::RecipPoly4 { max_r, .. } => max_r * max_r,
            Self::Poly4 { .. } | Self::CatmullRom10 { .. } => f32::INFINITY,
        }
    }

    /// Curve value at the optical center.
    pub fn center_value(&self) -> f32 {
        self.eval(0.0)
    }

    /// Short family name used in logs and the CLI.
    pub fn family_name(&self) -> &'static str {
        match self {
            Self::Poly4 { .. } => "poly4",
            Self::RecipPoly4 { .. } => "recip_poly4",
            Self::CatmullRom10 { .. } => "catmull_rom10",
        }
    }
}

fn poly4(k: &[f32; 4], rsq: f32) -> f32 {
    k[0] + rsq * (k[1] + rsq * (k[2] + rsq * k[3]))
}

/// Catmull-Rom spline over `K[0..=10]` evaluated at `scaled` in knot units.
///
/// The curve is pinned to 1.0 at the origin. Past the last knot it continues
/// as a straight line with the slope of the final segment.
fn catmull_rom10(k: &[f32; CATMULL_ROM_KNOTS], scaled: f32) -> f32 {
    let floor = scaled.floor().clamp(0.0, LAST_KNOT as f32);
    let t = scaled - floor;
    let seg = floor as usize;

    if seg == LAST_KNOT {
        // Evaluated directly: the Hermite form loses precision for large t.
        return k[LAST_KNOT] + (k[LAST_KNOT] - k[LAST_KNOT - 1]) * t;
    }

    let (p0, m0, p1, m1) = match seg {
        0 => (1.0, k[1] - k[0], k[1], 0.5 * (k[2] - k[0])),
        s if s == LAST_KNOT - 1 => (
            k[s],
            0.5 * (k[s + 1] - k[s]),
            k[s + 1],
            k[s + 1] - k[s],
        ),
        s => (
            k[s],
            0.5 * (k[s + 1] - k[s - 1]),
            k[s + 1],
            0.5 * (k[s + 2] - k[s]),
        ),
    };

    let omt = 1.0 - t;
    (p0 * (1.0 + 2.0 * t) + m0 * t) * omt * omt + (p1 * (1.0 + 2.0 * omt) - m1 * omt) * t * t
}

/// Per-channel chromatic aberration terms: the curve is multiplied by
/// `1 + a + b·rsq`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ChromaticTerms {
    /// Constant term.
    pub a: f32,
    /// Term proportional to the squared radius.
    pub b: f32,
}

impl ChromaticTerms {
    /// No chromatic correction (the green reference channel).
    pub const NONE: Self = Self { a: 0.0, b: 0.0 };

    pub fn new(a: f32, b: f32) -> Self {
        Self { a, b }
    }

    /// Multiplicative factor at squared radius `rsq`.
    pub fn factor(&self, rsq: f32) -> f32 {
        1.0 + self.a + self.b * rsq
    }
}

/// A radial curve bound to one color channel's chromatic terms.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistortionModel {
    pub curve: RadialCurve,
    pub chroma: ChromaticTerms,
}

impl DistortionModel {
    pub fn new(curve: RadialCurve, chroma: ChromaticTerms) -> Self {
        Self { curve, chroma }
    }

    /// Model without chromatic correction.
    pub fn achromatic(curve: RadialCurve) -> Self {
        Self::new(curve, ChromaticTerms::NONE)
    }

    /// Radial scale factor at squared radius `rsq`.
    #[inline]
    pub fn scale_at(&self, rsq: f32) -> f32 {
        scale_at(&self.curve, self.chroma, rsq)
    }

    /// Squared radius after scaling: `scale_at(rsq)² · rsq`.
    ///
    /// This is the monotonic function that [`crate::Inverter`] inverts.
    #[inline]
    pub fn radius_sq_image(&self, rsq: f32) -> f32 {
        let s = self.scale_at(rsq);
        s * s * rsq
    }
}

/// Scale factor of `curve` at `rsq`, adjusted by the chromatic terms.
pub fn scale_at(curve: &RadialCurve, chroma: ChromaticTerms, rsq: f32) -> f32 {
    curve.eval(rsq) * chroma.factor(rsq)
}
