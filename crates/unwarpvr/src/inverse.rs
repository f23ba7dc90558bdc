//! Numeric inversion of the radial distortion map.
//!
//! Given a target squared radius `T`, find `rsq` with
//! `scale_at(rsq)² · rsq ≈ T` by bisection on `[0, high_bound]`. The curves
//! shipped with the device table are monotonic in that product, which is
//! what makes bisection valid; it is not checked at runtime.

use serde::{Deserialize, Serialize};

use crate::config::WarpDirection;
use crate::distortion::DistortionModel;

/// Upper search bound used when unwarping.
pub const REVERSE_HIGH_BOUND: f32 = 1.5;
/// Upper search bound used when pre-warping.
pub const FORWARD_HIGH_BOUND: f32 = 10.0;
/// Relative interval width at which bisection stops.
pub const REL_TOLERANCE: f32 = 1e-4;
/// Bisection also stops once the upper bound falls below this floor.
///
/// Needed when the solution is zero and the relative test never converges.
pub const MIN_HIGH: f32 = 1e-5;

const MAX_ITERS: usize = 64;

/// Bisection settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InverseSearch {
    /// Upper end of the search interval.
    pub high_bound: f32,
    /// Stop when `(high - low) / low` drops below this value.
    pub rel_tolerance: f32,
    /// Stop when `high` drops below this value.
    pub min_high: f32,
}

impl InverseSearch {
    /// Settings for the given warp direction.
    pub fn for_direction(direction: WarpDirection) -> Self {
        let high_bound = match direction {
            WarpDirection::Reverse => REVERSE_HIGH_BOUND,
            WarpDirection::Forward => FORWARD_HIGH_BOUND,
        };
        Self {
            high_bound,
            ..Self::default()
        }
    }
}

impl Default for InverseSearch {
    fn default() -> Self {
        Self {
            high_bound: REVERSE_HIGH_BOUND,
            rel_tolerance: REL_TOLERANCE,
            min_high: MIN_HIGH,
        }
    }
}

/// Inverts `rsq -> scale_at(rsq)² · rsq` for one channel model.
#[derive(Debug, Clone, Copy)]
pub struct Inverter {
    model: DistortionModel,
    search: InverseSearch,
    high: f32,
}

impl Inverter {
    /// The search interval is capped at the curve's valid domain.
    pub fn new(model: DistortionModel, search: InverseSearch) -> Self {
        let high = search.high_bound.min(model.curve.max_valid_rsq());
        Self {
            model,
            search,
            high,
        }
    }

    pub fn model(&self) -> &DistortionModel {
        &self.model
    }

    pub fn search(&self) -> &InverseSearch {
        &self.search
    }

    /// Upper end of the search interval actually used.
    pub fn high_bound(&self) -> f32 {
        self.high
    }

    /// Largest target the bounded search can represent.
    ///
    /// Targets above this lie outside the usable domain of the curve; the
    /// search would saturate at [`Inverter::high_bound`].
    pub fn usable_limit(&self) -> f32 {
        self.model.radius_sq_image(self.high)
    }

    /// Squared radius whose scaled image equals `target_rsq`.
    ///
    /// Returns the lower end of the final bracket. Saturates at
    /// [`Inverter::high_bound`] when the target is out of range.
    pub fn invert(&self, target_rsq: f32) -> f32 {
        let mut low = 0.0f32;
        let mut high = self.high;
        let mut iters = 0;
        // With low == 0 the ratio is +inf, so the first pass always runs.
        while (high - low) / low > self.search.rel_tolerance
            && high > self.search.min_high
            && iters < MAX_ITERS
        {
            let mid = 0.5 * (low + high);
            if target_rsq < self.model.radius_sq_image(mid) {
                high = mid;
            } else {
                low = mid;
            }
            iters += 1;
        }
        low
    }

    /// Like [`Inverter::invert`], but `None` outside the usable domain.
    pub fn try_invert(&self, target_rsq: f32) -> Option<f32> {
        if !target_rsq.is_finite() || target_rsq < 0.0 || target_rsq > self.usable_limit() {
            return None;
        }
        Some(self.invert(target_rsq))
    }
}
