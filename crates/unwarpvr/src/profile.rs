//! Per-user device profile lookup.
//!
//! Profile storage and discovery live outside this crate. A host plugs its
//! own lookup in through [`ProfileSource`]; the filter only asks for the
//! eye-relief dial.

use crate::device::{Device, DEFAULT_EYE_RELIEF, MAX_EYE_RELIEF};
use crate::error::ProfileLookupError;

/// Supplies user-profile values for a device.
pub trait ProfileSource {
    /// Eye-relief dial stored in the active profile, if any.
    fn eye_relief(&self, device: Device) -> Result<Option<u8>, ProfileLookupError>;
}

/// Source with no profiles; always yields `Ok(None)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProfile;

impl ProfileSource for NoProfile {
    fn eye_relief(&self, _device: Device) -> Result<Option<u8>, ProfileLookupError> {
        Ok(None)
    }
}

/// Source returning a fixed eye relief for every device.
#[derive(Debug, Clone, Copy)]
pub struct FixedProfile {
    pub eye_relief: u8,
}

impl ProfileSource for FixedProfile {
    fn eye_relief(&self, _device: Device) -> Result<Option<u8>, ProfileLookupError> {
        Ok(Some(self.eye_relief))
    }
}

/// Eye relief with precedence: explicit override, then profile, then
/// [`DEFAULT_EYE_RELIEF`]. Lookup failures and out-of-range profile values
/// are logged and fall back.
pub fn resolve_eye_relief(
    device: Device,
    override_dial: Option<u8>,
    source: &dyn ProfileSource,
) -> u8 {
    if let Some(dial) = override_dial {
        return dial;
    }
    match source.eye_relief(device) {
        Ok(Some(dial)) if dial <= MAX_EYE_RELIEF => dial,
        Ok(Some(dial)) => {
            tracing::warn!(
                %device,
                dial,
                fallback = DEFAULT_EYE_RELIEF,
                "profile eye relief out of range, using default"
            );
            DEFAULT_EYE_RELIEF
        }
        Ok(None) => DEFAULT_EYE_RELIEF,
        Err(err) => {
            tracing::warn!(
                %device,
                error = %err,
                fallback = DEFAULT_EYE_RELIEF,
                "profile lookup failed, using default eye relief"
            );
            DEFAULT_EYE_RELIEF
        }
    }
}
