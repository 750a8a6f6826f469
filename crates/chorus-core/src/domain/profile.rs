//! Voice profile value type.
//!
//! A [`VoiceProfile`] describes how one voice should speak. Profiles are
//! immutable values once handed to an engine or a chorus run: every
//! adjustment produces a new profile rather than mutating a shared one.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

/// Valid range for a profile's speaking rate.
pub const RATE_RANGE: RangeInclusive<f64> = 0.0..=1.0;

/// Platform pitch bounds applied by the adjustment mapper.
pub const PITCH_RANGE: RangeInclusive<f32> = 0.5..=2.0;

/// Valid range for a profile's volume.
pub const VOLUME_RANGE: RangeInclusive<f32> = 0.0..=1.0;

/// Rate given to a newly added voice.
pub const DEFAULT_RATE: f64 = 0.55;

/// Pitch given to a newly added voice.
pub const DEFAULT_PITCH: f32 = 1.0;

/// Volume given to a newly added voice.
pub const DEFAULT_VOLUME: f32 = 0.9;

/// How one voice should speak.
///
/// Identity is `id`, but several profiles may share an id: a chorus is
/// allowed to contain the same voice twice with different settings, and
/// each entry is tracked independently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceProfile {
    /// Opaque voice identifier understood by the engine.
    pub id: String,

    /// Speaking rate in `[0, 1]`.
    pub rate: f64,

    /// Pitch multiplier, typically in `[0.5, 2.0]`.
    pub pitch: f32,

    /// Volume in `[0, 1]`.
    pub volume: f32,
}

impl VoiceProfile {
    /// Create a profile from explicit values.
    pub fn new(id: impl Into<String>, rate: f64, pitch: f32, volume: f32) -> Self {
        Self {
            id: id.into(),
            rate,
            pitch,
            volume,
        }
    }

    /// Create a profile for `id` with the defaults used for newly added voices.
    pub fn with_defaults(id: impl Into<String>) -> Self {
        Self::new(id, DEFAULT_RATE, DEFAULT_PITCH, DEFAULT_VOLUME)
    }

    /// Return a copy of this profile with a different rate.
    #[must_use]
    pub fn with_rate(&self, rate: f64) -> Self {
        Self {
            rate,
            ..self.clone()
        }
    }

    /// Return a copy of this profile under a different id, keeping the
    /// rate, pitch and volume.
    #[must_use]
    pub fn renamed(&self, id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..self.clone()
        }
    }
}

/// Clamp `value` into `range`.
///
/// Unlike [`f64::clamp`], a NaN input collapses to the lower bound instead of
/// propagating, so callers never hand a NaN rate to an engine.
pub fn clamp_f64(value: f64, range: &RangeInclusive<f64>) -> f64 {
    if value.is_nan() {
        return *range.start();
    }
    value.max(*range.start()).min(*range.end())
}

/// `f32` counterpart of [`clamp_f64`].
pub fn clamp_f32(value: f32, range: &RangeInclusive<f32>) -> f32 {
    if value.is_nan() {
        return *range.start();
    }
    value.max(*range.start()).min(*range.end())
}
