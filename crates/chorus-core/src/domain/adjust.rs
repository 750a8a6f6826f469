//! Global adjustment mapper: baseline profiles + two sliders → effective profiles.
//!
//! The mapper is a pure function of its arguments. The effective set is
//! always recomputed from the baseline in full; it is never patched in
//! place, so a voice removed from the baseline cannot reappear in the
//! output and repeated calls with the same inputs produce equal outputs.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use super::profile::{PITCH_RANGE, RATE_RANGE, VoiceProfile, clamp_f32, clamp_f64};

/// How much downward travel of the rate slider (below 1.0) pulls a rate
/// all the way to zero. With 0.75, a slider at 0.25 yields rate 0.
pub const SLOW_RANGE: f64 = 0.75;

/// Travel of the global rate slider.
pub const RATE_SCALE_RANGE: RangeInclusive<f64> = 0.25..=2.0;

/// Travel of the global pitch slider.
pub const PITCH_OFFSET_RANGE: RangeInclusive<f64> = -0.5..=0.5;

/// The two global sliders applied on top of the baseline profiles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Tuning {
    /// Rate slider. `1.0` is neutral; above pushes rates toward 1.0, below
    /// pulls them toward 0.0.
    pub rate_scale: f64,

    /// Added to every profile's pitch before clamping.
    pub pitch_offset: f64,
}

impl Tuning {
    /// Neutral sliders: the effective set equals the baseline.
    pub const NEUTRAL: Self = Self {
        rate_scale: 1.0,
        pitch_offset: 0.0,
    };

    /// Create a tuning from slider values.
    pub const fn new(rate_scale: f64, pitch_offset: f64) -> Self {
        Self {
            rate_scale,
            pitch_offset,
        }
    }

    /// Apply these sliders to `base`. See [`apply_adjustments`].
    pub fn apply(&self, base: &[VoiceProfile]) -> Vec<VoiceProfile> {
        apply_adjustments(base, self.rate_scale, self.pitch_offset)
    }

    /// Whether both sliders sit inside their UI travel.
    pub fn is_within_slider_ranges(&self) -> bool {
        RATE_SCALE_RANGE.contains(&self.rate_scale)
            && PITCH_OFFSET_RANGE.contains(&self.pitch_offset)
    }
}

impl Default for Tuning {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

/// Map a baseline profile list through the global sliders.
///
/// Output length, order and ids match `base` one-to-one. Volume is left
/// untouched.
pub fn apply_adjustments(
    base: &[VoiceProfile],
    rate_scale: f64,
    pitch_offset: f64,
) -> Vec<VoiceProfile> {
    base.iter()
        .map(|profile| VoiceProfile {
            id: profile.id.clone(),
            rate: adjusted_rate(profile.rate, rate_scale),
            pitch: adjusted_pitch(profile.pitch, pitch_offset),
            volume: profile.volume,
        })
        .collect()
}

/// Two-piece rate mapping.
///
/// At or above 1.0 the rate is interpolated toward 1.0 by the slider's
/// headroom; below 1.0 it is pulled toward 0.0 by a fraction of itself.
fn adjusted_rate(base_rate: f64, rate_scale: f64) -> f64 {
    let unit = 0.0..=1.0;
    let rate = if rate_scale >= 1.0 {
        let factor = clamp_f64(rate_scale - 1.0, &unit);
        (1.0 - base_rate).mul_add(factor, base_rate)
    } else {
        // NaN sliders land here; the clamp turns them into a zero factor.
        let factor = clamp_f64((1.0 - rate_scale) / SLOW_RANGE, &unit);
        base_rate.mul_add(-factor, base_rate)
    };
    clamp_f64(rate, &RATE_RANGE)
}

#[allow(clippy::cast_possible_truncation)]
fn adjusted_pitch(base_pitch: f32, pitch_offset: f64) -> f32 {
    let offset = if pitch_offset.is_finite() {
        pitch_offset as f32
    } else {
        0.0
    };
    clamp_f32(base_pitch + offset, &PITCH_RANGE)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(id: &str, rate: f64, pitch: f32) -> VoiceProfile {
        VoiceProfile::new(id, rate, pitch, 1.0)
    }

    #[test]
    fn neutral_sliders_are_identity() {
        let base = vec![profile("a", 0.3, 1.0), profile("b", 0.8, 1.4)];
        assert_eq!(Tuning::NEUTRAL.apply(&base), base);
    }

    #[test]
    fn fast_slider_interpolates_toward_one() {
        let out = apply_adjustments(&[profile("a", 0.5, 1.0)], 1.5, 0.0);
        assert!((out[0].rate - 0.75).abs() < 1e-9);

        let out = apply_adjustments(&[profile("a", 0.5, 1.0)], 2.0, 0.0);
        assert!((out[0].rate - 1.0).abs() < 1e-9);
    }

    #[test]
    fn slow_slider_pulls_toward_zero() {
        // (1.0 - 0.625) / 0.75 = 0.5 → half of the rate removed.
        let out = apply_adjustments(&[profile("a", 0.6, 1.0)], 0.625, 0.0);
        assert!((out[0].rate - 0.3).abs() < 1e-9);

        let out = apply_adjustments(&[profile("a", 0.6, 1.0)], 0.25, 0.0);
        assert!(out[0].rate.abs() < 1e-9);
    }

    #[test]
    fn extreme_sliders_stay_clamped() {
        let out = apply_adjustments(&[profile("v", 0.95, 1.9)], 2.0, 0.5);
        assert_eq!(out.len(), 1);
        assert!((0.0..=1.0).contains(&out[0].rate));
        assert!((0.5..=2.0).contains(&out[0].pitch));

        let out = apply_adjustments(&[profile("v", 0.95, 0.6)], 10.0, -3.0);
        assert!((out[0].rate - 1.0).abs() < 1e-9);
        assert!((out[0].pitch - 0.5).abs() < 1e-6);
    }

    #[test]
    fn non_finite_sliders_do_not_poison_output() {
        let base = [profile("v", 0.4, 1.2)];
        let out = apply_adjustments(&base, f64::NAN, f64::NAN);
        assert!((out[0].rate - 0.4).abs() < 1e-9);
        assert!((out[0].pitch - 1.2).abs() < 1e-6);
    }

    #[test]
    fn preserves_order_ids_and_volume() {
        let base = vec![
            VoiceProfile::new("x", 0.2, 1.0, 0.3),
            VoiceProfile::new("x", 0.9, 0.7, 0.6),
            VoiceProfile::new("y", 0.5, 1.5, 1.0),
        ];
        let out = apply_adjustments(&base, 1.3, -0.2);
        let ids: Vec<_> = out.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["x", "x", "y"]);
        let volumes: Vec<_> = out.iter().map(|p| p.volume).collect();
        assert_eq!(volumes, [0.3, 0.6, 1.0]);
    }

    #[test]
    fn tuning_defaults_when_fields_missing() {
        let tuning: Tuning = serde_json::from_str("{}").unwrap();
        assert_eq!(tuning, Tuning::NEUTRAL);

        let tuning: Tuning = serde_json::from_str(r#"{"rateScale":1.25}"#).unwrap();
        assert!((tuning.rate_scale - 1.25).abs() < f64::EPSILON);
        assert!(tuning.pitch_offset.abs() < f64::EPSILON);
    }

    #[test]
    fn slider_range_check() {
        assert!(Tuning::new(0.25, -0.5).is_within_slider_ranges());
        assert!(!Tuning::new(2.5, 0.0).is_within_slider_ranges());
        assert!(!Tuning::new(1.0, 0.75).is_within_slider_ranges());
    }
}
