//! Calibration settings and validation.
//!
//! These are pure domain types with no infrastructure dependencies. The
//! thresholds below are fixed constants, not settings.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default allowed absolute error, in seconds.
pub const DEFAULT_TOLERANCE_SECONDS: f64 = 0.05;

/// Default number of measurement passes.
pub const DEFAULT_MAX_ITERATIONS: u32 = 3;

/// Rate used to seed calibration when the engine has no profile at all.
pub const FALLBACK_SEED_RATE: f64 = 0.55;

/// A rate step smaller than this ends calibration.
pub const NEGLIGIBLE_RATE_CHANGE: f64 = 0.001;

/// Floor for the target duration in the proportional update.
pub const MIN_TARGET_SECONDS: f64 = 1e-4;

/// Inclusive rate bounds for calibration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateBounds {
    /// Lowest rate calibration may choose.
    pub min: f64,
    /// Highest rate calibration may choose.
    pub max: f64,
}

impl RateBounds {
    /// The full `[0, 1]` rate range.
    pub const FULL: Self = Self { min: 0.0, max: 1.0 };

    /// Clamp `rate` into the bounds.
    pub fn clamp(&self, rate: f64) -> f64 {
        rate.max(self.min).min(self.max)
    }
}

impl Default for RateBounds {
    fn default() -> Self {
        Self::FULL
    }
}

/// Tempo calibration settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CalibrationSettings {
    /// Allowed absolute error in seconds before stopping.
    pub tolerance: f64,

    /// Maximum number of measurement passes.
    pub max_iterations: u32,

    /// Allowed rate range.
    pub rate_bounds: RateBounds,
}

impl Default for CalibrationSettings {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE_SECONDS,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            rate_bounds: RateBounds::FULL,
        }
    }
}

/// Settings validation failures.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SettingsError {
    /// Tolerance must be a positive, finite number of seconds.
    #[error("Invalid tolerance: {0} (must be positive and finite)")]
    InvalidTolerance(f64),

    /// At least one measurement pass is required.
    #[error("max_iterations must be at least 1")]
    NoIterations,

    /// Bounds must be finite, ordered and inside `[0, 1]`.
    #[error("Invalid rate bounds: [{min}, {max}]")]
    InvalidRateBounds {
        /// Requested lower bound.
        min: f64,
        /// Requested upper bound.
        max: f64,
    },

    /// Target duration must be a non-negative number.
    #[error("Invalid target duration: {0}")]
    InvalidTarget(f64),
}

/// Validate calibration settings.
pub fn validate_calibration_settings(settings: &CalibrationSettings) -> Result<(), SettingsError> {
    if !settings.tolerance.is_finite() || settings.tolerance <= 0.0 {
        return Err(SettingsError::InvalidTolerance(settings.tolerance));
    }
    if settings.max_iterations == 0 {
        return Err(SettingsError::NoIterations);
    }
    let RateBounds { min, max } = settings.rate_bounds;
    let in_unit = |v: f64| v.is_finite() && (0.0..=1.0).contains(&v);
    if !in_unit(min) || !in_unit(max) || min > max {
        return Err(SettingsError::InvalidRateBounds { min, max });
    }
    Ok(())
}

/// Validate a calibration target duration in seconds.
///
/// Zero is accepted; the update floors it at [`MIN_TARGET_SECONDS`].
pub fn validate_target_seconds(target: f64) -> Result<(), SettingsError> {
    if !target.is_nan() && target >= 0.0 {
        Ok(())
    } else {
        Err(SettingsError::InvalidTarget(target))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let settings = CalibrationSettings::default();
        assert!(validate_calibration_settings(&settings).is_ok());
        assert_eq!(settings.max_iterations, 3);
        assert!((settings.tolerance - 0.05).abs() < f64::EPSILON);
    }

    #[test]
    fn rejects_bad_tolerance() {
        for tolerance in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let settings = CalibrationSettings {
                tolerance,
                ..Default::default()
            };
            assert!(matches!(
                validate_calibration_settings(&settings),
                Err(SettingsError::InvalidTolerance(_))
            ));
        }
    }

    #[test]
    fn rejects_zero_iterations() {
        let settings = CalibrationSettings {
            max_iterations: 0,
            ..Default::default()
        };
        assert_eq!(
            validate_calibration_settings(&settings),
            Err(SettingsError::NoIterations)
        );
    }

    #[test]
    fn rejects_inverted_or_out_of_range_bounds() {
        for (min, max) in [(0.8, 0.2), (-0.1, 1.0), (0.0, 1.5), (f64::NAN, 1.0)] {
            let settings = CalibrationSettings {
                rate_bounds: RateBounds { min, max },
                ..Default::default()
            };
            assert!(matches!(
                validate_calibration_settings(&settings),
                Err(SettingsError::InvalidRateBounds { .. })
            ));
        }
    }

    #[test]
    fn partial_json_fills_defaults() {
        let settings: CalibrationSettings = serde_json::from_str(r#"{"maxIterations":5}"#).unwrap();
        assert_eq!(settings.max_iterations, 5);
        assert_eq!(settings.rate_bounds, RateBounds::FULL);
    }

    #[test]
    fn target_validation() {
        assert!(validate_target_seconds(5.0).is_ok());
        assert!(validate_target_seconds(0.0).is_ok());
        assert!(validate_target_seconds(-0.5).is_err());
        assert!(validate_target_seconds(f64::NAN).is_err());
    }

    #[test]
    fn bounds_clamp() {
        let bounds = RateBounds { min: 0.2, max: 0.8 };
        assert!((bounds.clamp(0.1) - 0.2).abs() < f64::EPSILON);
        assert!((bounds.clamp(0.9) - 0.8).abs() < f64::EPSILON);
        assert!((bounds.clamp(0.5) - 0.5).abs() < f64::EPSILON);
    }
}
