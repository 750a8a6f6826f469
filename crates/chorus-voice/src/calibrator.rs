//! Tempo calibration: fit one voice's rate so a phrase takes a target time.
//!
//! The controller is proportional: spoken duration is roughly inversely
//! proportional to rate, so `rate * measured / target` lands close to the
//! right value in one step and the loop needs at most a few real
//! measurements. Each measurement costs actual playback time.
//!
//! Iterations are strictly sequential. Cancellation is checked before each
//! measurement and raced against the measurement itself; a measurement
//! anomaly (zero or non-finite duration) ends the loop with the current
//! rate rather than failing.

use std::sync::Arc;

use chorus_core::{
    CalibrationObserver, CalibrationProgress, CalibrationSettings, EngineError,
    FALLBACK_SEED_RATE, MIN_TARGET_SECONDS, NEGLIGIBLE_RATE_CHANGE, NoopObserver, SettingsError,
    VoiceEngine, VoiceProfile, validate_calibration_settings, validate_target_seconds,
};
use tokio_util::sync::CancellationToken;

/// Why a calibration run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CalibrationStop {
    /// The last measurement was within tolerance.
    Converged,
    /// The engine could not measure (zero or non-finite duration).
    ZeroMeasurement,
    /// The next correction would barely move the rate.
    NegligibleChange,
    /// Every allowed measurement was used.
    IterationsExhausted,
    /// The cancellation token fired.
    Cancelled,
    /// The engine failed to speak; the last good rate is kept.
    Failed(EngineError),
}

/// Result of [`TempoCalibrator::fit_rate`].
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationResult {
    /// Rate left on the engine for the voice.
    pub final_rate: f64,
    /// Last measured duration in seconds (`0.0` if none).
    pub measured_seconds: f64,
    /// Measurements taken.
    pub iterations: u32,
    /// Why the run ended.
    pub stop: CalibrationStop,
}

impl CalibrationResult {
    /// The last measurement landed within tolerance.
    pub fn converged(&self) -> bool {
        self.stop == CalibrationStop::Converged
    }
}

/// Proportional rate controller.
pub struct TempoCalibrator {
    settings: CalibrationSettings,
    cancel: CancellationToken,
    observer: Arc<dyn CalibrationObserver>,
}

impl TempoCalibrator {
    /// Create a calibrator with validated settings.
    pub fn new(settings: CalibrationSettings) -> Result<Self, SettingsError> {
        validate_calibration_settings(&settings)?;
        Ok(Self {
            settings,
            cancel: CancellationToken::new(),
            observer: Arc::new(NoopObserver),
        })
    }

    /// Use `token` as the cancellation signal.
    #[must_use]
    pub fn with_cancel_token(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Report each iteration to `observer`.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn CalibrationObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Settings this calibrator was validated with.
    pub const fn settings(&self) -> &CalibrationSettings {
        &self.settings
    }

    /// A handle that cancels this calibrator's runs.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Adjust the rate stored on `engine` for `voice_id` until speaking
    /// `phrase` takes about `target_seconds`.
    ///
    /// The seed is the engine's profile for the voice, else the default
    /// profile's rate, else [`FALLBACK_SEED_RATE`]. The fitted rate is left
    /// on the engine.
    ///
    /// A seed taken from the default profile keeps only its rate: pitch and
    /// volume start at `1.0`. [`tuned_profile`](chorus_core::tuned_profile)
    /// instead copies pitch and volume from the default profile.
    pub async fn fit_rate(
        &self,
        engine: &dyn VoiceEngine,
        voice_id: &str,
        phrase: &str,
        target_seconds: f64,
    ) -> Result<CalibrationResult, SettingsError> {
        validate_target_seconds(target_seconds)?;
        let CalibrationSettings {
            tolerance,
            max_iterations,
            rate_bounds,
        } = self.settings;

        let mut profile = engine.voice_profile(voice_id).unwrap_or_else(|| {
            let seed = engine
                .default_voice_profile()
                .map_or(FALLBACK_SEED_RATE, |d| d.rate);
            VoiceProfile::new(voice_id, seed, 1.0, 1.0)
        });
        engine.set_voice_profile(profile.clone());

        tracing::info!(
            voice = %voice_id,
            seed_rate = profile.rate,
            target_seconds,
            tolerance,
            max_iterations,
            "Starting tempo calibration"
        );

        let mut measured = 0.0;
        let mut iterations = 0;
        let mut stop = CalibrationStop::IterationsExhausted;

        for i in 0..max_iterations {
            if self.cancel.is_cancelled() {
                engine.stop_all();
                stop = CalibrationStop::Cancelled;
                break;
            }

            iterations = i + 1;
            let outcome = tokio::select! {
                biased;
                () = self.cancel.cancelled() => Err(EngineError::Interrupted),
                result = engine.speak(phrase, voice_id) => result,
            };
            if self.cancel.is_cancelled() {
                if let Ok(seconds) = outcome {
                    measured = seconds;
                }
                engine.stop_all();
                stop = CalibrationStop::Cancelled;
                break;
            }
            measured = match outcome {
                Ok(seconds) => seconds,
                Err(e) => {
                    tracing::warn!(voice = %voice_id, error = %e, "Calibration measurement failed");
                    stop = CalibrationStop::Failed(e);
                    break;
                }
            };

            let current = profile.rate;

            if !measured.is_finite() || measured <= 0.0 {
                tracing::warn!(voice = %voice_id, measured, "Unmeasurable duration; keeping rate");
                self.report(i, measured, current);
                stop = CalibrationStop::ZeroMeasurement;
                break;
            }

            if (measured - target_seconds).abs() <= tolerance {
                self.report(i, measured, current);
                stop = CalibrationStop::Converged;
                break;
            }

            let mut candidate = current * (measured / target_seconds.max(MIN_TARGET_SECONDS));
            if !candidate.is_finite() {
                candidate = current;
            }
            let candidate = rate_bounds.clamp(candidate);

            if (candidate - current).abs() < NEGLIGIBLE_RATE_CHANGE {
                self.report(i, measured, current);
                stop = CalibrationStop::NegligibleChange;
                break;
            }

            self.report(i, measured, candidate);
            profile = profile.with_rate(candidate);
            engine.set_voice_profile(profile.clone());
        }

        let result = CalibrationResult {
            final_rate: profile.rate,
            measured_seconds: measured,
            iterations,
            stop,
        };
        tracing::info!(
            voice = %voice_id,
            final_rate = result.final_rate,
            measured_seconds = result.measured_seconds,
            iterations = result.iterations,
            stop = ?result.stop,
            "Tempo calibration finished"
        );
        Ok(result)
    }

    fn report(&self, iteration: u32, measured_seconds: f64, rate: f64) {
        tracing::debug!(iteration, measured_seconds, rate, "Calibration iteration");
        self.observer.on_iteration(CalibrationProgress {
            iteration,
            measured_seconds,
            rate,
        });
    }
}
