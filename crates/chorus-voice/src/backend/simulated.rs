//! Simulated speech engine: implements [`VoiceEngine`] without audio.
//!
//! Speaking sleeps for a modelled duration that grows with text length and
//! shrinks with rate, so the calibrator and the chorus behave as they would
//! against a real synthesiser. `time_scale` compresses wall time for demos;
//! reported durations are always in modelled seconds.
//!
//! In headless mode `speak` returns `0.0` at once, the "could not measure"
//! sentinel a real backend produces when no audio device is present.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use chorus_core::{EngineError, EngineFactory, VoiceEngine, VoiceProfile};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use super::util;

/// Modelled seconds per character at [`NOMINAL_RATE`].
pub const SECONDS_PER_CHAR: f64 = 0.06;

/// Rate at which [`SECONDS_PER_CHAR`] holds.
pub const NOMINAL_RATE: f64 = 0.5;

/// Rates below this are treated as this, so rate 0 does not take forever.
const MIN_EFFECTIVE_RATE: f64 = 0.05;

/// Configuration for [`SimulatedEngine`].
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SimulatedConfig {
    /// Modelled seconds per character at the nominal rate.
    pub seconds_per_char: f64,

    /// Wall seconds slept per modelled second. `0.0` never sleeps.
    pub time_scale: f64,

    /// Return `0.0` from every `speak` call.
    pub headless: bool,

    /// Voice ids that fail with [`EngineError::Unavailable`].
    pub unavailable_voices: Vec<String>,
}

impl Default for SimulatedConfig {
    fn default() -> Self {
        Self {
            seconds_per_char: SECONDS_PER_CHAR,
            time_scale: 1.0,
            headless: false,
            unavailable_voices: Vec::new(),
        }
    }
}

impl SimulatedConfig {
    /// Defaults, with headless mode taken from the environment.
    pub fn from_env() -> Self {
        Self {
            headless: util::is_ci(),
            ..Self::default()
        }
    }

    /// Modelled duration of `text` at `rate`.
    pub fn modelled_seconds(&self, text: &str, rate: f64) -> f64 {
        #[allow(clippy::cast_precision_loss)]
        let chars = text.chars().count() as f64;
        let rate = if rate.is_finite() {
            rate.max(MIN_EFFECTIVE_RATE)
        } else {
            NOMINAL_RATE
        };
        chars * self.seconds_per_char * NOMINAL_RATE / rate
    }
}

/// Engine that models speech timing with async sleeps.
pub struct SimulatedEngine {
    config: SimulatedConfig,
    profiles: Mutex<HashMap<String, VoiceProfile>>,
    default_profile: Mutex<Option<VoiceProfile>>,
    /// Replaced on every `stop_all` so later utterances are unaffected.
    stop: Mutex<CancellationToken>,
}

impl SimulatedEngine {
    pub fn new(config: SimulatedConfig) -> Self {
        Self {
            config,
            profiles: Mutex::new(HashMap::new()),
            default_profile: Mutex::new(None),
            stop: Mutex::new(CancellationToken::new()),
        }
    }

    pub const fn config(&self) -> &SimulatedConfig {
        &self.config
    }

    fn profiles(&self) -> MutexGuard<'_, HashMap<String, VoiceProfile>> {
        self.profiles.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn default_slot(&self) -> MutexGuard<'_, Option<VoiceProfile>> {
        self.default_profile
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn stop_token(&self) -> CancellationToken {
        self.stop
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Default for SimulatedEngine {
    fn default() -> Self {
        Self::new(SimulatedConfig::default())
    }
}

#[async_trait]
impl VoiceEngine for SimulatedEngine {
    fn set_voice_profile(&self, profile: VoiceProfile) {
        self.profiles().insert(profile.id.clone(), profile);
    }

    fn set_default_voice_profile(&self, profile: VoiceProfile) {
        self.profiles().insert(profile.id.clone(), profile.clone());
        *self.default_slot() = Some(profile);
    }

    fn voice_profile(&self, id: &str) -> Option<VoiceProfile> {
        self.profiles().get(id).cloned()
    }

    fn default_voice_profile(&self) -> Option<VoiceProfile> {
        self.default_slot().clone()
    }

    async fn speak(&self, text: &str, voice_id: &str) -> Result<f64, EngineError> {
        if self.config.unavailable_voices.iter().any(|v| v == voice_id) {
            return Err(EngineError::Unavailable(voice_id.to_string()));
        }
        let rate = self
            .voice_profile(voice_id)
            .or_else(|| self.default_voice_profile())
            .map_or(NOMINAL_RATE, |p| p.rate);

        if self.config.headless || text.trim().is_empty() {
            tracing::debug!(voice = %voice_id, "Nothing measurable to speak");
            return Ok(0.0);
        }

        let modelled = self.config.modelled_seconds(text, rate);
        let scale = self.config.time_scale;
        tracing::debug!(voice = %voice_id, rate, modelled, "Simulated speech started");

        if scale <= 0.0 || !scale.is_finite() {
            return Ok(modelled);
        }

        let wait = Duration::try_from_secs_f64(modelled * scale).map_err(|e| {
            EngineError::Synthesis(format!("cannot model {modelled}s at time scale {scale}: {e}"))
        })?;

        let token = self.stop_token();
        let started = Instant::now();
        tokio::select! {
            biased;
            () = token.cancelled() => {
                tracing::debug!(voice = %voice_id, "Simulated speech interrupted");
                Err(EngineError::Interrupted)
            }
            () = tokio::time::sleep(wait) => {
                Ok(started.elapsed().as_secs_f64() / scale)
            }
        }
    }

    fn stop_all(&self) {
        let mut token = self.stop.lock().unwrap_or_else(PoisonError::into_inner);
        token.cancel();
        *token = CancellationToken::new();
    }
}

/// Builds a fresh [`SimulatedEngine`] per chorus voice.
#[derive(Debug, Clone, Default)]
pub struct SimulatedEngineFactory {
    config: SimulatedConfig,
}

impl SimulatedEngineFactory {
    pub const fn new(config: SimulatedConfig) -> Self {
        Self { config }
    }
}

impl EngineFactory for SimulatedEngineFactory {
    fn make_engine(&self) -> Arc<dyn VoiceEngine> {
        Arc::new(SimulatedEngine::new(self.config.clone()))
    }
}
