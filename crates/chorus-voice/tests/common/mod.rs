//! Hand-written test doubles shared by the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chorus_core::{EngineError, EngineFactory, VoiceEngine, VoiceProfile};
use chorus_voice::ClipDriver;
use tokio_util::sync::CancellationToken;

// ── Engine ─────────────────────────────────────────────────────────

/// How a [`FakeEngine`] answers `speak`.
#[derive(Debug, Clone)]
pub enum Speech {
    /// Return this many seconds at once.
    Fixed(f64),
    /// Take `length / rate` seconds, without sleeping.
    PhraseOverRate { length: f64 },
    /// Sleep this long, unless `stop_all` is called.
    Slow(Duration),
    /// Fail with this error.
    Fail(EngineError),
}

/// Something that happened to a [`FakeEngine`], in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    SetProfile(VoiceProfile),
    SetDefault(VoiceProfile),
    Speak { text: String, voice_id: String, rate: Option<f64> },
    StopAll,
}

pub struct FakeEngine {
    speech: Speech,
    profiles: Mutex<HashMap<String, VoiceProfile>>,
    default_profile: Mutex<Option<VoiceProfile>>,
    calls: Mutex<Vec<Call>>,
    stop: Mutex<CancellationToken>,
}

impl FakeEngine {
    pub fn new(speech: Speech) -> Self {
        Self {
            speech,
            profiles: Mutex::new(HashMap::new()),
            default_profile: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
            stop: Mutex::new(CancellationToken::new()),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn speak_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Speak { .. }))
            .count()
    }

    pub fn stop_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::StopAll))
            .count()
    }

    pub fn spoken_rates(&self) -> Vec<f64> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Speak { rate, .. } => rate,
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl VoiceEngine for FakeEngine {
    fn set_voice_profile(&self, profile: VoiceProfile) {
        self.record(Call::SetProfile(profile.clone()));
        self.profiles
            .lock()
            .unwrap()
            .insert(profile.id.clone(), profile);
    }

    fn set_default_voice_profile(&self, profile: VoiceProfile) {
        self.record(Call::SetDefault(profile.clone()));
        *self.default_profile.lock().unwrap() = Some(profile);
    }

    fn voice_profile(&self, id: &str) -> Option<VoiceProfile> {
        self.profiles.lock().unwrap().get(id).cloned()
    }

    fn default_voice_profile(&self) -> Option<VoiceProfile> {
        self.default_profile.lock().unwrap().clone()
    }

    async fn speak(&self, text: &str, voice_id: &str) -> Result<f64, EngineError> {
        let rate = self.voice_profile(voice_id).map(|p| p.rate);
        self.record(Call::Speak {
            text: text.to_string(),
            voice_id: voice_id.to_string(),
            rate,
        });
        match &self.speech {
            Speech::Fixed(seconds) => Ok(*seconds),
            Speech::PhraseOverRate { length } => Ok(length / rate.unwrap_or(0.55)),
            Speech::Fail(e) => Err(e.clone()),
            Speech::Slow(duration) => {
                let token = self.stop.lock().unwrap().clone();
                tokio::select! {
                    () = token.cancelled() => Err(EngineError::Interrupted),
                    () = tokio::time::sleep(*duration) => Ok(duration.as_secs_f64()),
                }
            }
        }
    }

    fn stop_all(&self) {
        self.record(Call::StopAll);
        let mut token = self.stop.lock().unwrap();
        token.cancel();
        *token = CancellationToken::new();
    }
}

// ── Factory ────────────────────────────────────────────────────────

/// Hands out [`FakeEngine`]s and keeps every one it made.
pub struct FakeFactory {
    plan: Vec<Speech>,
    fallback: Speech,
    made: Mutex<Vec<Arc<FakeEngine>>>,
}

impl FakeFactory {
    /// Every engine behaves like `speech`.
    pub fn uniform(speech: Speech) -> Arc<Self> {
        Self::planned(Vec::new(), speech)
    }

    /// The n-th engine behaves like `plan[n]`, later ones like `fallback`.
    pub fn planned(plan: Vec<Speech>, fallback: Speech) -> Arc<Self> {
        Arc::new(Self {
            plan,
            fallback,
            made: Mutex::new(Vec::new()),
        })
    }

    pub fn engines(&self) -> Vec<Arc<FakeEngine>> {
        self.made.lock().unwrap().clone()
    }
}

impl EngineFactory for FakeFactory {
    fn make_engine(&self) -> Arc<dyn VoiceEngine> {
        let mut made = self.made.lock().unwrap();
        let speech = self
            .plan
            .get(made.len())
            .cloned()
            .unwrap_or_else(|| self.fallback.clone());
        let engine = Arc::new(FakeEngine::new(speech));
        made.push(Arc::clone(&engine));
        engine
    }
}

// ── Clip driver ────────────────────────────────────────────────────

#[derive(Default)]
pub struct FakeDriver {
    pub loads: AtomicUsize,
    pub plays: AtomicUsize,
    pub stops: AtomicUsize,
    pub fail_play: bool,
}

impl FakeDriver {
    pub fn failing() -> Self {
        Self {
            fail_play: true,
            ..Self::default()
        }
    }

    pub fn plays(&self) -> usize {
        self.plays.load(Ordering::SeqCst)
    }

    pub fn stops(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }
}

impl ClipDriver for FakeDriver {
    fn load(&self, _path: &Path, _gain_db: f32) -> anyhow::Result<()> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn play(&self) -> anyhow::Result<()> {
        if self.fail_play {
            anyhow::bail!("device busy");
        }
        self.plays.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn stop(&self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
    }
}

pub fn profile(id: &str, rate: f64) -> VoiceProfile {
    VoiceProfile::new(id, rate, 1.0, 1.0)
}
