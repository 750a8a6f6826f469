//! Voice engine port: the capability set every speech backend provides.
//!
//! The chorus and the tempo calibrator only ever talk to engines through
//! [`VoiceEngine`], so real backends and test doubles are interchangeable.
//!
//! # Sharing
//!
//! All methods take `&self`. A chorus run holds each engine in an `Arc` so
//! that `stop_all` can be delivered from the controlling task while the
//! engine's own unit is suspended inside `speak`. Implementations keep their
//! profile tables behind interior mutability and must never hold a lock
//! across the `speak` suspension point.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::VoiceProfile;
use crate::error::EngineError;

/// Backend-agnostic text-to-speech engine.
#[async_trait]
pub trait VoiceEngine: Send + Sync {
    /// Store `profile` under its id. Replaces any previous profile for that id.
    fn set_voice_profile(&self, profile: VoiceProfile);

    /// Make `profile` the engine's default and also store it under its id.
    fn set_default_voice_profile(&self, profile: VoiceProfile);

    /// Look up the stored profile for `id`.
    fn voice_profile(&self, id: &str) -> Option<VoiceProfile>;

    /// The engine's default profile, if one has been set.
    fn default_voice_profile(&self) -> Option<VoiceProfile>;

    /// Speak `text` with the profile stored for `voice_id` and return the
    /// elapsed wall-clock seconds.
    ///
    /// A return of `0.0` means the duration could not be measured (for
    /// example a headless environment) and is not an error.
    async fn speak(&self, text: &str, voice_id: &str) -> Result<f64, EngineError>;

    /// Silence all in-flight speech immediately.
    ///
    /// Must be safe to call at any time, including when nothing is playing.
    fn stop_all(&self);
}

/// Creates a fresh engine for every voice of every chorus run.
///
/// Engines are never pooled: a new instance carries no stale default
/// profile or half-finished utterance from a previous run.
pub trait EngineFactory: Send + Sync {
    /// Build a new, unconfigured engine.
    fn make_engine(&self) -> Arc<dyn VoiceEngine>;
}

impl<F> EngineFactory for F
where
    F: Fn() -> Arc<dyn VoiceEngine> + Send + Sync,
{
    fn make_engine(&self) -> Arc<dyn VoiceEngine> {
        self()
    }
}

/// Seed an engine so that `profile` is both its active and default profile.
pub fn seed_engine_profile(engine: &dyn VoiceEngine, profile: &VoiceProfile) {
    engine.set_voice_profile(profile.clone());
    engine.set_default_voice_profile(profile.clone());
}

/// Read back the tuned profile for `id` from an engine.
///
/// Prefers the engine's profile for `id`; otherwise re-labels the default
/// profile's settings under `id`; otherwise falls back to the defaults for
/// a newly added voice.
pub fn tuned_profile(engine: &dyn VoiceEngine, id: &str) -> VoiceProfile {
    engine
        .voice_profile(id)
        .or_else(|| engine.default_voice_profile().map(|d| d.renamed(id)))
        .unwrap_or_else(|| VoiceProfile::with_defaults(id))
}
