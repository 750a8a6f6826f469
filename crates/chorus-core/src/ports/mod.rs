//! Port definitions: the interfaces the core consumes.
//!
//! Concrete implementations live in adapter crates (`chorus-voice`) or in
//! tests. Nothing in this module depends on a particular runtime backend.

pub mod engine;
pub mod progress;
pub mod voice_names;

pub use engine::{EngineFactory, VoiceEngine, seed_engine_profile, tuned_profile};
pub use progress::{CalibrationObserver, CalibrationProgress, ChannelObserver, NoopObserver};
pub use voice_names::{
    FALLBACK_VOICE_NAME, StaticVoiceList, VoiceInfo, VoiceNameResolver, resolve_display_name,
};
