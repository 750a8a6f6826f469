//! Core domain types and ports for driving a chorus of speech voices.
//!
//! This crate holds the pure parts: voice profiles, the global adjustment
//! mapper, the engine and observer traits, playback events, the persisted
//! profile document and calibration settings. Runtime adapters live in
//! `chorus-voice`.

#![deny(unused_crate_dependencies)]

pub mod domain;
pub mod error;
pub mod events;
pub mod ports;
pub mod profiles_file;
pub mod settings;

// Re-export commonly used types for convenience
pub use domain::{
    ChorusSelection, DEFAULT_PITCH, DEFAULT_RATE, DEFAULT_VOLUME, PITCH_OFFSET_RANGE, PITCH_RANGE,
    RATE_RANGE, RATE_SCALE_RANGE, SLOW_RANGE, Tuning, VOLUME_RANGE, VoiceProfile,
    apply_adjustments, clamp_f32, clamp_f64,
};
pub use error::{ClipError, EngineError};
pub use events::{PlaybackEvent, PlaybackEvents, RouteChangeReason};
pub use ports::{
    CalibrationObserver, CalibrationProgress, ChannelObserver, EngineFactory, FALLBACK_VOICE_NAME,
    NoopObserver, StaticVoiceList, VoiceEngine, VoiceInfo, VoiceNameResolver,
    resolve_display_name, seed_engine_profile, tuned_profile,
};
pub use profiles_file::{ProfilesFile, ProfilesFileError};
pub use settings::{
    CalibrationSettings, DEFAULT_MAX_ITERATIONS, DEFAULT_TOLERANCE_SECONDS, FALLBACK_SEED_RATE,
    MIN_TARGET_SECONDS, NEGLIGIBLE_RATE_CHANGE, RateBounds, SettingsError,
    validate_calibration_settings, validate_target_seconds,
};

#[cfg(test)]
use tokio_test as _;
