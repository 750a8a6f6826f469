//! Domain value types and pure transformations.

pub mod adjust;
pub mod profile;
pub mod selection;

pub use adjust::{PITCH_OFFSET_RANGE, RATE_SCALE_RANGE, SLOW_RANGE, Tuning, apply_adjustments};
pub use profile::{
    DEFAULT_PITCH, DEFAULT_RATE, DEFAULT_VOLUME, PITCH_RANGE, RATE_RANGE, VOLUME_RANGE,
    VoiceProfile, clamp_f32, clamp_f64,
};
pub use selection::ChorusSelection;
