//! Voice engine backends: concrete [`VoiceEngine`](chorus_core::VoiceEngine)
//! implementations.
//!
//! | Module          | Engine                | Notes |
//! |-----------------|-----------------------|-------|
//! | [`simulated`]   | [`SimulatedEngine`]   | Timing model only; no audio device |
//!
//! Platform synthesisers plug in through the same trait.

pub mod simulated;
pub mod util;

pub use simulated::{
    NOMINAL_RATE, SECONDS_PER_CHAR, SimulatedConfig, SimulatedEngine, SimulatedEngineFactory,
};
pub use util::{is_ci, is_ci_with};
