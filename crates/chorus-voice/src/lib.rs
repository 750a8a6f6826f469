//! Runtime side of chorus: concurrent voice orchestration, tempo
//! calibration and clip playback.
//!
//! - [`Chorus`] fans a phrase out to one fresh engine per profile.
//! - [`TempoCalibrator`] fits a voice's rate to a target duration.
//! - [`ClipPlayer`] plays one-shot clips and resolves their waiters through
//!   [`ClipWaiterRegistry`], surviving interruptions and route changes.
//! - [`ChorusSession`] is the caller-side facade over all three.
//! - [`backend`] holds engine implementations.

#![deny(unused_crate_dependencies)]

pub mod backend;
pub mod calibrator;
pub mod chorus;
pub mod clip;
pub mod error;
pub mod session;
pub mod waiters;

// Re-export key types for convenience
pub use backend::{SimulatedConfig, SimulatedEngine, SimulatedEngineFactory};
pub use calibrator::{CalibrationResult, CalibrationStop, TempoCalibrator};
pub use chorus::{Chorus, ChorusReport, VoiceOutcome, VoiceReport};
pub use clip::{ClipDriver, ClipPlayer, ClipSessionState, NoopClipDriver, PreparedClip};
pub use error::VoiceError;
pub use session::ChorusSession;
pub use waiters::{ClipOutcome, ClipWaiter, ClipWaiterRegistry, WaiterPolicy};

// Re-exported so callers can build cancellation tokens without a direct dep.
pub use tokio_util::sync::CancellationToken;

#[cfg(test)]
use tokio_test as _;
