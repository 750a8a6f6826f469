//! Voice runtime error types.

use chorus_core::{ClipError, SettingsError};

/// Errors from the clip player and the session facade.
///
/// Speech failures of individual chorus voices are not here: they stay
/// attached to that voice's outcome.
#[derive(Debug, thiserror::Error)]
pub enum VoiceError {
    /// `play_clip` was called before `prepare_clip`.
    #[error("No clip prepared; call prepare_clip first")]
    NoClipPrepared,

    /// The playback driver rejected an operation.
    #[error("Clip driver failed to {action}: {source}")]
    Driver {
        action: &'static str,
        source: anyhow::Error,
    },

    /// The clip waiter was resolved with a failure.
    #[error(transparent)]
    Clip(#[from] ClipError),

    /// Calibration settings or target failed validation.
    #[error("Invalid calibration settings: {0}")]
    Settings(#[from] SettingsError),

    /// No baseline voice at the requested row.
    #[error("No voice at index {0}")]
    NoSuchVoice(usize),
}
