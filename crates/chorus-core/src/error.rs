//! Error types shared by engines, the chorus and clip playback.

use thiserror::Error;

/// Failure of a single engine operation.
///
/// A chorus isolates these per voice: one voice failing never cancels its
/// siblings.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EngineError {
    /// The engine could not synthesise or play the utterance.
    #[error("Speech synthesis failed: {0}")]
    Synthesis(String),

    /// Speaking was cut short by `stop_all`.
    #[error("Speech interrupted")]
    Interrupted,

    /// The requested voice is not available on this engine.
    #[error("Voice '{0}' is not available")]
    Unavailable(String),
}

/// Typed failure delivered to a pending clip waiter.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum ClipError {
    /// Playback was interrupted by the audio session.
    #[error("Clip playback interrupted")]
    Interrupted,

    /// Playback was stopped explicitly or the waiter was cleared.
    #[error("Clip playback stopped")]
    Stopped,

    /// The output device went away mid-playback.
    #[error("Audio route changed")]
    RouteChanged,
}
