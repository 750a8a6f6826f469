//! CLI-specific error types and mappings.
//!
//! Library errors are folded into a handful of categories, each with a
//! sysexits-style exit code.

use chorus_core::{ProfilesFileError, SettingsError};
use chorus_voice::VoiceError;
use thiserror::Error;

/// CLI-specific error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Argument parsing or validation error.
    #[error("Invalid arguments: {0}")]
    Arguments(String),

    /// IO error (profiles file missing, unreadable, etc.).
    #[error("IO error: {0}")]
    Io(String),

    /// Profiles file or settings are malformed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Speech or playback failed.
    #[error("Voice error: {0}")]
    Voice(String),
}

impl CliError {
    /// Map error to appropriate exit code.
    ///
    /// - 2: invalid arguments (EX_USAGE)
    /// - 74: IO error (EX_IOERR)
    /// - 78: configuration error (EX_CONFIG)
    /// - 69: voice backend unavailable or failing (EX_UNAVAILABLE)
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Arguments(_) => 2,
            Self::Io(_) => 74,
            Self::Config(_) => 78,
            Self::Voice(_) => 69,
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<ProfilesFileError> for CliError {
    fn from(err: ProfilesFileError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<SettingsError> for CliError {
    fn from(err: SettingsError) -> Self {
        Self::Arguments(err.to_string())
    }
}

impl From<VoiceError> for CliError {
    fn from(err: VoiceError) -> Self {
        match err {
            VoiceError::Settings(e) => e.into(),
            VoiceError::NoSuchVoice(index) => {
                Self::Arguments(format!("no voice at index {index}"))
            }
            other => Self::Voice(other.to_string()),
        }
    }
}
