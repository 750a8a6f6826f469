//! Voice list port: maps voice ids to display names.
//!
//! Voice enumeration itself belongs to the platform; the core only needs a
//! best-effort lookup for labelling rows and log lines.

use serde::{Deserialize, Serialize};

/// Label used when a voice id cannot be resolved.
pub const FALLBACK_VOICE_NAME: &str = "Voice";

/// Information about an installed voice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceInfo {
    /// Voice identifier (used in profiles and engine calls).
    pub id: String,

    /// Human-readable display name.
    pub name: String,

    /// Language tag as reported by the platform (e.g. `"en-US"`).
    pub language: String,
}

impl VoiceInfo {
    /// Convenience constructor.
    pub fn new(id: impl Into<String>, name: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            language: language.into(),
        }
    }
}

/// Resolves a voice id to a display name.
#[cfg_attr(test, mockall::automock)]
pub trait VoiceNameResolver: Send + Sync {
    /// Display name for `id`, or `None` if the voice is unknown.
    fn display_name(&self, id: &str) -> Option<String>;
}

/// Resolve `id`, falling back to [`FALLBACK_VOICE_NAME`].
pub fn resolve_display_name(resolver: &dyn VoiceNameResolver, id: &str) -> String {
    resolver
        .display_name(id)
        .unwrap_or_else(|| FALLBACK_VOICE_NAME.to_string())
}

/// A fixed voice list, e.g. one captured from the platform at startup.
#[derive(Debug, Clone, Default)]
pub struct StaticVoiceList {
    voices: Vec<VoiceInfo>,
}

impl StaticVoiceList {
    /// Wrap a list of voices.
    pub const fn new(voices: Vec<VoiceInfo>) -> Self {
        Self { voices }
    }

    /// All voices in platform order.
    pub fn voices(&self) -> &[VoiceInfo] {
        &self.voices
    }
}

impl VoiceNameResolver for StaticVoiceList {
    fn display_name(&self, id: &str) -> Option<String> {
        self.voices
            .iter()
            .find(|v| v.id == id)
            .map(|v| v.name.clone())
    }
}
