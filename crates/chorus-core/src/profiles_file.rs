//! Persisted voice profile document.
//!
//! The core never reads or writes files itself; this is the JSON shape the
//! persistence collaborator stores, so it must round-trip losslessly
//! through the core's value types.
//!
//! ```json
//! {
//!   "defaultVoiceID": "v.alex",
//!   "tuning": { "rateScale": 1.0, "pitchOffset": 0.0 },
//!   "profilesByID": { "v.alex": { "id": "v.alex", "rate": 0.5, "pitch": 1.0, "volume": 0.9 } },
//!   "activeVoiceIDs": ["v.alex"],
//!   "hiddenVoiceIDs": []
//! }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{Tuning, VoiceProfile};

/// Errors decoding or encoding a profiles document.
#[derive(Debug, Error)]
pub enum ProfilesFileError {
    /// The document is not valid JSON or does not match the schema.
    #[error("Invalid profiles document: {0}")]
    Json(#[from] serde_json::Error),
}

/// The persisted profile store.
///
/// `tuning` is required; every other field decodes as empty when absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfilesFile {
    /// Voice used when nothing else is selected.
    #[serde(
        rename = "defaultVoiceID",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub default_voice_id: Option<String>,

    /// Global sliders.
    pub tuning: Tuning,

    /// Per-voice profiles keyed by voice id.
    #[serde(rename = "profilesByID", default)]
    pub profiles_by_id: BTreeMap<String, VoiceProfile>,

    /// Voices taking part in the chorus, in selection order.
    #[serde(rename = "activeVoiceIDs", default)]
    pub active_voice_ids: Vec<String>,

    /// Voices hidden from pickers.
    #[serde(rename = "hiddenVoiceIDs", default)]
    pub hidden_voice_ids: Vec<String>,
}

impl ProfilesFile {
    /// Decode a document.
    pub fn from_json(json: &str) -> Result<Self, ProfilesFileError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Encode as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, ProfilesFileError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// The stored profile for `id`, or a new one with default settings.
    ///
    /// A new profile is inserted so later edits have somewhere to land.
    pub fn profile_for(&mut self, id: &str) -> VoiceProfile {
        self.profiles_by_id
            .entry(id.to_string())
            .or_insert_with(|| VoiceProfile::with_defaults(id))
            .clone()
    }

    /// Store `profile` under its id.
    pub fn set_profile(&mut self, profile: VoiceProfile) {
        self.profiles_by_id.insert(profile.id.clone(), profile);
    }

    /// Whether `id` is in the active list.
    pub fn is_active(&self, id: &str) -> bool {
        self.active_voice_ids.iter().any(|v| v == id)
    }

    /// Add `id` to the active list, or remove it if already present.
    /// Returns the new state.
    pub fn toggle_active(&mut self, id: &str) -> bool {
        if self.is_active(id) {
            self.active_voice_ids.retain(|v| v != id);
            false
        } else {
            self.active_voice_ids.push(id.to_string());
            true
        }
    }

    /// Whether `id` is hidden.
    pub fn is_hidden(&self, id: &str) -> bool {
        self.hidden_voice_ids.iter().any(|v| v == id)
    }

    /// Hide or unhide `id`.
    pub fn set_hidden(&mut self, id: &str, hidden: bool) {
        let present = self.is_hidden(id);
        if hidden && !present {
            self.hidden_voice_ids.push(id.to_string());
        } else if !hidden && present {
            self.hidden_voice_ids.retain(|v| v != id);
        }
    }

    /// Profiles for the active voices, in active-list order.
    ///
    /// Active ids with no stored profile get default settings.
    pub fn active_profiles(&self) -> Vec<VoiceProfile> {
        self.active_voice_ids
            .iter()
            .map(|id| {
                self.profiles_by_id
                    .get(id)
                    .cloned()
                    .unwrap_or_else(|| VoiceProfile::with_defaults(id))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_lists_decode_as_empty() {
        let file = ProfilesFile::from_json(r#"{"tuning":{"rateScale":1.5,"pitchOffset":0.1}}"#)
            .unwrap();
        assert!(file.default_voice_id.is_none());
        assert!(file.profiles_by_id.is_empty());
        assert!(file.active_voice_ids.is_empty());
        assert!(file.hidden_voice_ids.is_empty());
        assert!((file.tuning.rate_scale - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn tuning_is_required() {
        let err = ProfilesFile::from_json(r#"{"activeVoiceIDs":[]}"#).unwrap_err();
        assert!(err.to_string().contains("tuning"));
    }

    #[test]
    fn uses_persisted_key_names() {
        let mut file = ProfilesFile {
            default_voice_id: Some("v.a".into()),
            ..Default::default()
        };
        file.toggle_active("v.a");
        let value: serde_json::Value = serde_json::from_str(&file.to_json().unwrap()).unwrap();
        assert_eq!(value["defaultVoiceID"], "v.a");
        assert_eq!(value["activeVoiceIDs"][0], "v.a");
        assert!(value.get("profilesByID").is_some());
        assert!(value.get("hiddenVoiceIDs").is_some());
    }

    #[test]
    fn profile_for_inserts_defaults_once() {
        let mut file = ProfilesFile::default();
        let first = file.profile_for("v.new");
        assert_eq!(first, VoiceProfile::with_defaults("v.new"));

        file.set_profile(first.with_rate(0.3));
        assert!((file.profile_for("v.new").rate - 0.3).abs() < f64::EPSILON);
        assert_eq!(file.profiles_by_id.len(), 1);
    }

    #[test]
    fn toggle_and_hide() {
        let mut file = ProfilesFile::default();
        assert!(file.toggle_active("v.a"));
        assert!(file.toggle_active("v.b"));
        assert!(!file.toggle_active("v.a"));
        assert_eq!(file.active_voice_ids, vec!["v.b".to_string()]);

        file.set_hidden("v.c", true);
        file.set_hidden("v.c", true);
        assert_eq!(file.hidden_voice_ids.len(), 1);
        file.set_hidden("v.c", false);
        assert!(!file.is_hidden("v.c"));
    }

    #[test]
    fn active_profiles_follow_selection_order() {
        let mut file = ProfilesFile::default();
        file.set_profile(VoiceProfile::new("v.a", 0.2, 1.0, 1.0));
        file.toggle_active("v.z");
        file.toggle_active("v.a");

        let ids: Vec<_> = file.active_profiles().into_iter().map(|p| p.id).collect();
        assert_eq!(ids, vec!["v.z", "v.a"]);
    }
}
