//! Inline voices: `id[:rate[:pitch[:volume]]]`.

use std::str::FromStr;

use chorus_core::{
    PITCH_RANGE, RATE_RANGE, VOLUME_RANGE, VoiceProfile, clamp_f32, clamp_f64,
};

/// A voice given on the command line.
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceArg(pub VoiceProfile);

impl VoiceArg {
    pub fn into_profile(self) -> VoiceProfile {
        self.0
    }
}

impl FromStr for VoiceArg {
    type Err = String;

    /// Omitted fields take the new-voice defaults; values are clamped to
    /// their ranges.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(':');
        let id = parts.next().unwrap_or_default().trim();
        if id.is_empty() {
            return Err(format!("voice '{s}' has no id"));
        }
        let mut profile = VoiceProfile::with_defaults(id);

        if let Some(rate) = parts.next() {
            profile.rate = clamp_f64(parse_number(rate, "rate")?, &RATE_RANGE);
        }
        if let Some(pitch) = parts.next() {
            profile.pitch = clamp_f32(parse_number(pitch, "pitch")?, &PITCH_RANGE);
        }
        if let Some(volume) = parts.next() {
            profile.volume = clamp_f32(parse_number(volume, "volume")?, &VOLUME_RANGE);
        }
        if parts.next().is_some() {
            return Err(format!("voice '{s}' has too many fields"));
        }
        Ok(Self(profile))
    }
}

fn parse_number<T: FromStr>(raw: &str, field: &str) -> Result<T, String> {
    raw.trim()
        .parse()
        .map_err(|_| format!("invalid {field} '{raw}'"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_only_uses_defaults() {
        let arg: VoiceArg = "v.alex".parse().unwrap();
        assert_eq!(arg.into_profile(), VoiceProfile::with_defaults("v.alex"));
    }

    #[test]
    fn all_fields() {
        let arg: VoiceArg = "v.alex:0.3:1.2:0.5".parse().unwrap();
        assert_eq!(arg.0, VoiceProfile::new("v.alex", 0.3, 1.2, 0.5));
    }

    #[test]
    fn values_are_clamped() {
        let arg: VoiceArg = "v.alex:4:9".parse().unwrap();
        assert!((arg.0.rate - 1.0).abs() < f64::EPSILON);
        assert!((arg.0.pitch - 2.0).abs() < f32::EPSILON);
    }

    #[test]
    fn malformed_voices_are_rejected() {
        assert!("".parse::<VoiceArg>().is_err());
        assert!(":0.5".parse::<VoiceArg>().is_err());
        assert!("v:fast".parse::<VoiceArg>().is_err());
        assert!("v:0.5:1:1:extra".parse::<VoiceArg>().is_err());
    }
}
