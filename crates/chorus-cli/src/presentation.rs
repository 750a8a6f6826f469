//! Shared CLI presentation utilities.
//!
//! Keep this module format-only: no domain transforms.

use chorus_core::{VoiceNameResolver, VoiceProfile, resolve_display_name};

/// Truncates a string to a maximum number of characters, adding "..." if
/// needed.
///
/// # Examples
///
/// ```rust
/// use chorus_cli::presentation::truncate_string;
///
/// assert_eq!(truncate_string("Hello", 10), "Hello");
/// assert_eq!(truncate_string("Hello World", 8), "Hello...");
/// ```
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}

/// Print a horizontal separator line.
pub fn print_separator(width: usize) {
    println!("{}", "-".repeat(width));
}

/// Header for [`profile_row`].
pub fn profile_header() -> String {
    format!(
        "{:<3} {:<12} {:<22} {:>6} {:>6} {:>6}",
        "#", "Name", "Voice ID", "Rate", "Pitch", "Vol"
    )
}

/// One table row for a profile.
pub fn profile_row(
    index: usize,
    profile: &VoiceProfile,
    names: &dyn VoiceNameResolver,
) -> String {
    format!(
        "{:<3} {:<12} {:<22} {:>6.3} {:>6.2} {:>6.2}",
        index,
        truncate_string(&resolve_display_name(names, &profile.id), 12),
        truncate_string(&profile.id, 22),
        profile.rate,
        profile.pitch,
        profile.volume
    )
}

/// Print a table of profiles.
pub fn print_profiles(profiles: &[VoiceProfile], names: &dyn VoiceNameResolver) {
    println!("{}", profile_header());
    print_separator(60);
    for (index, profile) in profiles.iter().enumerate() {
        println!("{}", profile_row(index, profile, names));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chorus_core::{StaticVoiceList, VoiceInfo};

    #[test]
    fn test_truncate_string_no_truncation_needed() {
        assert_eq!(truncate_string("short", 10), "short");
    }

    #[test]
    fn test_truncate_string_multibyte() {
        assert_eq!(truncate_string("ééééééé", 5), "éé...");
    }

    #[test]
    fn test_profile_row_uses_display_name() {
        let names = StaticVoiceList::new(vec![VoiceInfo::new("v.a", "Alex", "en-US")]);
        let row = profile_row(0, &VoiceProfile::new("v.a", 0.5, 1.0, 0.9), &names);
        assert!(row.contains("Alex"));
        assert!(row.contains("0.500"));

        let row = profile_row(1, &VoiceProfile::new("v.unknown", 0.5, 1.0, 0.9), &names);
        assert!(row.contains("Voice"));
    }
}
