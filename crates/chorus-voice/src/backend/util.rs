//! Shared utilities for voice backend implementations.

/// Forces headless detection on (`1`/`true`) or off (`0`/`false`).
pub const FORCE_CI_ENV: &str = "CHORUS_FORCE_CI";

/// Conventional variable set by CI providers.
pub const CI_ENV: &str = "CI";

/// Whether the process looks like it runs without an audio device.
pub fn is_ci() -> bool {
    is_ci_with(|key| std::env::var(key).ok())
}

/// [`is_ci`] against an arbitrary variable lookup.
///
/// `CHORUS_FORCE_CI` wins when it holds a recognised value; otherwise any
/// truthy `CI` counts.
pub fn is_ci_with(lookup: impl Fn(&str) -> Option<String>) -> bool {
    if let Some(forced) = lookup(FORCE_CI_ENV).as_deref().and_then(parse_flag) {
        return forced;
    }
    lookup(CI_ENV)
        .as_deref()
        .and_then(parse_flag)
        .unwrap_or(false)
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" => Some(false),
        _ => None,
    }
}
