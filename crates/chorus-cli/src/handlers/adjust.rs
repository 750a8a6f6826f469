//! Adjust command handler.
//!
//! Shows what the global sliders do to the selected voices without
//! speaking.

use chorus_core::{Tuning, VoiceProfile};

use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::presentation::print_profiles;

/// Replace whichever sliders were given, keeping the others.
pub fn tuning_with_overrides(
    current: Tuning,
    rate_scale: Option<f64>,
    pitch_offset: Option<f64>,
) -> Result<Tuning, CliError> {
    let tuning = Tuning::new(
        rate_scale.unwrap_or(current.rate_scale),
        pitch_offset.unwrap_or(current.pitch_offset),
    );
    if !tuning.rate_scale.is_finite() || !tuning.pitch_offset.is_finite() {
        return Err(CliError::Arguments("sliders must be finite".to_string()));
    }
    if !tuning.is_within_slider_ranges() {
        tracing::warn!(
            rate_scale = tuning.rate_scale,
            pitch_offset = tuning.pitch_offset,
            "Sliders outside their usual travel; results are clamped"
        );
    }
    Ok(tuning)
}

/// Apply slider overrides to the session and return the effective set.
pub fn apply_overrides(
    ctx: &CliContext,
    rate_scale: Option<f64>,
    pitch_offset: Option<f64>,
) -> Result<Vec<VoiceProfile>, CliError> {
    let current = ctx.session.selection().tuning();
    let tuning = tuning_with_overrides(current, rate_scale, pitch_offset)?;
    Ok(ctx.session.edit_selection(|selection| {
        selection.set_tuning(tuning);
        selection.effective().to_vec()
    }))
}

/// Execute the adjust command.
pub fn execute(
    ctx: &CliContext,
    rate_scale: Option<f64>,
    pitch_offset: Option<f64>,
    json: bool,
) -> Result<(), CliError> {
    let effective = apply_overrides(ctx, rate_scale, pitch_offset)?;

    if json {
        let out = serde_json::to_string_pretty(&effective)
            .map_err(|e| CliError::Config(e.to_string()))?;
        println!("{out}");
        return Ok(());
    }

    let tuning = ctx.session.selection().tuning();
    println!(
        "Rate scale {:.2}, pitch offset {:+.2}\n",
        tuning.rate_scale, tuning.pitch_offset
    );
    print_profiles(&effective, &ctx.voices);
    Ok(())
}
