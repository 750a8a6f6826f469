//! Speak command handler.
//!
//! Speaks one phrase with every selected voice at once and prints how
//! each voice finished.

use chorus_core::resolve_display_name;
use chorus_voice::{ChorusReport, VoiceOutcome};

use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::handlers::adjust::apply_overrides;
use crate::presentation::{print_separator, truncate_string};

/// Execute the speak command.
///
/// # Errors
///
/// Returns an error if the text is blank, the sliders are not finite, or
/// every voice failed.
pub async fn execute(
    ctx: &CliContext,
    text: &str,
    rate_scale: Option<f64>,
    pitch_offset: Option<f64>,
) -> Result<(), CliError> {
    if text.trim().is_empty() {
        return Err(CliError::Arguments("nothing to speak".to_string()));
    }
    let effective = apply_overrides(ctx, rate_scale, pitch_offset)?;
    println!("Speaking with {} voice(s)...", effective.len());

    let report = ctx.session.start_chorus(text).await;
    print_report(ctx, &report);

    if report.cancelled {
        println!("Chorus stopped.");
        return Ok(());
    }
    if !report.voices.is_empty() && report.failures().count() == report.voices.len() {
        return Err(CliError::Voice("every voice failed".to_string()));
    }
    Ok(())
}

fn print_report(ctx: &CliContext, report: &ChorusReport) {
    println!("{:<3} {:<12} {:<22} Outcome", "#", "Name", "Voice ID");
    print_separator(60);
    for voice in &report.voices {
        let outcome = match &voice.outcome {
            VoiceOutcome::Spoke { seconds } => format!("spoke {seconds:.2}s"),
            VoiceOutcome::Failed(e) => format!("failed: {e}"),
            VoiceOutcome::Cancelled => "stopped".to_string(),
        };
        println!(
            "{:<3} {:<12} {:<22} {}",
            voice.index,
            truncate_string(&resolve_display_name(&ctx.voices, &voice.voice_id), 12),
            truncate_string(&voice.voice_id, 22),
            outcome
        );
    }
    println!("\nFinished in {:.2}s", report.elapsed.as_secs_f64());
}
