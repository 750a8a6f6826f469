//! Calibrate command handler.
//!
//! Fits one voice's rate so a sample phrase lasts the target duration,
//! printing each measurement as it lands. The tuned profile is printed as
//! JSON so it can be pasted into a profiles document.

use std::sync::Arc;

use chorus_core::{
    CalibrationProgress, CalibrationSettings, ChannelObserver, RateBounds, resolve_display_name,
};
use chorus_voice::CalibrationStop;
use tokio::sync::mpsc;

use crate::bootstrap::{CliConfig, CliContext};
use crate::error::CliError;

/// Arguments for the calibrate command.
#[derive(Debug, Clone)]
pub struct CalibrateArgs {
    pub index: usize,
    pub phrase: String,
    pub target: f64,
    pub tolerance: Option<f64>,
    pub max_iterations: Option<u32>,
    pub min_rate: Option<f64>,
    pub max_rate: Option<f64>,
}

impl CalibrateArgs {
    /// Defaults with any given overrides applied.
    pub fn settings(&self) -> CalibrationSettings {
        let defaults = CalibrationSettings::default();
        CalibrationSettings {
            tolerance: self.tolerance.unwrap_or(defaults.tolerance),
            max_iterations: self.max_iterations.unwrap_or(defaults.max_iterations),
            rate_bounds: RateBounds {
                min: self.min_rate.unwrap_or(defaults.rate_bounds.min),
                max: self.max_rate.unwrap_or(defaults.rate_bounds.max),
            },
        }
    }
}

/// Configure bootstrap for calibration and return the progress receiver.
pub fn prepare(config: &mut CliConfig, args: &CalibrateArgs) -> mpsc::Receiver<CalibrationProgress> {
    config.calibration = args.settings();
    let (observer, rx) = ChannelObserver::channel(16);
    config.observer = Some(Arc::new(observer));
    rx
}

/// Execute the calibrate command.
///
/// # Errors
///
/// Returns an error for a bad index, target or settings, or if the engine
/// failed before a result was reached.
pub async fn execute(
    ctx: &CliContext,
    args: &CalibrateArgs,
    mut progress: mpsc::Receiver<CalibrationProgress>,
) -> Result<(), CliError> {
    let voice_id = ctx
        .session
        .selection()
        .baseline()
        .get(args.index)
        .map(|p| p.id.clone())
        .ok_or_else(|| CliError::Arguments(format!("no voice at index {}", args.index)))?;
    println!(
        "Calibrating {} ({voice_id}) to {:.2}s...",
        resolve_display_name(&ctx.voices, &voice_id),
        args.target
    );

    let calibration = ctx.session.calibrate(args.index, &args.phrase, args.target);
    tokio::pin!(calibration);
    let outcome = loop {
        tokio::select! {
            outcome = &mut calibration => break outcome,
            Some(update) = progress.recv() => print_progress(update),
        }
    };
    while let Ok(update) = progress.try_recv() {
        print_progress(update);
    }
    let result = outcome?;

    match &result.stop {
        CalibrationStop::Converged => println!("Converged."),
        CalibrationStop::ZeroMeasurement => {
            println!("The engine reported no duration; rate left unchanged.");
        }
        CalibrationStop::NegligibleChange => println!("Rate settled within the allowed range."),
        CalibrationStop::IterationsExhausted => println!("Stopped after the last allowed pass."),
        CalibrationStop::Cancelled => {
            println!("Calibration cancelled.");
            return Ok(());
        }
        CalibrationStop::Failed(e) => return Err(CliError::Voice(e.to_string())),
    }
    println!(
        "Final rate {:.3} after {} pass(es), last measured {:.2}s",
        result.final_rate, result.iterations, result.measured_seconds
    );

    if let Some(profile) = ctx.session.selection().baseline().get(args.index) {
        let json =
            serde_json::to_string_pretty(profile).map_err(|e| CliError::Config(e.to_string()))?;
        println!("{json}");
    }
    Ok(())
}

fn print_progress(update: CalibrationProgress) {
    println!(
        "  pass {:>2}: measured {:>6.2}s -> rate {:.3}",
        update.iteration + 1,
        update.measured_seconds,
        update.rate
    );
}
