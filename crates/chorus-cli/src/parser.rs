//! Main CLI parser and top-level argument handling.

use std::path::PathBuf;

use clap::Parser;

use crate::commands::Commands;
use crate::voice_arg::VoiceArg;

/// Drive several speech voices at once and tune their tempo.
#[derive(Parser)]
#[command(name = "chorus")]
#[command(about = "Speak a phrase with a chorus of voices and calibrate their tempo")]
#[command(version)]
pub struct Cli {
    /// Profiles document (JSON) providing the active voices and tuning
    #[arg(long, global = true, env = "CHORUS_PROFILES")]
    pub profiles: Option<PathBuf>,

    /// Add a voice as id[:rate[:pitch[:volume]]]; repeatable
    #[arg(long = "voice", global = true)]
    pub voices: Vec<VoiceArg>,

    /// Wall seconds per simulated speech second (0 = do not sleep)
    #[arg(
        long,
        global = true,
        env = "CHORUS_TIME_SCALE",
        default_value_t = 1.0,
        value_parser = parse_time_scale
    )]
    pub time_scale: f64,

    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Largest accepted `--time-scale`. A day of wall time per modelled second.
pub const MAX_TIME_SCALE: f64 = 86_400.0;

fn parse_time_scale(raw: &str) -> Result<f64, String> {
    let scale: f64 = raw
        .trim()
        .parse()
        .map_err(|_| format!("'{raw}' is not a number"))?;
    if scale.is_finite() && (0.0..=MAX_TIME_SCALE).contains(&scale) {
        Ok(scale)
    } else {
        Err(format!("time scale must be within 0..={MAX_TIME_SCALE}"))
    }
}
