//! Main commands enum.

use clap::Subcommand;

/// Available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Speak a phrase with every selected voice at once
    Speak {
        /// Text to speak
        text: String,

        /// Global rate slider (1.0 = neutral); overrides the profiles file
        #[arg(long)]
        rate_scale: Option<f64>,

        /// Global pitch slider (0.0 = neutral); overrides the profiles file
        #[arg(long, allow_hyphen_values = true)]
        pitch_offset: Option<f64>,
    },

    /// Fit one voice's rate so the phrase takes the target duration
    Calibrate {
        /// Row of the selected voice to calibrate (0-based)
        #[arg(long, default_value_t = 0)]
        index: usize,

        /// Sample phrase to measure
        phrase: String,

        /// Target duration in seconds
        #[arg(long, default_value_t = 5.0)]
        target: f64,

        /// Allowed absolute error in seconds
        #[arg(long)]
        tolerance: Option<f64>,

        /// Maximum measurement passes
        #[arg(long)]
        max_iterations: Option<u32>,

        /// Lowest rate calibration may choose
        #[arg(long)]
        min_rate: Option<f64>,

        /// Highest rate calibration may choose
        #[arg(long)]
        max_rate: Option<f64>,
    },

    /// Show the effective profiles for a pair of global sliders
    Adjust {
        /// Global rate slider (1.0 = neutral)
        #[arg(long)]
        rate_scale: Option<f64>,

        /// Global pitch slider (0.0 = neutral)
        #[arg(long, allow_hyphen_values = true)]
        pitch_offset: Option<f64>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
}
