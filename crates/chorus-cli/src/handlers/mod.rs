//! Command handlers.
//!
//! Handlers follow one pattern:
//! - Signature: `pub async fn execute(ctx: &CliContext, ...) -> Result<(), CliError>`
//! - Thin wrappers that validate CLI input, call the session and format
//!   output for the terminal.

pub mod adjust;
pub mod calibrate;
pub mod speak;
