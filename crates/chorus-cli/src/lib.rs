//! Command-line front end for chorus: speak with several voices at once,
//! preview the global sliders, and calibrate a voice's tempo.
//!
//! `main.rs` parses arguments, composes a [`CliContext`] through
//! [`bootstrap`] and dispatches to [`handlers`].

#![deny(unused_crate_dependencies)]

#[cfg(test)]
use tempfile as _;
#[cfg(test)]
use tokio_test as _;

// Used by main.rs only
use anyhow as _;
use dotenvy as _;
use tracing_subscriber as _;

pub mod bootstrap;
pub mod commands;
pub mod error;
pub mod handlers;
pub mod parser;
pub mod presentation;
pub mod voice_arg;

// Re-export primary types for convenient access
pub use bootstrap::{CliConfig, CliContext, bootstrap};
pub use commands::Commands;
pub use error::CliError;
pub use parser::Cli;
pub use voice_arg::VoiceArg;
