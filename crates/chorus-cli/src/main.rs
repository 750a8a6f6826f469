//! CLI entry point.
//!
//! Parses arguments, composes the context through bootstrap and routes the
//! command to its handler. Ctrl-C stops any chorus or calibration in
//! flight instead of killing the process mid-utterance.

use std::process::ExitCode;
use std::sync::Arc;

use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use chorus_cli::handlers::calibrate::CalibrateArgs;
use chorus_cli::{Cli, CliConfig, CliError, Commands, bootstrap, handlers};

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let Some(command) = cli.command.as_ref() else {
        Cli::command().print_help()?;
        return Ok(());
    };

    let mut config = CliConfig::from_cli(&cli);
    let calibration = match command {
        Commands::Calibrate {
            index,
            phrase,
            target,
            tolerance,
            max_iterations,
            min_rate,
            max_rate,
        } => {
            let args = CalibrateArgs {
                index: *index,
                phrase: phrase.clone(),
                target: *target,
                tolerance: *tolerance,
                max_iterations: *max_iterations,
                min_rate: *min_rate,
                max_rate: *max_rate,
            };
            let progress = handlers::calibrate::prepare(&mut config, &args);
            Some((args, progress))
        }
        _ => None,
    };

    let ctx = bootstrap(config)?;

    let session = Arc::clone(&ctx.session);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupt received; stopping");
            session.stop_all();
        }
    });

    match command {
        Commands::Speak {
            text,
            rate_scale,
            pitch_offset,
        } => handlers::speak::execute(&ctx, text, *rate_scale, *pitch_offset).await?,
        Commands::Adjust {
            rate_scale,
            pitch_offset,
            json,
        } => handlers::adjust::execute(&ctx, *rate_scale, *pitch_offset, *json)?,
        Commands::Calibrate { .. } => {
            if let Some((args, progress)) = calibration {
                handlers::calibrate::execute(&ctx, &args, progress).await?;
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load environment variables before clap reads its env fallbacks
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            let code = e.downcast_ref::<CliError>().map_or(1, CliError::exit_code);
            ExitCode::from(u8::try_from(code).unwrap_or(1))
        }
    }
}
