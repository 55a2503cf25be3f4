use std::{process::ExitCode, thread, time::Duration};

use anyhow::{ensure, Context, Result};
use clap::Parser;
use rayon::ThreadPoolBuilder;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use token_forge::{source::expand_inputs, Cli, Settings, TokenProcessor};

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let code = match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    };
    linger(cli.linger_secs);
    code
}

fn run(cli: &Cli) -> Result<()> {
    let settings = Settings::load(cli).context("Failed to load settings")?;

    ThreadPoolBuilder::new()
        .num_threads(cli.num_threads.max(1))
        .build_global()?;

    let inputs = expand_inputs(&cli.inputs);
    ensure!(!inputs.is_empty(), "No images to process");

    let processor = TokenProcessor::new(settings);
    let results = processor
        .process_inputs(&inputs)
        .context("Unable to prepare output directory")?;

    let failed = results.iter().filter(|result| result.is_err()).count();
    info!(
        "Finished: {} processed, {} failed, tokens in {}",
        results.len() - failed,
        failed,
        processor.settings().output_dir.display()
    );
    Ok(())
}

fn linger(secs: u64) {
    if secs > 0 {
        info!("Exiting in {}s...", secs);
        thread::sleep(Duration::from_secs(secs));
    }
}
