mod cli;
mod codec;

use std::fs;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use cli::{normalize_args, Cli};

const LOG_ENV: &str = "FWPIPE_LOG";

fn main() {
    init_logging();
    let cli = Cli::parse_from(normalize_args(std::env::args_os()));

    if let Err(err) = run(&cli) {
        eprintln!("glzma: {:#}", err);
        process::exit(1);
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    if let Err(e) = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
    {
        eprintln!("glzma: failed to initialise logging: {}", e);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let mode = cli.mode();
    let input = fs::read(&cli.input)
        .with_context(|| format!("failed to read {}", cli.input.display()))?;

    let output = codec::run(mode, &input, cli.x86)
        .with_context(|| format!("failed to {} {}", mode.as_str(), cli.input.display()))?;

    fs::write(&cli.output, &output)
        .with_context(|| format!("failed to write {}", cli.output.display()))?;

    info!(
        "{}d {} ({} bytes) into {} ({} bytes)",
        mode.as_str(),
        cli.input.display(),
        input.len(),
        cli.output.display(),
        output.len()
    );
    Ok(())
}
