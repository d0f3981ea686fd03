mod cli;
mod config;
mod logging;

use std::io::{self, Write};
use std::path::Path;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};

use fwpipe_core::{
    execute_cli, parse_cli, ExecutionError, Firmware, ParseError, VisitorRegistry,
};
use fwpipe_visitors::builtin_registry;

use cli::Cli;
use config::Settings;

const EXIT_FAILURE: i32 = 1;
// clap already uses 2 for usage errors
const EXIT_REGISTRY_CONFLICT: i32 = 3;

fn main() {
    let cli = Cli::parse();
    let settings = Settings::from_env();
    if let Err(e) = logging::init_logging(&settings) {
        eprintln!("fwpipe: {}", e);
    }

    // A conflict means two extension units claim the same command; nothing
    // may be parsed against a registry in that state.
    let registry = match builtin_registry() {
        Ok(registry) => registry,
        Err(e) => {
            error!("visitor registration failed: {}", e);
            eprintln!("fwpipe: {}", e);
            process::exit(EXIT_REGISTRY_CONFLICT);
        }
    };

    if cli.list {
        if let Err(e) = print_visitors(&registry, &mut std::io::stdout()) {
            error!("failed to print visitor list: {}", e);
            process::exit(EXIT_FAILURE);
        }
        return;
    }

    if let Err(err) = run(&cli, &registry) {
        report_failure(&err, &registry);
        process::exit(EXIT_FAILURE);
    }
}

fn report_failure(err: &anyhow::Error, registry: &VisitorRegistry) {
    if let Some(failed) = err.downcast_ref::<ExecutionError>() {
        let cause = failed.visitor_error();
        error!(
            severity = cause.severity().as_str(),
            recoverable = cause.is_recoverable(),
            "pipeline stopped at stage {}; earlier stages were applied",
            failed.stage()
        );
    }
    eprintln!("fwpipe: {:#}", err);

    if let Some(ParseError::UnknownVisitor { .. }) = err.downcast_ref::<ParseError>() {
        eprintln!();
        if let Err(e) = print_visitors(registry, &mut std::io::stderr()) {
            error!("failed to print visitor list: {}", e);
        }
    }
}

fn run(cli: &Cli, registry: &VisitorRegistry) -> Result<()> {
    let image: &Path = cli
        .image
        .as_deref()
        .context("no firmware image given")?;

    // Parse before touching the image so a bad command line costs nothing.
    let mut pipeline = parse_cli(registry, &cli.commands).context("invalid pipeline")?;

    let mut firmware = Firmware::load(image)
        .with_context(|| format!("failed to load {}", image.display()))?;

    let report = execute_cli(&mut firmware, &mut pipeline)?;
    info!(
        "{} stages applied to {} in {}ms",
        report.stages.len(),
        image.display(),
        report.total().as_millis()
    );
    Ok(())
}

/// Write the visitor listing. A closed pipe (`fwpipe --list | head`) is not
/// an error.
fn print_visitors(registry: &VisitorRegistry, out: &mut dyn Write) -> io::Result<()> {
    match write_visitors(registry, out) {
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        other => other,
    }
}

fn write_visitors(registry: &VisitorRegistry, out: &mut dyn Write) -> io::Result<()> {
    writeln!(out, "available visitors:")?;
    for info in registry.list() {
        writeln!(
            out,
            "  {:<10} {} arg{}  {}",
            info.name,
            info.arity,
            if info.arity == 1 { " " } else { "s" },
            info.summary
        )?;
    }
    out.flush()
}
