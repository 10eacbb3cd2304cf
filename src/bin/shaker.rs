#![allow(clippy::print_stderr)]

use anyhow::{Context, Result};
use clap::Parser;
use shaker::cli::{CliArgs, run};
use shaker::reporter::Reporter;
use shaker::{BuildError, Diagnostic};
use std::io::{IsTerminal, Write};

const EXIT_BUILD_FAILED: i32 = 1;

fn report(args: &CliArgs, diagnostics: &[Diagnostic]) -> Result<()> {
    if diagnostics.is_empty() {
        return Ok(());
    }
    if args.json {
        let json = serde_json::to_string_pretty(diagnostics).context("failed to serialize diagnostics")?;
        eprintln!("{json}");
    } else {
        let color = !args.no_color && std::io::stderr().is_terminal();
        eprintln!("{}", Reporter::new(color).render(diagnostics));
    }
    Ok(())
}

fn main() -> Result<()> {
    // SHAKER_LOG / SHAKER_LOG_FORMAT, see src/tracing_config.rs.
    shaker::tracing_config::init_tracing();

    let args = CliArgs::parse_from(std::env::args_os());
    let cwd = std::env::current_dir().context("failed to resolve current directory")?;

    let outcome = match run(&args, &cwd) {
        Ok(outcome) => outcome,
        Err(err) => {
            if let Some(build_error) = err.downcast_ref::<BuildError>() {
                report(&args, std::slice::from_ref(build_error.diagnostic()))?;
                std::process::exit(EXIT_BUILD_FAILED);
            }
            return Err(err);
        }
    };

    report(&args, &outcome.warnings)?;
    for path in &outcome.written {
        eprintln!("created {}", path.display());
    }
    if let Some(code) = outcome.stdout {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(code.as_bytes()).context("failed to write to stdout")?;
    }
    Ok(())
}
