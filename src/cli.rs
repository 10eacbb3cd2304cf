//! Command-line front end: argument parsing and the config-driven build.

use anyhow::{Context, Result};
use clap::Parser;
use shaker_common::Diagnostic;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::bundle::build;
use crate::config::{load_config, parse_format};

#[derive(Parser, Debug, Default)]
#[command(
    name = "shaker",
    version,
    about = "Tree-shake and bundle ES modules from acorn syntax trees"
)]
pub struct CliArgs {
    // ==========================================================================
    // Input
    // ==========================================================================
    /// Path to the JSON build config.
    #[arg(short = 'c', long)]
    pub config: PathBuf,

    /// Entry module id; overrides the config's entries. Repeatable.
    #[arg(short = 'i', long = "entry")]
    pub entries: Vec<String>,

    // ==========================================================================
    // Output
    // ==========================================================================
    /// Output format: es, cjs, amd or system.
    #[arg(short = 'f', long)]
    pub format: Option<String>,

    /// Directory to write chunks to; a single chunk goes to stdout without one.
    #[arg(short = 'd', long = "out-dir", alias = "outDir")]
    pub out_dir: Option<PathBuf>,

    /// Keep every statement.
    #[arg(long = "no-treeshake", alias = "noTreeshake")]
    pub no_treeshake: bool,

    // ==========================================================================
    // Diagnostics
    // ==========================================================================
    /// Print diagnostics as JSON.
    #[arg(long)]
    pub json: bool,

    /// Disable colored diagnostics.
    #[arg(long = "no-color", alias = "noColor")]
    pub no_color: bool,
}

/// What a successful run produced.
#[derive(Debug, Default)]
pub struct RunReport {
    /// Files written under the output directory.
    pub written: Vec<PathBuf>,
    /// Code of the single chunk, when no output directory was given.
    pub stdout: Option<String>,
    pub warnings: Vec<Diagnostic>,
}

/// Load the config, apply command-line overrides, build and write the
/// chunks. Relative paths in the config resolve against its directory;
/// `--out-dir` resolves against `cwd`.
pub fn run(args: &CliArgs, cwd: &Path) -> Result<RunReport> {
    let config_path = cwd.join(&args.config);
    let config = load_config(&config_path)?;
    let base_dir = config_path.parent().map_or_else(|| cwd.to_path_buf(), Path::to_path_buf);

    let mut options = config.build_options()?;
    if let Some(format) = &args.format {
        options.format = parse_format(format)?;
    }
    if !args.entries.is_empty() {
        options.entries = args.entries.clone();
    }
    if args.no_treeshake {
        options.treeshake = None;
    }
    let out_dir = match (&args.out_dir, &config.out_dir) {
        (Some(dir), _) => Some(cwd.join(dir)),
        (None, Some(dir)) => Some(base_dir.join(dir)),
        (None, None) => None,
    };

    let inputs = config.load_inputs(&base_dir)?;
    debug!(modules = inputs.len(), format = options.format.as_str(), "building");
    let output = build(inputs, options)?;

    let mut report = RunReport {
        warnings: output.warnings,
        ..RunReport::default()
    };
    match out_dir {
        Some(dir) => {
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("failed to create output directory: {}", dir.display()))?;
            for chunk in &output.chunks {
                let path = dir.join(&chunk.file_name);
                std::fs::write(&path, &chunk.code)
                    .with_context(|| format!("failed to write chunk: {}", path.display()))?;
                report.written.push(path);
            }
        }
        None => {
            let [chunk] = output.chunks.as_slice() else {
                anyhow::bail!(
                    "the build produced {} chunks; pass --out-dir to write them",
                    output.chunks.len()
                );
            };
            report.stdout = Some(chunk.code.clone());
        }
    }
    Ok(report)
}

#[cfg(test)]
#[path = "../tests/cli_args.rs"]
mod tests;
