//! `gen-coadd-registry`: build a registry of coadd pieces.

use anyhow::{Context, Result};
use clap::Parser;
use coadd_registry::{build_registry, BuildConfig, DEFAULT_OUTPUT_REGISTRY};
use coadd_registry_logging::{init_logging, LogConfig};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(
    name = "gen-coadd-registry",
    about = "Build a registry of SDSS coadd pieces",
    after_help = "DIR should contain a directory per filter containing coadd pieces."
)]
struct Cli {
    /// Input registry; its pieces are carried over and not added again
    #[arg(short = 'i', long = "input-registry", value_name = "REGISTRY")]
    input_registry: Option<PathBuf>,

    /// Output registry (must not exist)
    #[arg(
        short = 'o',
        long = "output-registry",
        value_name = "REGISTRY",
        default_value = DEFAULT_OUTPUT_REGISTRY
    )]
    output_registry: PathBuf,

    /// Enable debug diagnostics on stderr
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Also append diagnostics to this file
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Directories holding one subdirectory per filter
    #[arg(value_name = "DIR", required = true)]
    dirs: Vec<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let _log_guard = match init_logging(LogConfig {
        verbose: cli.verbose,
        log_file: cli.log_file.as_deref(),
    }) {
        Ok(guard) => guard,
        Err(err) => {
            eprintln!("Warning: {:#}", err);
            None
        }
    };

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{:#}", err);
            ExitCode::from(1)
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = BuildConfig::new(cli.dirs).with_output_registry(cli.output_registry);
    if let Some(input) = cli.input_registry {
        config = config.with_input_registry(input);
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    runtime.block_on(build_registry(&config))?;
    Ok(())
}
