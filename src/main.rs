//! Soldoc CLI entry point.

use clap::Parser;
use soldoc::cli::{self, Cli, Commands, EXIT_ERROR};

fn init_tracing(verbose: u8) -> anyhow::Result<()> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };

    // An explicit -v wins over RUST_LOG.
    let filter = if verbose > 0 {
        tracing_subscriber::EnvFilter::new(level)
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_tracing(cli.verbose) {
        eprintln!("Error: {}", e);
        std::process::exit(EXIT_ERROR);
    }

    let result = match &cli.command {
        Commands::Index(args) => cli::run_index(args),
        Commands::Signature(args) => cli::run_signature(args),
        Commands::Autodoc(args) => cli::run_autodoc(args),
    };

    let exit_code = match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            EXIT_ERROR
        }
    };

    std::process::exit(exit_code);
}
