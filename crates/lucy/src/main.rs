//! Lucy CLI - is my image still built on the current base image?
//!
//! This is the main entry point for the lucy command-line interface.

mod cli;
mod commands;
mod output;
mod version;

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Initialize rustls crypto provider (required for rustls 0.23+)
    // This must be done before any TLS operations
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Check(args) => commands::check::run(args, cli.config.as_deref(), cli.quiet).await,
        Commands::Parse(args) => commands::parse::run(args).map(|()| ExitCode::SUCCESS),
        Commands::Version(args) => commands::version::run(args).map(|()| ExitCode::SUCCESS),
    }
}

/// Initialize tracing with appropriate verbosity
fn init_tracing(verbose: u8, quiet: bool) {
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(log_filter(verbose, quiet))
        .init();
}

/// Stdout carries the verdict, so logging stays at warn unless asked for
fn log_filter(verbose: u8, quiet: bool) -> EnvFilter {
    if quiet {
        return EnvFilter::new("error");
    }

    match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    }
}
