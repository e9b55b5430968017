//! Ballast CLI - builds modern and legacy JavaScript bundles

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("ballast=debug")
    } else {
        EnvFilter::new("ballast=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();

    match &cli.command {
        Commands::Build(args) => commands::build::execute(&cli, args.clone()),
        Commands::Targets(args) => commands::targets::execute(&cli, args.clone()),
        Commands::Completions(args) => commands::completions::execute(args.clone()),
    }
}
