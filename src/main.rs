mod cli;
mod commands;
mod error;
mod extract;
mod model;
mod package;
mod pdf;
mod selection;
mod session;
mod source;
mod toc;
mod util;

use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};

fn main() {
    init_tracing();

    if let Err(err) = run() {
        error!(error = %err, "command failed");
        for cause in err.chain().skip(1) {
            error!(cause = %cause, "caused by");
        }
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let timeout = Duration::from_secs(cli.http_timeout_secs);

    match cli.command {
        Commands::Toc(args) => commands::toc::run(args, timeout),
        Commands::Split(args) => commands::split::run(args, timeout),
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
