use std::sync::Arc;

use anyhow::Result;
use clap::Parser;

use provision_cli::cli::Cli;
use provision_cli::commands;
use provision_cli::logging::{Logger, init_subscriber};

fn main() -> Result<()> {
    let _ = enable_ansi_support::enable_ansi_support();
    let cli = Cli::parse();
    init_subscriber(cli.verbose, "provision");
    let log = Arc::new(Logger::new("provision"));

    commands::provision::run(&cli, &log)
}
