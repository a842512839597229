//! lms-build CLI - configure-time orchestration for the Library Management System

use std::io::IsTerminal;

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
        EnvFilter::new("lms_build=debug")
    } else {
        EnvFilter::new("lms_build=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let color = !cli.no_color && std::io::stderr().is_terminal();

    match cli.command {
        Commands::Init(args) => commands::init::execute(args),
        Commands::Configure(args) => commands::configure::execute(args, color),
        Commands::Graph(args) => commands::graph::execute(args, color),
        Commands::Flags(args) => commands::flags::execute(args),
        Commands::Install(args) => commands::install::execute(args),
        Commands::Package(args) => commands::package::execute(args),
        Commands::Locate(args) => commands::locate::execute(args),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
