//! Graphyte CLI.
//!
//! Provides commands for:
//! - `build`: Build every module of a model directory
//! - `module`: Build a single module page

mod commands;
mod error;
mod logging;
mod output;

use clap::{Parser, Subcommand};

use commands::{BuildArgs, ModuleArgs};
use output::Output;

/// Graphyte - interactive documentation from network model diagrams.
#[derive(Parser)]
#[command(name = "graphyte", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build all modules of a model directory.
    Build(BuildArgs),
    /// Build a single module page.
    Module(ModuleArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    let result = match cli.command {
        Commands::Build(args) => args.execute(),
        Commands::Module(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&err.report());
        std::process::exit(1);
    }
}
