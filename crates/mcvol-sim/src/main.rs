use std::error::Error;

use clap::{Parser, Subcommand};
use commands::{
    merge::{self, MergeArgs},
    run::{self, RunArgs},
};

mod commands;
mod logging;

#[derive(Parser, Debug)]
#[command(name = "mcvol-sim", about = "Stochastic domain volume estimation CLI")]
struct Cli {
    /// Emit log records as JSON lines instead of human readable text.
    #[arg(long, global = true)]
    log_json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Execute every volume calculation of a configuration against a model.
    Run(RunArgs),
    /// Merge reports of the same calculation produced with different seed offsets.
    Merge(MergeArgs),
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    logging::init(cli.log_json)?;
    match cli.command {
        Command::Run(args) => run::run(&args),
        Command::Merge(args) => merge::run(&args),
    }
}
