//! CLI command implementations

mod dataset;
mod generate;
mod train;

use crate::cli::args::{Cli, Command};
use crate::cli::LogLevel;

/// Execute a CLI command based on the parsed arguments
pub fn run_command(cli: Cli) -> Result<(), String> {
    let log_level = LogLevel::from_flags(cli.verbose, cli.quiet);

    match cli.command {
        Command::Dataset(args) => dataset::run_dataset(args, log_level),
        Command::Train(args) => train::run_train(args, log_level),
        Command::Generate(args) => generate::run_generate(args, log_level),
    }
}
