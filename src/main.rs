//! Resumen CLI
//!
//! Episode-summary language modeling entry point.
//!
//! # Usage
//!
//! ```bash
//! # Cleanse scraped records and build the vocabulary
//! resumen dataset episodes_raw.json --output episodes_clean.json
//!
//! # Train a model
//! resumen train episodes_clean.json --output model.json
//!
//! # Sample summaries
//! resumen generate model.json --num-samples 5 --temperature 0.8
//! ```

use clap::Parser;
use resumen::cli::{run_command, Cli};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run_command(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
