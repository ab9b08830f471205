//! CLI module for resumen
//!
//! This module contains all CLI command handlers and utilities.

pub mod args;
mod commands;
mod logging;

pub use args::{Cli, Command};
pub use commands::run_command;
pub use logging::LogLevel;
